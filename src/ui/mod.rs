//! Operator interface - one mode button and one status LED.
//!
//! ## Components
//!
//! - **Clicks**: burst counter fed with the polled button level
//! - **Indicator**: mode-specific blink pattern on an active-low LED

pub mod clicks;
pub mod indicator;

pub use clicks::ClickCounter;
pub use indicator::{led_lit, StatusLed};
