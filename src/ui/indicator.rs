//! Status LED - blinks at a mode-specific rate so the operator can see
//! which mode is active. Purely observational.

use crate::config::{LED_PERIOD_FAST_MS, LED_PERIOD_SLOW_MS, LED_PERIOD_ZIGZAG_MS};
use crate::jiggle::Mode;
use embedded_hal::digital::OutputPin;

/// Half-period of the blink for `mode`; `None` keeps the LED dark.
pub const fn blink_period_ms(mode: Mode) -> Option<u64> {
    match mode {
        Mode::Off => None,
        Mode::Slow => Some(LED_PERIOD_SLOW_MS),
        Mode::Fast => Some(LED_PERIOD_FAST_MS),
        Mode::Zigzag => Some(LED_PERIOD_ZIGZAG_MS),
    }
}

/// Whether the LED should be lit at `now_ms` in `mode`.
pub fn led_lit(mode: Mode, now_ms: u64) -> bool {
    match blink_period_ms(mode) {
        Some(period) => (now_ms / period) % 2 == 0,
        None => false,
    }
}

/// Active-low status LED.
pub struct StatusLed<P> {
    pin: P,
}

impl<P: OutputPin> StatusLed<P> {
    /// Wrap `pin` and switch the LED off.
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_high();
        Self { pin }
    }

    pub fn show(&mut self, lit: bool) {
        // GPIO writes on the nRF are infallible; other HALs may report errors
        // we have no way to act on.
        let _ = if lit {
            self.pin.set_low()
        } else {
            self.pin.set_high()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorType, OutputPin};

    #[derive(Default)]
    struct FakePin {
        high: bool,
    }

    impl ErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            Ok(())
        }
    }

    fn toggles(mode: Mode, until: u64) -> usize {
        let mut prev = led_lit(mode, 0);
        let mut changes = 0;
        for t in 1..until {
            let lit = led_lit(mode, t);
            if lit != prev {
                changes += 1;
                prev = lit;
            }
        }
        changes
    }

    #[test]
    fn off_stays_dark() {
        assert_eq!(toggles(Mode::Off, 5_000), 0);
        assert!(!led_lit(Mode::Off, 0));
    }

    #[test]
    fn blink_rate_follows_mode() {
        assert_eq!(toggles(Mode::Slow, 4_000), 3);
        assert_eq!(toggles(Mode::Fast, 1_000), 3);
        assert_eq!(toggles(Mode::Zigzag, 1_000), 9);
    }

    #[test]
    fn fast_period_edges() {
        assert!(led_lit(Mode::Fast, 0));
        assert!(led_lit(Mode::Fast, 249));
        assert!(!led_lit(Mode::Fast, 250));
        assert!(led_lit(Mode::Fast, 500));
    }

    #[test]
    fn led_is_active_low() {
        let mut led = StatusLed::new(FakePin::default());
        assert!(led.pin.high);
        led.show(true);
        assert!(!led.pin.high);
        led.show(false);
        assert!(led.pin.high);
    }
}
