//! Jiggle modes and the button-driven mode state machine.
//!
//! Operator contract:
//!
//! | clicks | next mode                            |
//! |--------|--------------------------------------|
//! | 1      | `Slow` when `Off`, otherwise `Off`   |
//! | 2      | `Fast`                               |
//! | 3+     | `Zigzag`                             |

pub mod movement;

#[cfg(test)]
mod tests;

pub use movement::{Move, MovementGenerator};

/// Movement behaviour selected by the operator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Mode {
    #[default]
    Off = 0,
    Slow = 1,
    Fast = 2,
    Zigzag = 3,
}

impl Mode {
    /// Decode a persisted byte. Unknown values (blank or corrupted flash)
    /// fall back to `Off`.
    pub const fn from_persisted(raw: u8) -> Self {
        match raw {
            1 => Mode::Slow,
            2 => Mode::Fast,
            3 => Mode::Zigzag,
            _ => Mode::Off,
        }
    }

    pub const fn to_persisted(self) -> u8 {
        self as u8
    }

    /// Mode selected by a finished burst of `clicks` presses.
    pub const fn after_clicks(self, clicks: u8) -> Self {
        match clicks {
            0 => self,
            1 => match self {
                Mode::Off => Mode::Slow,
                _ => Mode::Off,
            },
            2 => Mode::Fast,
            _ => Mode::Zigzag,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Mode::Off => "off",
            Mode::Slow => "slow (every minute, wide range)",
            Mode::Fast => "fast (every second, short range)",
            Mode::Zigzag => "zigzag (diagonal strokes)",
        }
    }
}

/// Step counter that walks the zigzag through its diagonal phases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PatternCursor(u32);

impl PatternCursor {
    pub const fn new() -> Self {
        Self(0)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub fn advance(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

/// A confirmed mode change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub from: Mode,
    pub to: Mode,
}

/// Active mode plus the per-mode state that goes with it.
#[derive(Clone, Debug, Default)]
pub struct ModeMachine {
    mode: Mode,
    cursor: PatternCursor,
}

impl ModeMachine {
    pub const fn new(initial: Mode) -> Self {
        Self {
            mode: initial,
            cursor: PatternCursor::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn cursor(&self) -> PatternCursor {
        self.cursor
    }

    /// Mode and cursor together, for the movement generator.
    pub fn parts_mut(&mut self) -> (Mode, &mut PatternCursor) {
        (self.mode, &mut self.cursor)
    }

    /// Apply a finished click burst. Returns `None` when the burst selects
    /// the mode that is already active; no side effects happen then.
    pub fn apply(&mut self, clicks: u8) -> Option<Transition> {
        let from = self.mode;
        let to = from.after_clicks(clicks);
        if to == from {
            return None;
        }

        self.mode = to;
        if to == Mode::Zigzag {
            self.cursor.reset();
        }
        Some(Transition { from, to })
    }
}
