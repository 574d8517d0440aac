//! Turns the sampled button level into finished click bursts.
//!
//! The button is active-low (internal pull-up), so a press is a high→low
//! edge. Presses closer together than [`DOUBLE_CLICK_MS`] belong to the same
//! burst; the burst is handed out once the window has run out after its last
//! press, and exactly once.

use crate::config::{BUTTON_DEBOUNCE_MS, DOUBLE_CLICK_MS};

/// Burst accumulator fed with one pin sample per control-loop tick.
#[derive(Clone, Debug)]
pub struct ClickCounter {
    /// Last accepted pin level (`true` = released).
    level: bool,
    /// Presses in the burst being collected.
    count: u8,
    /// Time of the most recent accepted press edge.
    last_press: Option<u64>,
    /// Samples before this instant are treated as contact bounce.
    settle_until: u64,
}

impl ClickCounter {
    pub const fn new() -> Self {
        Self {
            level: true,
            count: 0,
            last_press: None,
            settle_until: 0,
        }
    }

    /// Feed one pin sample. Returns the click count of a burst that just
    /// finished, if any.
    pub fn sample(&mut self, level: bool, now_ms: u64) -> Option<u8> {
        // Close an expired burst first so a press landing right on the
        // window boundary opens a new burst instead of overwriting this one.
        let finished = self.take_finished(now_ms);

        if now_ms >= self.settle_until && level != self.level {
            self.level = level;
            self.settle_until = now_ms + BUTTON_DEBOUNCE_MS;
            if !level {
                self.press(now_ms);
            }
        }

        finished
    }

    /// Presses counted so far in the open burst.
    #[cfg(test)]
    pub fn pending(&self) -> u8 {
        self.count
    }

    fn press(&mut self, now_ms: u64) {
        let in_window = self
            .last_press
            .is_some_and(|t| now_ms.saturating_sub(t) < DOUBLE_CLICK_MS);

        self.count = if in_window {
            self.count.saturating_add(1)
        } else {
            1
        };
        self.last_press = Some(now_ms);
    }

    fn take_finished(&mut self, now_ms: u64) -> Option<u8> {
        let last = self.last_press?;
        if self.count == 0 || now_ms.saturating_sub(last) < DOUBLE_CLICK_MS {
            return None;
        }
        let count = self.count;
        self.count = 0;
        Some(count)
    }
}

impl Default for ClickCounter {
    fn default() -> Self {
        Self::new()
    }
}
