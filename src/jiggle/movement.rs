//! Time-driven movement generator.
//!
//! Each mode has a fixed emission interval and a displacement shape; both
//! live in [`PROFILES`], indexed by the mode discriminant. All random draws
//! are independent per axis and inclusive of both range ends.

use super::{Mode, PatternCursor};
use crate::config::{
    FAST_INTERVAL_MS, FAST_SPAN, SLOW_INTERVAL_MS, SLOW_SPAN, ZIGZAG_INTERVAL_MS,
    ZIGZAG_MAX_STEP, ZIGZAG_MIN_STEP, ZIGZAG_PHASE_LEN,
};
use rand::{Rng, RngCore};

/// Relative pointer displacement, in HID counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Move {
    pub dx: i8,
    pub dy: i8,
}

impl Move {
    /// Zero-length move used to refresh host activity detection.
    pub const KEEP_ALIVE: Move = Move { dx: 0, dy: 0 };

    pub const fn new(dx: i8, dy: i8) -> Self {
        Self { dx, dy }
    }
}

#[derive(Clone, Copy)]
enum Shape {
    /// Both axes uniform in `[-span, span]`.
    Square { span: i8 },
    /// Sign-constrained diagonal strokes rotating with the pattern cursor.
    Diagonal,
}

#[derive(Clone, Copy)]
struct Profile {
    interval_ms: u64,
    shape: Shape,
}

/// Emission profile per mode, indexed by `Mode as usize`. `Off` has none.
const PROFILES: [Option<Profile>; 4] = [
    None,
    Some(Profile {
        interval_ms: SLOW_INTERVAL_MS,
        shape: Shape::Square { span: SLOW_SPAN },
    }),
    Some(Profile {
        interval_ms: FAST_INTERVAL_MS,
        shape: Shape::Square { span: FAST_SPAN },
    }),
    Some(Profile {
        interval_ms: ZIGZAG_INTERVAL_MS,
        shape: Shape::Diagonal,
    }),
];

/// Axis signs per zigzag phase (screen coordinates, +y is down):
/// down-right, down-left, up-left, up-right.
const DIAGONALS: [(i8, i8); 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];

fn profile(mode: Mode) -> Option<Profile> {
    PROFILES[mode as usize]
}

/// Emission interval for `mode`, or `None` if it never moves.
pub fn interval_ms(mode: Mode) -> Option<u64> {
    profile(mode).map(|p| p.interval_ms)
}

/// Diagonal phase (0..4) the zigzag is in at `cursor`.
pub fn zigzag_phase(cursor: PatternCursor) -> usize {
    ((cursor.get() / ZIGZAG_PHASE_LEN) % 4) as usize
}

/// Decides when the active mode moves the pointer and by how much.
pub struct MovementGenerator<R> {
    rng: R,
    last_jiggle_ms: u64,
}

impl<R: RngCore> MovementGenerator<R> {
    /// The first jiggle is due one interval after boot.
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            last_jiggle_ms: 0,
        }
    }

    #[cfg(test)]
    pub fn last_jiggle_ms(&self) -> u64 {
        self.last_jiggle_ms
    }

    /// The move due at `now_ms`, if any.
    ///
    /// Nothing is consumed here: the same move stays due (with fresh random
    /// offsets) until [`commit`](Self::commit) records that it went out.
    pub fn due(&mut self, mode: Mode, cursor: PatternCursor, now_ms: u64) -> Option<Move> {
        let profile = profile(mode)?;
        if now_ms.saturating_sub(self.last_jiggle_ms) < profile.interval_ms {
            return None;
        }

        let mv = match profile.shape {
            Shape::Square { span } => Move {
                dx: self.rng.gen_range(-span..=span),
                dy: self.rng.gen_range(-span..=span),
            },
            Shape::Diagonal => {
                let (sx, sy) = DIAGONALS[zigzag_phase(cursor)];
                Move {
                    dx: sx * self.rng.gen_range(ZIGZAG_MIN_STEP..=ZIGZAG_MAX_STEP),
                    dy: sy * self.rng.gen_range(ZIGZAG_MIN_STEP..=ZIGZAG_MAX_STEP),
                }
            }
        };
        Some(mv)
    }

    /// Record that the move from [`due`](Self::due) was delivered: restart
    /// the interval and step the zigzag pattern.
    pub fn commit(&mut self, mode: Mode, cursor: &mut PatternCursor, now_ms: u64) {
        if matches!(profile(mode), Some(Profile { shape: Shape::Diagonal, .. })) {
            cursor.advance();
        }
        self.last_jiggle_ms = now_ms;
    }
}
