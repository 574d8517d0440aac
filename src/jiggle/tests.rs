//! Unit tests for mode transitions and movement generation.
//!
//! These tests run on the host (not embedded) and verify the pure
//! logic of the click→mode table and the per-mode move shapes.

use super::movement::{interval_ms, zigzag_phase};
use super::{Mode, ModeMachine, Move, MovementGenerator, PatternCursor, Transition};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const ALL_MODES: [Mode; 4] = [Mode::Off, Mode::Slow, Mode::Fast, Mode::Zigzag];

fn generator(seed: u64) -> MovementGenerator<ChaCha8Rng> {
    MovementGenerator::new(ChaCha8Rng::seed_from_u64(seed))
}

/// Take the due move and mark it delivered.
fn emit(
    gen: &mut MovementGenerator<ChaCha8Rng>,
    mode: Mode,
    cursor: &mut PatternCursor,
    now_ms: u64,
) -> Option<Move> {
    let mv = gen.due(mode, *cursor, now_ms)?;
    gen.commit(mode, cursor, now_ms);
    Some(mv)
}

// ═══════════════════════════════════════════════════════════════════════════
// Mode Table Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn one_click_toggles_off_and_slow() {
    assert_eq!(Mode::Off.after_clicks(1), Mode::Slow);
    assert_eq!(Mode::Slow.after_clicks(1), Mode::Off);
}

#[test]
fn one_click_from_any_active_mode_turns_off() {
    assert_eq!(Mode::Fast.after_clicks(1), Mode::Off);
    assert_eq!(Mode::Zigzag.after_clicks(1), Mode::Off);
}

#[test]
fn two_clicks_select_fast_everywhere() {
    for mode in ALL_MODES {
        assert_eq!(mode.after_clicks(2), Mode::Fast);
    }
}

#[test]
fn three_or_more_clicks_select_zigzag() {
    for clicks in [3, 4, 7, u8::MAX] {
        assert_eq!(Mode::Off.after_clicks(clicks), Mode::Zigzag);
    }
}

#[test]
fn persisted_byte_roundtrip_and_fallback() {
    for mode in ALL_MODES {
        assert_eq!(Mode::from_persisted(mode.to_persisted()), mode);
    }
    assert_eq!(Mode::from_persisted(4), Mode::Off);
    assert_eq!(Mode::from_persisted(0xFF), Mode::Off);
}

// ═══════════════════════════════════════════════════════════════════════════
// Mode Machine Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn machine_reports_transition() {
    let mut machine = ModeMachine::new(Mode::Off);
    assert_eq!(
        machine.apply(2),
        Some(Transition {
            from: Mode::Off,
            to: Mode::Fast
        })
    );
    assert_eq!(machine.mode(), Mode::Fast);
}

#[test]
fn repeated_burst_is_a_no_op() {
    let mut machine = ModeMachine::new(Mode::Fast);
    assert_eq!(machine.apply(2), None);
    assert_eq!(machine.mode(), Mode::Fast);
}

#[test]
fn entering_zigzag_resets_cursor() {
    let mut machine = ModeMachine::new(Mode::Zigzag);
    for _ in 0..13 {
        machine.parts_mut().1.advance();
    }
    machine.apply(1);
    assert_eq!(machine.mode(), Mode::Off);
    machine.apply(3);
    assert_eq!(machine.mode(), Mode::Zigzag);
    assert_eq!(machine.cursor().get(), 0);
}

#[test]
fn zigzag_again_keeps_cursor() {
    let mut machine = ModeMachine::new(Mode::Zigzag);
    machine.parts_mut().1.advance();
    machine.parts_mut().1.advance();
    assert_eq!(machine.apply(5), None);
    assert_eq!(machine.cursor().get(), 2);
}

// ═══════════════════════════════════════════════════════════════════════════
// Movement Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn intervals_per_mode() {
    assert_eq!(interval_ms(Mode::Off), None);
    assert_eq!(interval_ms(Mode::Slow), Some(60_000));
    assert_eq!(interval_ms(Mode::Fast), Some(1_000));
    assert_eq!(interval_ms(Mode::Zigzag), Some(100));
}

#[test]
fn off_never_moves() {
    let mut gen = generator(1);
    let mut cursor = PatternCursor::new();
    for t in (0..600_000).step_by(1_000) {
        assert_eq!(emit(&mut gen, Mode::Off, &mut cursor, t), None);
    }
}

#[test]
fn slow_moves_once_per_minute_in_wide_range() {
    let mut gen = generator(2);
    let mut cursor = PatternCursor::new();
    assert_eq!(emit(&mut gen, Mode::Slow, &mut cursor, 59_999), None);

    let mv = emit(&mut gen, Mode::Slow, &mut cursor, 60_000).expect("due at 60 s");
    assert!((-50..=50).contains(&mv.dx));
    assert!((-50..=50).contains(&mv.dy));
    assert_eq!(gen.last_jiggle_ms(), 60_000);

    assert_eq!(emit(&mut gen, Mode::Slow, &mut cursor, 60_010), None);
    assert_eq!(cursor.get(), 0);
}

#[test]
fn fast_moves_stay_small() {
    let mut gen = generator(3);
    let mut cursor = PatternCursor::new();
    let mut emitted = 0;
    for t in (0..=200_000).step_by(10) {
        if let Some(mv) = emit(&mut gen, Mode::Fast, &mut cursor, t) {
            assert!((-3..=3).contains(&mv.dx) && (-3..=3).contains(&mv.dy));
            emitted += 1;
        }
    }
    assert_eq!(emitted, 200);
}

#[test]
fn undelivered_move_stays_due() {
    let mut gen = generator(6);
    let mut cursor = PatternCursor::new();

    assert!(gen.due(Mode::Zigzag, cursor, 100).is_some());
    assert!(gen.due(Mode::Zigzag, cursor, 110).is_some());
    assert_eq!(cursor.get(), 0);
    assert_eq!(gen.last_jiggle_ms(), 0);

    gen.commit(Mode::Zigzag, &mut cursor, 110);
    assert_eq!(cursor.get(), 1);
    assert!(gen.due(Mode::Zigzag, cursor, 200).is_none());
    assert!(gen.due(Mode::Zigzag, cursor, 210).is_some());
}

#[test]
fn commit_leaves_cursor_alone_outside_zigzag() {
    let mut gen = generator(7);
    let mut cursor = PatternCursor::new();
    gen.commit(Mode::Fast, &mut cursor, 1_000);
    assert_eq!(cursor.get(), 0);
    assert_eq!(gen.last_jiggle_ms(), 1_000);
}

#[test]
fn wide_range_reaches_both_extremes() {
    let mut gen = generator(4);
    let mut cursor = PatternCursor::new();
    let (mut lo, mut hi) = (0i8, 0i8);
    for i in 1..=5_000u64 {
        let mv = emit(&mut gen, Mode::Slow, &mut cursor, i * 60_000).unwrap();
        lo = lo.min(mv.dx).min(mv.dy);
        hi = hi.max(mv.dx).max(mv.dy);
    }
    assert_eq!((lo, hi), (-50, 50));
}

#[test]
fn zigzag_rotates_through_diagonals() {
    let mut gen = generator(5);
    let mut cursor = PatternCursor::new();
    let expected = [(1, 1), (-1, 1), (-1, -1), (1, -1)];

    for step in 0..40u64 {
        let phase = zigzag_phase(cursor);
        let mv = emit(&mut gen, Mode::Zigzag, &mut cursor, (step + 1) * 100)
            .expect("zigzag due every 100 ms");
        let (sx, sy) = expected[((step / 5) % 4) as usize];
        assert_eq!(phase, ((step / 5) % 4) as usize);
        assert!((15..=25).contains(&(mv.dx * sx)), "dx {} at {}", mv.dx, step);
        assert!((15..=25).contains(&(mv.dy * sy)), "dy {} at {}", mv.dy, step);
    }
    assert_eq!(cursor.get(), 40);
}

#[test]
fn zigzag_phase_wraps_with_cursor() {
    let mut cursor = PatternCursor::new();
    for _ in 0..20 {
        cursor.advance();
    }
    assert_eq!(zigzag_phase(cursor), 0);
}

#[test]
fn keep_alive_move_is_zero() {
    assert_eq!(Move::KEEP_ALIVE, Move::new(0, 0));
}
