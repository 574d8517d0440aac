//! Link supervision - the wireless transport is expected to drop.
//!
//! The supervisor samples connectivity once per tick. A connected→
//! disconnected edge triggers the recovery sequence (end, pause, begin);
//! while the link is down nothing is sent. While it is up, a zero-length
//! keep-alive move goes out whenever nothing was sent for
//! [`KEEP_ALIVE_MS`].

use crate::config::{KEEP_ALIVE_MS, RECOVERY_PAUSE_MS};
use crate::error::Error;
use crate::jiggle::Move;
use embedded_hal_async::delay::DelayNs;

/// HID pointer transport as seen by the control loop.
///
/// All calls are fire-and-forget: they must return promptly and give no
/// delivery guarantee.
pub trait Transport {
    /// Start (or restart) the session so a host can connect.
    fn begin(&mut self);
    /// Tear the session down, dropping any host connection.
    fn end(&mut self);
    fn is_connected(&self) -> bool;
    /// Queue a relative pointer move.
    fn send_move(&mut self, mv: Move) -> Result<(), Error>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    Connected,
    Disconnected,
}

/// What the latest connectivity sample means for this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Host just connected.
    Established,
    /// Still connected.
    Up,
    /// Connection just dropped; recovery runs this tick.
    Lost,
    /// Still no host.
    Down,
}

impl LinkEvent {
    /// Whether movement may be sent this tick.
    pub fn allows_movement(self) -> bool {
        matches!(self, LinkEvent::Established | LinkEvent::Up)
    }
}

#[derive(Clone, Debug)]
pub struct ConnectionSupervisor {
    state: LinkState,
    /// Last time any move (jiggle or keep-alive) was handed to the transport.
    last_move_ms: u64,
    recoveries: u32,
}

impl ConnectionSupervisor {
    pub const fn new() -> Self {
        Self {
            state: LinkState::Disconnected,
            last_move_ms: 0,
            recoveries: 0,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn last_move_ms(&self) -> u64 {
        self.last_move_ms
    }

    /// Number of recovery sequences run since boot.
    pub fn recoveries(&self) -> u32 {
        self.recoveries
    }

    /// Record this tick's connectivity sample.
    pub fn observe(&mut self, connected: bool) -> LinkEvent {
        let event = match (self.state, connected) {
            (LinkState::Disconnected, true) => LinkEvent::Established,
            (LinkState::Connected, true) => LinkEvent::Up,
            (LinkState::Connected, false) => LinkEvent::Lost,
            (LinkState::Disconnected, false) => LinkEvent::Down,
        };
        self.state = if connected {
            LinkState::Connected
        } else {
            LinkState::Disconnected
        };

        match event {
            LinkEvent::Established => info!("Host connected"),
            LinkEvent::Lost => warn!("Host connection lost"),
            _ => {}
        }
        event
    }

    /// Restart the transport session after a lost link.
    pub async fn recover<T, D>(&mut self, transport: &mut T, delay: &mut D)
    where
        T: Transport,
        D: DelayNs,
    {
        self.recoveries = self.recoveries.wrapping_add(1);
        info!("Recovering link (attempt {})", self.recoveries);
        transport.end();
        delay.delay_ms(RECOVERY_PAUSE_MS).await;
        transport.begin();
    }

    /// A keep-alive is due: connected and nothing sent for the full period.
    pub fn keep_alive_due(&self, now_ms: u64) -> bool {
        self.state == LinkState::Connected
            && now_ms.saturating_sub(self.last_move_ms) >= KEEP_ALIVE_MS
    }

    /// Hand `mv` to the transport. Only moves the transport accepted count
    /// towards the keep-alive timer.
    pub fn send<T: Transport>(&mut self, transport: &mut T, mv: Move, now_ms: u64) -> bool {
        if self.state != LinkState::Connected {
            return false;
        }
        match transport.send_move(mv) {
            Ok(()) => {
                self.last_move_ms = now_ms;
                true
            }
            Err(e) => {
                warn!("Move dropped: {}", e);
                false
            }
        }
    }
}

impl Default for ConnectionSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Wire {
        connected: bool,
        full: bool,
        sent: Vec<Move>,
    }

    impl Transport for Wire {
        fn begin(&mut self) {}
        fn end(&mut self) {}
        fn is_connected(&self) -> bool {
            self.connected
        }
        fn send_move(&mut self, mv: Move) -> Result<(), Error> {
            if self.full {
                return Err(Error::QueueFull);
            }
            self.sent.push(mv);
            Ok(())
        }
    }

    #[test]
    fn edges_are_classified() {
        let mut sup = ConnectionSupervisor::new();
        assert_eq!(sup.observe(false), LinkEvent::Down);
        assert_eq!(sup.observe(true), LinkEvent::Established);
        assert_eq!(sup.observe(true), LinkEvent::Up);
        assert_eq!(sup.observe(false), LinkEvent::Lost);
        assert_eq!(sup.observe(false), LinkEvent::Down);
        assert_eq!(sup.state(), LinkState::Disconnected);
    }

    #[test]
    fn keep_alive_needs_connection_and_quiet_period() {
        let mut sup = ConnectionSupervisor::new();
        assert!(!sup.keep_alive_due(30_000));

        sup.observe(true);
        assert!(!sup.keep_alive_due(29_999));
        assert!(sup.keep_alive_due(30_000));
    }

    #[test]
    fn accepted_moves_reset_keep_alive_timer() {
        let mut sup = ConnectionSupervisor::new();
        let mut wire = Wire {
            connected: true,
            ..Wire::default()
        };
        sup.observe(wire.is_connected());

        assert!(sup.send(&mut wire, Move::new(2, -1), 10_000));
        assert_eq!(sup.last_move_ms(), 10_000);
        assert!(!sup.keep_alive_due(39_999));
        assert!(sup.keep_alive_due(40_000));
    }

    #[test]
    fn rejected_moves_do_not_count() {
        let mut sup = ConnectionSupervisor::new();
        let mut wire = Wire {
            connected: true,
            full: true,
            ..Wire::default()
        };
        sup.observe(true);

        assert!(!sup.send(&mut wire, Move::KEEP_ALIVE, 31_000));
        assert_eq!(sup.last_move_ms(), 0);
        assert!(sup.keep_alive_due(31_010));
    }

    #[test]
    fn nothing_is_sent_while_disconnected() {
        let mut sup = ConnectionSupervisor::new();
        let mut wire = Wire::default();
        sup.observe(false);
        assert!(!sup.send(&mut wire, Move::new(1, 1), 5_000));
        assert!(wire.sent.is_empty());
    }
}
