//! The control loop body.
//!
//! [`Controller`] owns every piece of mutable state (burst counter, mode,
//! pattern cursor, movement and keep-alive timers) and is driven by one
//! [`Controller::tick`] per loop iteration. `now_ms` is sampled once by the
//! caller and used for every timing decision inside the tick.
//!
//! Order within a tick:
//! 1. button sample → finished burst → mode change, persisted before
//!    anything else happens
//! 2. LED level from the (possibly new) mode
//! 3. link sample; a lost link runs recovery and ends the tick
//! 4. mode jiggle, then keep-alive

use crate::jiggle::{Mode, ModeMachine, Move, MovementGenerator, PatternCursor, Transition};
use crate::link::{ConnectionSupervisor, LinkEvent, LinkState, Transport};
use crate::storage::{self, ModeStore};
use crate::ui::{led_lit, ClickCounter};
use embedded_hal_async::delay::DelayNs;
use rand::RngCore;

/// What happened during one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tick {
    /// Click count of a burst that finished this tick.
    pub clicks: Option<u8>,
    pub transition: Option<Transition>,
    pub link: LinkEvent,
    /// Mode jiggle handed to the transport.
    pub moved: Option<Move>,
    pub keep_alive: bool,
    /// Status LED level (`true` = lit).
    pub led_lit: bool,
}

pub struct Controller<R> {
    clicks: ClickCounter,
    modes: ModeMachine,
    movement: MovementGenerator<R>,
    link: ConnectionSupervisor,
}

impl<R: RngCore> Controller<R> {
    pub fn new(initial: Mode, rng: R) -> Self {
        Self {
            clicks: ClickCounter::new(),
            modes: ModeMachine::new(initial),
            movement: MovementGenerator::new(rng),
            link: ConnectionSupervisor::new(),
        }
    }

    /// Build a controller resuming the persisted mode.
    pub async fn boot<S: ModeStore>(store: &mut S, rng: R) -> Self {
        let mode = storage::load_mode(store).await;
        info!("Jiggle mode at boot: {}", mode.label());
        Self::new(mode, rng)
    }

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    pub fn cursor(&self) -> PatternCursor {
        self.modes.cursor()
    }

    pub fn link_state(&self) -> LinkState {
        self.link.state()
    }

    pub fn recoveries(&self) -> u32 {
        self.link.recoveries()
    }

    /// Run one control-loop iteration.
    ///
    /// `button_level` is the raw pin level (`true` = released).
    pub async fn tick<T, S, D>(
        &mut self,
        now_ms: u64,
        button_level: bool,
        transport: &mut T,
        store: &mut S,
        delay: &mut D,
    ) -> Tick
    where
        T: Transport,
        S: ModeStore,
        D: DelayNs,
    {
        let clicks = self.clicks.sample(button_level, now_ms);
        let transition = match clicks {
            Some(n) => self.apply_clicks(n, store).await,
            None => None,
        };

        let mut tick = Tick {
            clicks,
            transition,
            link: self.link.observe(transport.is_connected()),
            moved: None,
            keep_alive: false,
            led_lit: led_lit(self.modes.mode(), now_ms),
        };

        if tick.link == LinkEvent::Lost {
            self.link.recover(transport, delay).await;
            return tick;
        }
        if !tick.link.allows_movement() {
            return tick;
        }

        // A rejected move stays due; the interval and pattern only advance
        // once the transport took it.
        let (mode, cursor) = self.modes.parts_mut();
        if let Some(mv) = self.movement.due(mode, *cursor, now_ms) {
            if self.link.send(transport, mv, now_ms) {
                self.movement.commit(mode, cursor, now_ms);
                debug!("Mouse moved: x={} y={}", mv.dx, mv.dy);
                tick.moved = Some(mv);
            }
        }

        if self.link.keep_alive_due(now_ms) && self.link.send(transport, Move::KEEP_ALIVE, now_ms)
        {
            debug!("Keep-alive sent");
            tick.keep_alive = true;
        }

        tick
    }

    async fn apply_clicks<S: ModeStore>(&mut self, clicks: u8, store: &mut S) -> Option<Transition> {
        let transition = self.modes.apply(clicks)?;
        info!("{} click(s) - jiggle mode: {}", clicks, transition.to.label());

        // The new mode is live either way; a failed write only means the
        // previous mode comes back after a reset.
        if let Err(e) = storage::save_mode(store, transition.to).await {
            error!("Could not persist mode: {}", e);
        }
        Some(transition)
    }
}
