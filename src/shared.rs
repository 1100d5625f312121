//! A [`GridSimulation`] that a ticker thread and an input thread can drive
//! at the same time.
//!
//! Turn requests go through a single atomic slot and never wait on a step in
//! progress. Steps, resets and snapshots serialize on one mutex, so a reader
//! sees the board either before or after a tick, never halfway through one.

use crate::grid::Direction;
use crate::sim::{ConfigError, GridSimulation, SimConfig, Snapshot};
use log::debug;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard};

const NO_TURN: u8 = 0;

#[derive(Debug)]
pub struct SharedSimulation {
    sim: Mutex<GridSimulation>,
    pending_turn: AtomicU8,
    heading: AtomicU8,
    game_over: AtomicBool,
}

impl SharedSimulation {
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_simulation(GridSimulation::new(config)?))
    }

    pub fn from_simulation(sim: GridSimulation) -> Self {
        SharedSimulation {
            heading: AtomicU8::new(sim.heading().to_bits()),
            game_over: AtomicBool::new(sim.game_over()),
            pending_turn: AtomicU8::new(NO_TURN),
            sim: Mutex::new(sim),
        }
    }

    /// Buffers `direction` for the next step without taking the lock.
    ///
    /// Checked against the heading published by the last step. The step
    /// checks again when it applies the turn, so a request that went stale
    /// in between is still dropped.
    pub fn request_turn(&self, direction: Direction) {
        if self.game_over.load(Ordering::Acquire) {
            return;
        }
        let heading = Direction::from_bits(self.heading.load(Ordering::Acquire));
        if heading == Some(direction.opposite()) {
            debug!("Ignoring reversal to {:?}", direction);
            return;
        }
        self.pending_turn.store(direction.to_bits(), Ordering::Release);
    }

    /// Applies the buffered turn, advances one tick and returns the result.
    pub fn step(&self) -> Snapshot {
        let mut sim = self.lock();
        // Taken under the lock so a concurrent reset cannot be overtaken by
        // a turn requested for the previous game.
        let pending = self.pending_turn.swap(NO_TURN, Ordering::AcqRel);
        if let Some(turn) = Direction::from_bits(pending) {
            sim.request_turn(turn);
        }
        sim.step();
        self.publish(&sim);
        sim.snapshot()
    }

    pub fn reset(&self) {
        let mut sim = self.lock();
        sim.reset();
        self.pending_turn.store(NO_TURN, Ordering::Release);
        self.publish(&sim);
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }

    pub fn game_over(&self) -> bool {
        self.game_over.load(Ordering::Acquire)
    }

    fn publish(&self, sim: &GridSimulation) {
        self.heading.store(sim.heading().to_bits(), Ordering::Release);
        self.game_over.store(sim.game_over(), Ordering::Release);
    }

    fn lock(&self) -> MutexGuard<'_, GridSimulation> {
        // Every mutation finishes before the guard drops, so a panic elsewhere
        // cannot leave the simulation half updated.
        self.sim.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
