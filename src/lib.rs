//! A snake that advances one cell per tick on a square board.
//!
//! [`sim::GridSimulation`] is the single-threaded core: it buffers at most one
//! turn between ticks, detects wall and self collisions, grows on food and
//! keeps food off the body. [`shared::SharedSimulation`] lets a timer thread
//! and an input thread drive it concurrently, [`ticker::Ticker`] is the
//! fixed-period timer, and [`ui`] is the ratatui front end used by the
//! `gridsnek` binary.

pub mod grid;
pub mod shared;
pub mod sim;
pub mod ticker;
pub mod ui;

pub use grid::{Cell, Direction};
pub use shared::SharedSimulation;
pub use sim::{ConfigError, GridSimulation, Outcome, SimConfig, Snapshot, StepResult};
pub use ticker::Ticker;
