use crate::shared::SharedSimulation;
use log::{debug, error, info};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Steps a [`SharedSimulation`] at a fixed period on its own thread.
///
/// The loop ends by itself once the game is over; the front end resets the
/// simulation and spawns a new ticker to play again.
#[derive(Debug)]
pub struct Ticker {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl Ticker {
    pub fn spawn(sim: Arc<SharedSimulation>, period: Duration) -> io::Result<Ticker> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("gridsnek-ticker".into())
            .spawn(move || run(&sim, period, &flag))?;

        Ok(Ticker {
            handle: Some(handle),
            stop,
        })
    }

    /// True once the loop has exited, either on game over or after `stop`.
    pub fn is_finished(&self) -> bool {
        self.handle
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.stop.store(true, Ordering::Release);
            handle.thread().unpark();
            if handle.join().is_err() {
                error!("Ticker thread panicked");
            }
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(sim: &SharedSimulation, period: Duration, stop: &AtomicBool) {
    info!("Ticker started, period {:?}", period);
    let mut deadline = Instant::now() + period;

    loop {
        loop {
            if stop.load(Ordering::Acquire) {
                info!("Ticker stopped");
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::park_timeout(deadline - now);
        }

        let snapshot = sim.step();
        if let Some(outcome) = snapshot.outcome {
            info!(
                "Ticker halted on {:?}, score {} after {} ticks",
                outcome, snapshot.score, snapshot.ticks
            );
            return;
        }

        // Deadlines advance from the start instant so sleep jitter does not
        // accumulate. Missed ticks are dropped rather than replayed in a burst.
        deadline += period;
        let now = Instant::now();
        if deadline <= now {
            debug!("Ticker fell behind by {:?}", now - deadline);
            deadline = now + period;
        }
    }
}
