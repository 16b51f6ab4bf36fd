//! TTL Reaper Task
//!
//! Background task that periodically removes expired cache entries. The task
//! is owned by a [`Reaper`] handle and stops when that handle is dropped.

use std::future::Future;
use std::io;
use std::sync::Weak;
use std::thread;
use std::time::Duration;

use tokio::runtime::{Builder, Handle};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Something the reaper can sweep on each tick.
pub(crate) trait Sweep: Send + Sync + 'static {
    /// Removes expired entries, returning how many were removed.
    fn sweep(&self) -> usize;
}

// == Reaper ==
/// Handle to a running sweep task.
///
/// The task only holds a weak reference to its target, and dropping the
/// handle aborts it, so the owner of the handle controls its lifetime.
#[derive(Debug)]
pub struct Reaper {
    handle: JoinHandle<()>,
    interval: Duration,
    /// Keeps the dedicated reaper thread alive, None on an ambient runtime
    stop: Option<oneshot::Sender<()>>,
}

impl Reaper {
    /// Spawns a task that sweeps `target` every `interval`.
    ///
    /// Inside a Tokio runtime the task runs on it. Otherwise a dedicated
    /// thread drives a current-thread runtime until the handle is dropped.
    /// The first sweep runs one full interval after spawning.
    ///
    /// `interval` must be non-zero.
    pub(crate) fn spawn<S: Sweep>(target: Weak<S>, interval: Duration) -> io::Result<Self> {
        let task = sweep_loop(target, interval);

        if let Ok(runtime) = Handle::try_current() {
            return Ok(Self {
                handle: runtime.spawn(task),
                interval,
                stop: None,
            });
        }

        let runtime = Builder::new_current_thread().enable_time().build()?;
        let handle = runtime.spawn(task);
        let (stop, stopped) = oneshot::channel::<()>();

        thread::Builder::new()
            .name("ttl-cache-reaper".to_string())
            .spawn(move || {
                // Resolves once the sender is dropped.
                let _ = runtime.block_on(stopped);
            })?;
        debug!("TTL reaper running on a dedicated thread");

        Ok(Self {
            handle,
            interval,
            stop: Some(stop),
        })
    }

    /// Returns the interval between sweeps.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true once the task has stopped.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        self.handle.abort();
        self.stop.take();
        debug!("TTL reaper stopped");
    }
}

fn sweep_loop<S: Sweep>(target: Weak<S>, interval: Duration) -> impl Future<Output = ()> {
    async move {
        debug!(?interval, "Starting TTL reaper");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let Some(live) = target.upgrade() else {
                debug!("Cache released, TTL reaper exiting");
                break;
            };
            let removed = live.sweep();
            drop(live);

            if removed > 0 {
                info!(removed, "TTL sweep removed expired entries");
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }
    }
}
