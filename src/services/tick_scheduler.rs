//! Tick Scheduler
//!
//! Owns the repeating one-second task that drives the countdown. At most one
//! schedule is alive at a time; disarming or dropping the scheduler ends it.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

/// Default period between ticks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Liveness flag shared between one armed schedule and its owner
///
/// Once finished, the schedule delivers no further ticks. Callbacks that
/// guard shared state should check [`TickToken::is_finished`] and call
/// [`TickToken::finish`] while holding that state's lock, so the decision to
/// stop is atomic with the state it was based on.
#[derive(Debug, Default)]
pub struct TickToken {
    finished: AtomicBool,
}

impl TickToken {
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn finish(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct TickScheduler {
    period: Duration,
    current: Option<(Arc<TickToken>, JoinHandle<()>)>,
}

impl TickScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            current: None,
        }
    }

    /// Whether a schedule is currently alive
    pub fn is_armed(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|(token, handle)| !token.is_finished() && !handle.is_finished())
    }

    /// Begin calling `on_tick` once per period, first after one full period
    ///
    /// Returns `false` without scheduling anything if a schedule is already
    /// alive. The schedule ends when `on_tick` returns `ControlFlow::Break`.
    /// Must be called from within a tokio runtime.
    pub fn arm<F>(&mut self, mut on_tick: F) -> bool
    where
        F: FnMut(&TickToken) -> ControlFlow<()> + Send + 'static,
    {
        if self.is_armed() {
            return false;
        }
        self.disarm();

        let token = Arc::new(TickToken::default());
        let task_token = token.clone();
        let period = self.period;
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if task_token.is_finished() || on_tick(&task_token).is_break() {
                    task_token.finish();
                    debug!("Tick schedule finished");
                    break;
                }
            }
        });

        self.current = Some((token, handle));
        true
    }

    /// Cancel the schedule, if any
    pub fn disarm(&mut self) {
        if let Some((token, handle)) = self.current.take() {
            token.finish();
            handle.abort();
        }
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        self.disarm();
    }
}
