// Repeating turn timer with an independently sampled countdown value.
//
// Elapsed time is tracked by a coarse fixed-granularity ticker instead of
// wall-clock subtraction, so any thread can sample a jitter-tolerant
// "time since the turn last advanced" without extra locking.

use crate::domain::SessionError;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::error;

/// Granularity of the elapsed counter.
pub const ELAPSED_TICK: Duration = Duration::from_millis(200);

/// Fixed-interval scheduler driving turn resolution. Must be started from
/// within a tokio runtime. Dropping the scheduler stops it.
#[derive(Debug)]
pub struct TurnScheduler {
    interval: Duration,
    elapsed_ms: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    tasks: Vec<JoinHandle<()>>,
}

impl TurnScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed_ms: Arc::new(AtomicU64::new(0)),
            running: Arc::new(AtomicBool::new(false)),
            tasks: Vec::new(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Begins invoking `callback` every interval and ticking the elapsed
    /// counter. The counter resets to zero right after each invocation, so
    /// it always reads as time since the turn last advanced. Starting a
    /// running scheduler restarts it.
    ///
    /// A failing callback is logged and never stops future firings.
    pub fn start<F>(&mut self, mut callback: F)
    where
        F: FnMut() -> Result<(), SessionError> + Send + 'static,
    {
        self.stop();
        self.elapsed_ms.store(0, Ordering::Relaxed);
        self.running.store(true, Ordering::Relaxed);

        let elapsed = Arc::clone(&self.elapsed_ms);
        let ticker_task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(ELAPSED_TICK);
            // Skipping missed ticks keeps the counter from bursting past the
            // turn duration after a stalled runtime catches up.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of a tokio interval completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                elapsed.fetch_add(ELAPSED_TICK.as_millis() as u64, Ordering::Relaxed);
            }
        });

        let elapsed = Arc::clone(&self.elapsed_ms);
        let interval = self.interval;
        let firing_task = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.tick().await;
            loop {
                timer.tick().await;
                if let Err(e) = callback() {
                    error!(error = %e, "turn callback failed; scheduler keeps firing");
                }
                elapsed.store(0, Ordering::Relaxed);
            }
        });

        self.tasks = vec![ticker_task, firing_task];
    }

    /// Prevents future firings. An in-flight callback is never cancelled
    /// mid-invocation; the synchronous callback runs to completion.
    pub fn stop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Time since the last firing, rounded down to the tick granularity.
    /// Zero before the first start.
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms.load(Ordering::Relaxed))
    }
}

impl Drop for TurnScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use tokio::time::sleep;

    fn counting_callback(count: Arc<AtomicU32>) -> impl FnMut() -> Result<(), SessionError> {
        move || {
            count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn elapsed_is_zero_before_start() {
        let scheduler = TurnScheduler::new(Duration::from_millis(900));
        assert_eq!(scheduler.elapsed(), Duration::ZERO);
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_ticks_at_fixed_granularity() {
        let mut scheduler = TurnScheduler::new(Duration::from_secs(10));
        scheduler.start(|| Ok(()));

        sleep(Duration::from_millis(450)).await;
        assert_eq!(scheduler.elapsed(), Duration::from_millis(400));

        sleep(Duration::from_millis(200)).await;
        assert_eq!(scheduler.elapsed(), Duration::from_millis(600));

        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn fires_on_each_interval_and_resets_elapsed() {
        let count = Arc::new(AtomicU32::new(0));
        let mut scheduler = TurnScheduler::new(Duration::from_millis(900));
        scheduler.start(counting_callback(Arc::clone(&count)));
        assert!(scheduler.is_running());

        sleep(Duration::from_millis(950)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.elapsed(), Duration::ZERO);

        sleep(Duration::from_millis(900)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn callback_errors_do_not_stop_the_schedule() {
        let count = Arc::new(AtomicU32::new(0));
        let count_inner = Arc::clone(&count);
        let mut scheduler = TurnScheduler::new(Duration::from_millis(900));
        scheduler.start(move || {
            count_inner.fetch_add(1, Ordering::SeqCst);
            Err(SessionError::UnsupportedActionKind)
        });

        sleep(Duration::from_millis(1900)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_future_firings() {
        let count = Arc::new(AtomicU32::new(0));
        let mut scheduler = TurnScheduler::new(Duration::from_millis(900));
        scheduler.start(counting_callback(Arc::clone(&count)));

        sleep(Duration::from_millis(950)).await;
        scheduler.stop();
        assert!(!scheduler.is_running());

        sleep(Duration::from_millis(2000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_resets_the_elapsed_counter() {
        let mut scheduler = TurnScheduler::new(Duration::from_secs(10));
        scheduler.start(|| Ok(()));
        sleep(Duration::from_millis(650)).await;
        assert_eq!(scheduler.elapsed(), Duration::from_millis(600));

        scheduler.start(|| Ok(()));
        assert_eq!(scheduler.elapsed(), Duration::ZERO);
        sleep(Duration::from_millis(250)).await;
        assert_eq!(scheduler.elapsed(), Duration::from_millis(200));

        scheduler.stop();
    }
}
