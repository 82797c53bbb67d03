//! # Cancellable Timers
//!
//! Delayed and repeating work scheduled on the Tokio runtime. Each scheduled task is
//! represented by a [`TimerHandle`]; cancelling or dropping the handle aborts the task.
//!
//! Timers read the Tokio clock, so tests can drive them deterministically with a paused
//! runtime (`#[tokio::test(start_paused = true)]`) instead of waiting on wall-clock time.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::trace;

/// Owner of one scheduled task.
///
/// Dropping the handle cancels the task, so a store that keeps its handles inside its
/// state cancels every outstanding timer when the state goes away.
#[must_use = "dropping a TimerHandle cancels the timer"]
#[derive(Debug)]
pub struct TimerHandle {
    abort: AbortHandle,
    label: &'static str,
}

impl TimerHandle {
    /// Abort the task. Has no effect once it has finished.
    pub fn cancel(&self) {
        if !self.abort.is_finished() {
            trace!(timer = self.label, "Timer cancelled");
        }
        self.abort.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

/// Run `task` once the clock reaches `deadline`.
pub fn schedule_at<F>(deadline: Instant, label: &'static str, task: F) -> TimerHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        time::sleep_until(deadline).await;
        trace!(timer = label, "Timer fired");
        task.await;
    });
    TimerHandle {
        abort: handle.abort_handle(),
        label,
    }
}

/// Run `task` after `delay` has elapsed.
pub fn schedule_after<F>(delay: Duration, label: &'static str, task: F) -> TimerHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    schedule_at(Instant::now() + delay, label, task)
}

/// Call `tick` every `period`, first one `period` from now, until it returns
/// [`ControlFlow::Break`] or the handle is cancelled.
///
/// `period` must be non-zero.
pub fn schedule_every<F, Fut>(period: Duration, label: &'static str, mut tick: F) -> TimerHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ControlFlow<()>> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            trace!(timer = label, "Timer tick");
            if tick().await.is_break() {
                break;
            }
        }
    });
    TimerHandle {
        abort: handle.abort_handle(),
        label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_schedule_after_fires_once_deadline_passes() {
        let fired = Arc::new(AtomicU32::new(0));
        let counter = fired.clone();
        let handle = schedule_after(Duration::from_secs(5), "once", async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_firing() {
        let fired = Arc::new(AtomicU32::new(0));
        let counter = fired.clone();
        let handle = schedule_after(Duration::from_secs(1), "cancelled", async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        handle.cancel();

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_repeating_timer() {
        let ticks = Arc::new(AtomicU32::new(0));
        let counter = ticks.clone();
        let handle = schedule_every(Duration::from_secs(3), "ticker", move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                ControlFlow::Continue(())
            }
        });

        time::sleep(Duration::from_millis(9_500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        drop(handle);
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeating_timer_stops_on_break() {
        let ticks = Arc::new(AtomicU32::new(0));
        let counter = ticks.clone();
        let handle = schedule_every(Duration::from_secs(1), "bounded", move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) + 1 >= 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            }
        });

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
        assert!(handle.is_finished());
    }
}
