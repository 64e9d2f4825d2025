//! CronTimer - a background task firing a callback on a cron schedule.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cron::CronSchedule;

/// Time source and fire-time calculation for timers.
pub trait TimerClock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    /// First fire time of `schedule` strictly after `after`.
    fn next_fire(&self, schedule: &CronSchedule, after: &DateTime<Local>) -> Option<DateTime<Local>> {
        schedule.next_after(after)
    }
}

/// Wall clock in the host's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimerClock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Longest single sleep. Waking periodically keeps the timer honest across
/// wall-clock changes and system suspend.
const MAX_SLEEP: Duration = Duration::from_secs(60);

/// Fires a callback at every matching cron time until cancelled or dropped.
///
/// Missed fire times (e.g. while the machine slept) collapse into a single
/// late fire.
pub struct CronTimer {
    id: String,
    schedule: CronSchedule,
    clock: Arc<dyn TimerClock>,
    cancel: CancellationToken,
    fire_count: Arc<AtomicU64>,
}

impl CronTimer {
    /// Start a wall-clock timer on the current tokio runtime.
    pub fn start<F, Fut>(id: impl Into<String>, schedule: CronSchedule, on_fire: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::start_with_clock(id, schedule, Arc::new(SystemClock), on_fire)
    }

    /// Start a timer whose fire times come from `clock`.
    pub fn start_with_clock<F, Fut>(
        id: impl Into<String>,
        schedule: CronSchedule,
        clock: Arc<dyn TimerClock>,
        on_fire: F,
    ) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = id.into();
        let cancel = CancellationToken::new();
        let fire_count = Arc::new(AtomicU64::new(0));

        tokio::spawn(run_timer(
            id.clone(),
            schedule.clone(),
            clock.clone(),
            cancel.clone(),
            fire_count.clone(),
            on_fire,
        ));

        Self {
            id,
            schedule,
            clock,
            cancel,
            fire_count,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn expression(&self) -> &str {
        self.schedule.expression()
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    pub fn fire_count(&self) -> u64 {
        self.fire_count.load(Ordering::Relaxed)
    }

    /// Stop the timer. No further fires happen after this returns.
    pub fn cancel(&self) {
        if !self.cancel.is_cancelled() {
            self.cancel.cancel();
            debug!("CronTimer {} cancelled", self.id);
        }
    }

    pub fn next_fire_time(&self) -> Option<DateTime<Local>> {
        if !self.is_active() {
            return None;
        }
        self.clock.next_fire(&self.schedule, &self.clock.now())
    }
}

impl Drop for CronTimer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_timer<F, Fut>(
    id: String,
    schedule: CronSchedule,
    clock: Arc<dyn TimerClock>,
    cancel: CancellationToken,
    fire_count: Arc<AtomicU64>,
    on_fire: F,
) where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let mut next = clock.next_fire(&schedule, &clock.now());

    loop {
        let Some(at) = next else {
            debug!("CronTimer {} has no upcoming schedule", id);
            return;
        };

        debug!("CronTimer {} scheduled for {}", id, at.to_rfc3339());

        let now = clock.now();
        if at > now {
            let wait = (at - now).to_std().unwrap_or_default().min(MAX_SLEEP);
            tokio::select! {
                _ = tokio::time::sleep(wait) => continue,
                _ = cancel.cancelled() => return,
            }
        }

        if cancel.is_cancelled() {
            return;
        }

        fire_count.fetch_add(1, Ordering::Relaxed);
        on_fire(id.clone()).await;

        next = clock.next_fire(&schedule, &at.max(clock.now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn every_minute() -> CronSchedule {
        CronSchedule::parse("* * * * *").unwrap()
    }

    #[tokio::test]
    async fn test_timer_creation() {
        let timer = CronTimer::start("job-1", every_minute(), |_| async {});

        assert_eq!(timer.id(), "job-1");
        assert_eq!(timer.expression(), "* * * * *");
        assert!(timer.is_active());
        assert_eq!(timer.fire_count(), 0);
    }

    #[tokio::test]
    async fn test_timer_cancel() {
        let timer = CronTimer::start("job-1", every_minute(), |_| async {});
        assert!(timer.next_fire_time().is_some());

        timer.cancel();
        assert!(!timer.is_active());
        assert!(timer.next_fire_time().is_none());
    }

    #[tokio::test]
    async fn test_next_fire_time_is_in_future() {
        let timer = CronTimer::start("job-1", every_minute(), |_| async {});
        let next = timer.next_fire_time().unwrap();
        assert!(next > Local::now());
        assert!(next - Local::now() <= chrono::Duration::seconds(60));
    }

    /// Fires every `tick` regardless of the expression.
    struct TickClock(Duration);

    impl TimerClock for TickClock {
        fn now(&self) -> DateTime<Local> {
            Local::now()
        }

        fn next_fire(&self, _: &CronSchedule, after: &DateTime<Local>) -> Option<DateTime<Local>> {
            chrono::Duration::from_std(self.0).ok().map(|tick| *after + tick)
        }
    }

    fn counting(fired: &Arc<AtomicU64>) -> impl Fn(String) -> std::future::Ready<()> + Send + Sync + 'static {
        let counter = fired.clone();
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test]
    async fn test_timer_fires_on_clock_ticks() {
        let fired = Arc::new(AtomicU64::new(0));
        let timer = CronTimer::start_with_clock(
            "job-1",
            every_minute(),
            Arc::new(TickClock(Duration::from_millis(50))),
            counting(&fired),
        );

        tokio::time::sleep(Duration::from_millis(400)).await;
        let count = fired.load(Ordering::SeqCst);
        assert!(count >= 2, "fired {} times", count);
        assert_eq!(timer.fire_count(), count);
    }

    #[tokio::test]
    async fn test_cancelled_timer_stops_firing() {
        let fired = Arc::new(AtomicU64::new(0));
        let timer = CronTimer::start_with_clock(
            "job-1",
            every_minute(),
            Arc::new(TickClock(Duration::from_millis(50))),
            counting(&fired),
        );

        tokio::time::sleep(Duration::from_millis(200)).await;
        timer.cancel();
        let at_cancel = fired.load(Ordering::SeqCst);
        assert!(at_cancel >= 1);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(fired.load(Ordering::SeqCst), at_cancel);
    }

    #[tokio::test]
    async fn test_dropped_timer_never_fires() {
        let fired = Arc::new(AtomicU64::new(0));
        let counter = fired.clone();
        let timer = CronTimer::start("job-1", every_minute(), move |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        drop(timer);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
