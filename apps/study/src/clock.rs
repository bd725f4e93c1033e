//! Time source and periodic "now" refresh.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(at)),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Publish `clock.now()` every `period` so due-set membership can change
/// without any reviewer action. The task stops once every receiver is gone.
pub fn spawn_ticker(
    clock: Arc<dyn Clock>,
    period: Duration,
) -> (watch::Receiver<DateTime<Utc>>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(clock.now());
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the channel already holds it.
        interval.tick().await;
        loop {
            interval.tick().await;
            if tx.send(clock.now()).is_err() {
                tracing::debug!("Clock ticker stopped: no receivers");
                break;
            }
        }
    });
    (rx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn manual_clock_moves_only_when_told() {
        let clock = ManualClock::new(start());
        let shared = clock.clone();
        assert_eq!(clock.now(), start());
        shared.advance(chrono::Duration::minutes(5));
        assert_eq!(clock.now(), start() + chrono::Duration::minutes(5));
        clock.set(start());
        assert_eq!(shared.now(), start());
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_publishes_each_period() {
        let clock = ManualClock::new(start());
        let (mut rx, _handle) = spawn_ticker(Arc::new(clock.clone()), Duration::from_secs(60));
        assert_eq!(*rx.borrow_and_update(), start());

        clock.advance(chrono::Duration::minutes(1));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), start() + chrono::Duration::minutes(1));

        clock.advance(chrono::Duration::minutes(1));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), start() + chrono::Duration::minutes(2));
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_stops_without_receivers() {
        let clock = ManualClock::new(start());
        let (rx, handle) = spawn_ticker(Arc::new(clock), Duration::from_secs(60));
        drop(rx);
        tokio::time::advance(Duration::from_secs(61)).await;
        handle.await.unwrap();
    }
}
