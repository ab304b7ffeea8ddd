//! Daily usage-reset scheduler.
//!
//! One long-lived task per process: compute the next timezone-local
//! midnight, sleep until then, purge stale usage counters, and repeat. A
//! failed tick is logged and the loop continues. The task is cancelled by
//! aborting it at the sleep point; that is a clean shutdown, not an error.

use std::time::Duration;

use chrono::{DateTime, Days, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tokio::task::JoinHandle;

use corvus_store::UsageStore;

/// Time of day the reset fires: midnight local time.
pub const RESET_TIME: NaiveTime = NaiveTime::MIN;

/// Pause after firing so a fast tick cannot double-fire within one second
/// of clock resolution.
const POST_FIRE_DEBOUNCE: Duration = Duration::from_secs(1);

/// Compute the next occurrence of `target` after `now`.
///
/// Today at `target` if `now` is strictly before it, else tomorrow. A DST
/// gap at the target time rolls forward to the next day that has it.
#[must_use]
pub fn next_occurrence(now: DateTime<Tz>, target: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let mut date = now.date_naive();
    if now.time() >= target {
        date = date.checked_add_days(Days::new(1)).unwrap_or(date);
    }

    loop {
        if let Some(next) = tz.from_local_datetime(&date.and_time(target)).earliest() {
            return next;
        }
        // Local time does not exist on this date (DST gap).
        date = date.checked_add_days(Days::new(1)).unwrap_or(date);
    }
}

/// The daily reset loop.
#[derive(Debug)]
pub struct ResetScheduler {
    usage: UsageStore,
    tz: Tz,
}

impl ResetScheduler {
    /// Create a scheduler over the usage store.
    #[must_use]
    pub fn new(usage: UsageStore, tz: Tz) -> Self {
        Self { usage, tz }
    }

    /// Spawn the loop as a background task.
    ///
    /// Abort the returned handle at shutdown; the loop has no other exit.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run the loop forever.
    pub async fn run(self) {
        loop {
            let now = Utc::now().with_timezone(&self.tz);
            let next_run = next_occurrence(now, RESET_TIME);
            self.wait_until(next_run).await;

            tracing::info!(scheduled_for = %next_run, "running daily usage reset");
            match self.usage.purge_stale_usage().await {
                Ok(()) => tracing::info!("daily usage reset completed"),
                Err(err) => tracing::error!(error = %err, "daily usage reset failed"),
            }

            tokio::time::sleep(POST_FIRE_DEBOUNCE).await;
        }
    }

    /// Sleep until the target instant.
    ///
    /// If the instant is already past at suspend time (clock skew), it is
    /// treated as tomorrow instead of firing immediately.
    async fn wait_until(&self, target: DateTime<Tz>) {
        let now = Utc::now().with_timezone(&self.tz);
        let target = if target < now {
            target
                .checked_add_days(Days::new(1))
                .unwrap_or(target)
        } else {
            target
        };

        let wait = (target - now).to_std().unwrap_or(Duration::ZERO);
        tracing::info!(
            wait_seconds = wait.as_secs(),
            until = %target,
            "waiting for next reset"
        );
        tokio::time::sleep(wait).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;

    fn at(tz: Tz, y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Tz> {
        tz.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn one_second_before_midnight_targets_tomorrow() {
        let tz = chrono_tz::Asia::Tokyo;
        let now = at(tz, 2024, 6, 1, 23, 59, 59);
        let next = next_occurrence(now, RESET_TIME);
        assert_eq!(next, at(tz, 2024, 6, 2, 0, 0, 0));
        assert_eq!((next - now).num_seconds(), 1);
    }

    #[test]
    fn exactly_at_target_rolls_to_tomorrow() {
        let tz = chrono_tz::UTC;
        let now = at(tz, 2024, 6, 1, 0, 0, 0);
        let next = next_occurrence(now, RESET_TIME);
        assert_eq!(next, at(tz, 2024, 6, 2, 0, 0, 0));
    }

    #[test]
    fn strictly_before_target_stays_today() {
        let tz = chrono_tz::UTC;
        let now = at(tz, 2024, 6, 1, 9, 30, 0);
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        let next = next_occurrence(now, noon);
        assert_eq!(next, at(tz, 2024, 6, 1, 12, 0, 0));
    }

    #[test]
    fn after_target_rolls_to_tomorrow() {
        let tz = chrono_tz::UTC;
        let now = at(tz, 2024, 6, 1, 12, 0, 1);
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        let next = next_occurrence(now, noon);
        assert_eq!(next, at(tz, 2024, 6, 2, 12, 0, 0));
    }

    #[test]
    fn dst_gap_rolls_forward() {
        // In America/New_York, 2024-03-10 02:30 does not exist.
        let tz = chrono_tz::America::New_York;
        let now = at(tz, 2024, 3, 10, 1, 0, 0);
        let gap_time = NaiveTime::from_hms_opt(2, 30, 0).unwrap();
        let next = next_occurrence(now, gap_time);
        assert_eq!(next, at(tz, 2024, 3, 11, 2, 30, 0));
    }
}
