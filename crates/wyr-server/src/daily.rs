use std::time::Duration;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use tracing::{error, info, warn};

use wyr_engine::Engine;

/// Background task that posts the daily question to every enabled guild
/// once a day at `post_time` (UTC).
pub async fn run_daily_loop(engine: Engine, post_time: NaiveTime) {
    loop {
        let wait = next_run_after(Utc::now(), post_time);
        info!("Next daily question in {}s", wait.as_secs());
        tokio::time::sleep(wait).await;

        let engine = engine.clone();
        match tokio::task::spawn_blocking(move || engine.publish_daily()).await {
            Ok(Ok(count)) => info!("Daily questions posted to {} guilds", count),
            Ok(Err(e)) => warn!("Daily question error: {}", e),
            Err(e) => error!("Daily question task failed: {}", e),
        }
    }
}

/// Time until the next `post_time` strictly after `now`.
pub fn next_run_after(now: DateTime<Utc>, post_time: NaiveTime) -> Duration {
    let today = now.date_naive().and_time(post_time).and_utc();
    let next = if today > now { today } else { today + TimeDelta::days(1) };
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn test_later_today() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 11, 30, 0).unwrap();
        assert_eq!(next_run_after(now, noon()), Duration::from_secs(30 * 60));
    }

    #[test]
    fn test_already_passed_today() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 13, 0, 0).unwrap();
        assert_eq!(next_run_after(now, noon()), Duration::from_secs(23 * 3600));
    }

    #[test]
    fn test_exactly_at_post_time_waits_a_day() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(next_run_after(now, noon()), Duration::from_secs(24 * 3600));
    }
}
