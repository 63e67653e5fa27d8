use std::future::Future;

use chrono::{Days, Local, NaiveDateTime, NaiveTime};
use log::{error, info};

/// When the daily booking run fires, local time. Slots for a week ahead open
/// at midnight.
pub fn default_run_time() -> NaiveTime {
    NaiveTime::from_hms_opt(0, 10, 0).unwrap_or(NaiveTime::MIN)
}

/// The first moment at wall-clock `at` strictly after `now`.
pub fn next_run(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        now.date()
            .checked_add_days(Days::new(1))
            .map(|tomorrow| tomorrow.and_time(at))
            .unwrap_or(NaiveDateTime::MAX)
    }
}

/// Runs `job` every day at `at` (local time), forever. A failing run is
/// logged and the next day's run still happens.
pub async fn run_daily<F, Fut>(at: NaiveTime, mut job: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    loop {
        let now = Local::now().naive_local();
        let next = next_run(now, at);
        info!("Next booking run at {next}");
        let wait = (next - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        info!("Running scheduled booking task");
        if let Err(e) = job().await {
            error!("Error in booking task: {e:#}");
        }
    }
}
