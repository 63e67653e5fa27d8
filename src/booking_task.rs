use chrono::{Datelike, Days, NaiveDate};
use log::{error, info};

use crate::{
    agent::{BookingOutcome, fetch_and_book_session},
    booking_context::BookingContext,
    notifier::Notifier,
    site::BookingSite,
    slot::weekday_name,
    text_manipulators::minutes_to_hhmm,
};

/// Bookings open a week ahead.
pub const DAYS_AHEAD: u64 = 7;

pub const RETRY_HINT: &str = "You can retry via /retry command";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Nothing is configured for the target weekday.
    NoPreference { date: NaiveDate },
    Attempted(BookingOutcome),
    Failed,
}

pub fn target_date(today: NaiveDate) -> NaiveDate {
    today + Days::new(DAYS_AHEAD)
}

/// The daily job: books next week's slot for today's weekday and tells the
/// subscribers how it went. Errors are reported through `notifier`, not
/// returned.
pub async fn run_booking_task<S: BookingSite, N: Notifier>(
    site: &mut S,
    notifier: &N,
    context: &BookingContext,
    today: NaiveDate,
    dry_run: bool,
) -> TaskOutcome {
    let date = target_date(today);
    let weekday = weekday_name(date.weekday());
    let date_str = date.format("%Y-%m-%d").to_string();
    info!("Starting booking process for {date_str} ({weekday})");

    let preferences = context.current_preferences();
    let Some(preference) = preferences.for_date(date) else {
        info!("No booking preferences found for {weekday}. Skipping booking for {date_str}");
        return TaskOutcome::NoPreference { date };
    };

    let message = format!("Based on preferences for {weekday}, we should try to book something! {preference}");
    info!("{message}");
    notify(notifier, &message, true).await;

    let failure = |reason: &str| {
        format!(
            "❌ Failed to book court for {date_str} at {}: {reason}",
            minutes_to_hhmm(preference.start_time)
        )
    };

    match fetch_and_book_session(site, context, preference, date, dry_run).await {
        Ok(outcome) => match outcome.slot() {
            Some(slot) => {
                let message = format!(
                    "✅ Successfully booked court {} for {date_str} at {}",
                    slot.court,
                    minutes_to_hhmm(slot.start_time)
                );
                info!("{message}");
                notify(notifier, &message, false).await;
                TaskOutcome::Attempted(outcome)
            }
            None => {
                let message = failure(&outcome.to_string());
                error!("{message}");
                notify(notifier, &message, false).await;
                notify(notifier, RETRY_HINT, false).await;
                TaskOutcome::Attempted(outcome)
            }
        },
        Err(e) => {
            let message = failure(&format!("{e:#}"));
            error!("{message}");
            notify(notifier, &message, false).await;
            notify(notifier, RETRY_HINT, false).await;
            TaskOutcome::Failed
        }
    }
}

async fn notify<N: Notifier>(notifier: &N, text: &str, disable_notification: bool) {
    if let Err(e) = notifier.send_message(text, disable_notification).await {
        error!("Error sending notification: {e:#}");
    }
}
