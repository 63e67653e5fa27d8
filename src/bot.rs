use chrono::NaiveDate;
use log::{error, info, warn};

use crate::{
    agent::fetch_existing_bookings,
    booking_context::BookingContext,
    booking_task::run_booking_task,
    notifier::{Notifier, SubscriberStore},
    preferences::Preferences,
    site::BookingSite,
    slot::{Slot, weekday_name},
    text_manipulators::minutes_to_hhmm,
};

pub const UNAUTHORIZED_REPLY: &str = "⛔️ You are not authorized to use this bot.";

pub const HELP_TEXT: &str = "Available commands:

/start - Subscribe to receive booking notifications and updates
/stop - Unsubscribe from booking notifications
/retry - manually run booking attempt
/view_schedule - Displays your schedule
/view_bookings - List existing bookings
/help - Show this help message
";

const WELCOME_TEXT: &str = "🎾 Welcome to the Tennis Booking Bot!\n\n\
    I'll keep you updated about court bookings. \
    You'll receive notifications about booking attempts and results.\n\n\
    Use /stop to stop receiving updates.\n\
    Use /retry to retry the last booking attempt.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Retry,
    ViewSchedule,
    ViewBookings,
    Help,
}

impl Command {
    /// Parses the leading `/command` of a chat message, ignoring a
    /// `@botname` suffix and any arguments.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?.strip_prefix('/')?;
        let name = word.split('@').next()?;
        match name {
            "start" => Some(Self::Start),
            "stop" => Some(Self::Stop),
            "retry" => Some(Self::Retry),
            "view_schedule" => Some(Self::ViewSchedule),
            "view_bookings" => Some(Self::ViewBookings),
            "help" => Some(Self::Help),
            _ => None,
        }
    }
}

pub fn format_schedule(preferences: &Preferences) -> String {
    let mut message = "Your schedule and preferences:\n\n".to_string();
    for pref in preferences.iter() {
        let courts = pref
            .preferred_courts
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let courts = if courts.is_empty() {
            "any court".to_string()
        } else {
            format!("prefer courts {courts}")
        };
        message += &format!(
            "• {}: {} ({courts})\n",
            capitalize(weekday_name(pref.weekday)),
            minutes_to_hhmm(pref.start_time)
        );
    }
    message
}

pub fn format_bookings(booked: &[Slot]) -> String {
    if booked.is_empty() {
        return "No existing bookings found.".to_string();
    }
    let mut message = "Current Bookings:\n\n".to_string();
    for slot in booked {
        let date = slot
            .date
            .map(|date| date.format("%A, %d %B %Y").to_string())
            .unwrap_or_else(|| "Unknown date".to_string());
        message += &format!(
            "• {date} at {} on Court {}\n",
            minutes_to_hhmm(slot.start_time),
            slot.court
        );
    }
    message
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Answers chat commands. Receiving updates and sending the replies back
/// is left to the chat transport.
pub struct CommandHandler<'a> {
    pub context: &'a BookingContext,
    pub subscribers: &'a SubscriberStore,
}

impl CommandHandler<'_> {
    pub fn is_authorized(&self, user_id: i64) -> bool {
        self.context.config.authorized_users.contains(&user_id)
    }

    /// Runs `command` for `user_id` and returns the replies to send, in order.
    pub async fn handle<S: BookingSite, N: Notifier>(
        &self,
        user_id: i64,
        command: Command,
        site: &mut S,
        notifier: &N,
        today: NaiveDate,
    ) -> Vec<String> {
        if !self.is_authorized(user_id) {
            warn!("Unauthorized access attempt from user {user_id}");
            return vec![UNAUTHORIZED_REPLY.to_string()];
        }
        info!("Received {command:?} from user {user_id}");

        match command {
            Command::Start => match self.subscribers.add(user_id) {
                Ok(_) => {
                    info!("User {user_id} subscribed successfully");
                    vec![WELCOME_TEXT.to_string()]
                }
                Err(e) => failure_reply("Failed to subscribe", e),
            },
            Command::Stop => match self.subscribers.remove(user_id) {
                Ok(true) => vec!["You've been unsubscribed from updates.".to_string()],
                Ok(false) => vec!["You weren't subscribed to updates.".to_string()],
                Err(e) => failure_reply("Failed to unsubscribe", e),
            },
            Command::Retry => {
                match self.subscribers.contains(user_id) {
                    Ok(true) => {}
                    Ok(false) => info!("User {user_id} retried without being subscribed"),
                    Err(e) => error!("Failed to read subscribers: {e:#}"),
                }
                // Progress and results reach subscribers through the notifier.
                run_booking_task(site, notifier, self.context, today, false).await;
                vec!["🔄 Retrying the last booking attempt...".to_string()]
            }
            Command::ViewSchedule => vec![format_schedule(&self.context.current_preferences())],
            Command::ViewBookings => match fetch_existing_bookings(site, self.context, today).await {
                Ok(booked) => {
                    info!("Fetched {} bookings for {user_id}", booked.len());
                    vec!["Fetching bookings...".to_string(), format_bookings(&booked)]
                }
                Err(e) => failure_reply("Failed to fetch bookings", e),
            },
            Command::Help => vec![HELP_TEXT.to_string()],
        }
    }
}

fn failure_reply(what: &str, e: anyhow::Error) -> Vec<String> {
    error!("{what}: {e:#}");
    vec![format!("❌ {what}: {e}")]
}
