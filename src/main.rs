use std::{fs, path::PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use court_booker::{
    Preferences,
    bot::{format_bookings, format_schedule},
    config::BookingConfig,
    extract_available_slots, extract_booked_slots, hhmm_to_minutes, minutes_to_hhmm,
    notifier::{Notifier, SubscriberStore, TelegramNotifier},
    scheduler, select_slot,
};
use dotenv::dotenv;

extern crate env_logger;
extern crate log;

use log::{LevelFilter, info, warn};

/// Inspect saved reservation-site pages and booking preferences.
#[derive(Parser)]
#[command(name = "court_booker")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List bookable slots on a saved day view, optionally picking one
    Slots {
        /// Saved HTML of the "book by date" page
        file: PathBuf,

        /// Target start time, HH:MM
        #[arg(long)]
        time: Option<String>,

        /// Acceptable courts, comma separated
        #[arg(long, value_delimiter = ',')]
        courts: Vec<u32>,

        /// Date the page was saved for, YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List existing bookings on a saved "my bookings" page
    Bookings {
        /// Saved HTML of the bookings page
        file: PathBuf,
    },

    /// Show the weekly schedule from a preferences file
    Schedule {
        #[arg(long, env = "TENNIS_PREFERENCES_PATH", default_value = "booking_preferences.json")]
        preferences: PathBuf,
    },

    /// Print when the daily booking run fires next
    NextRun {
        /// Daily run time, HH:MM
        #[arg(long)]
        at: Option<String>,
    },

    /// Send a message to every subscriber of the bot
    Notify {
        message: String,

        /// Deliver without a notification sound
        #[arg(long)]
        silent: bool,
    },
}

fn read_page(file: &PathBuf) -> anyhow::Result<String> {
    fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    match Cli::parse().command {
        Commands::Slots {
            file,
            time,
            courts,
            date,
        } => {
            let markup = read_page(&file)?;
            let mut slots = extract_available_slots(&markup)
                .with_context(|| format!("{} does not look like a day view", file.display()))?;
            if let Some(date) = date {
                slots.iter_mut().for_each(|slot| slot.date = Some(date));
            }
            if slots.is_empty() {
                warn!("No available slots in {}", file.display());
            }
            for slot in &slots {
                println!("{slot}");
            }
            if let Some(time) = time {
                let target = hhmm_to_minutes(&time)
                    .with_context(|| format!("invalid time {time:?}, expected HH:MM"))?;
                match select_slot(&slots, target, &courts) {
                    Some(slot) => println!("Picked: {slot}"),
                    None => println!("No slot at {}", minutes_to_hhmm(target)),
                }
            }
        }
        Commands::Bookings { file } => {
            let booked = extract_booked_slots(&read_page(&file)?);
            print!("{}", format_bookings(&booked));
            println!();
        }
        Commands::Schedule { preferences } => {
            let preferences = Preferences::load(&preferences)
                .with_context(|| format!("failed to load {}", preferences.display()))?;
            print!("{}", format_schedule(&preferences));
        }
        Commands::NextRun { at } => {
            let at = match at {
                Some(at) => {
                    let minutes = hhmm_to_minutes(&at)
                        .with_context(|| format!("invalid time {at:?}, expected HH:MM"))?;
                    NaiveTime::from_hms_opt(u32::from(minutes / 60), u32::from(minutes % 60), 0)
                        .context("time out of range")?
                }
                None => scheduler::default_run_time(),
            };
            let next = scheduler::next_run(Local::now().naive_local(), at);
            info!("Daily run time {at}");
            println!("{next}");
        }
        Commands::Notify { message, silent } => {
            let config = BookingConfig::new()?;
            let notifier = TelegramNotifier::new(
                config.bot_token()?,
                SubscriberStore::new(&config.subscribers_path),
            )?;
            notifier.send_message(&message, silent).await?;
        }
    }
    Ok(())
}
