mod layout_error;
mod slot;
mod tag_stats;
mod text_manipulators;

pub mod agent;
pub mod booking_context;
pub mod booking_list_scraper;
pub mod booking_task;
pub mod bot;
pub mod card;
pub mod config;
pub mod notifier;
pub mod preferences;
pub mod requests;
pub mod scheduler;
pub mod site;
pub mod slot_picker;
pub mod slot_scraper;

pub use booking_list_scraper::extract_booked_slots;
pub use layout_error::LayoutError;
pub use preferences::{Preferences, PreferencesError};
pub use slot::{Slot, SlotPreference, weekday_name};
pub use slot_picker::{booking_exists, find_slot, select_slot};
pub use slot_scraper::extract_available_slots;
pub use tag_stats::TagStats;
pub use text_manipulators::{hhmm_to_minutes, minutes_to_hhmm};
