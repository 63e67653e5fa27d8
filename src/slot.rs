use std::fmt;

use chrono::{NaiveDate, Weekday};

use crate::text_manipulators::minutes_to_hhmm;

/// A court interval, either open for booking or already booked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// `data-test-id` of the booking control, or the trailing segment of the
    /// booking-detail link for entries from the bookings list.
    pub slot_key: String,
    pub court: u32,
    /// Minutes since midnight, always in `0..1440`.
    pub start_time: u16,
    pub date: Option<NaiveDate>,
}

impl Slot {
    pub fn new(slot_key: impl Into<String>, court: u32, start_time: u16) -> Self {
        Self {
            slot_key: slot_key.into(),
            court,
            start_time,
            date: None,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = match self.date {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => "None".to_string(),
        };
        write!(
            f,
            "Slot<slot_key={}, court={}, date={}, start_time={}>",
            self.slot_key,
            self.court,
            date,
            minutes_to_hhmm(self.start_time)
        )
    }
}

/// One weekday's booking rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPreference {
    pub weekday: Weekday,
    pub start_time: u16,
    /// Acceptable courts. Only membership matters when picking a slot.
    pub preferred_courts: Vec<u32>,
}

impl fmt::Display for SlotPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SlotPreference(weekday={}, start_time={}, preferred_courts={:?})",
            weekday_name(self.weekday),
            minutes_to_hhmm(self.start_time),
            self.preferred_courts
        )
    }
}

/// Lowercase English name, as used for keys in the preferences document.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}
