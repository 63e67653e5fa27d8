use chrono::NaiveDate;
use log::{info, warn};

use crate::{
    layout_error::LayoutError, slot::Slot, slot_scraper::extract_available_slots,
    text_manipulators::minutes_to_hhmm,
};

/// Picks the slot to book among `slots`.
///
/// Only slots starting exactly at `target_time` qualify. The first of those
/// (in the given order) on any of `preferred_courts` wins; the rank of a court
/// inside `preferred_courts` does not matter. Without such a match the first
/// qualifying slot is taken, whatever its court.
pub fn select_slot<'a>(
    slots: &'a [Slot],
    target_time: u16,
    preferred_courts: &[u32],
) -> Option<&'a Slot> {
    let mut at_target = slots.iter().filter(|slot| slot.start_time == target_time);
    let first = at_target.clone().next()?;
    if preferred_courts.is_empty() {
        return Some(first);
    }
    Some(
        at_target
            .find(|slot| preferred_courts.contains(&slot.court))
            .unwrap_or(first),
    )
}

/// Extracts the day view and selects a slot for `target_date`.
///
/// The returned slot is stamped with `target_date`.
pub fn find_slot(
    markup: &str,
    target_time: u16,
    target_date: NaiveDate,
    preferred_courts: &[u32],
) -> Result<Option<Slot>, LayoutError> {
    let available = extract_available_slots(markup)?;
    if available.is_empty() {
        warn!("No available slots on the day view for {target_date}");
    } else {
        info!("Available slots: {}", available.len());
    }
    let picked = select_slot(&available, target_time, preferred_courts)
        .cloned()
        .map(|slot| slot.on(target_date));
    if picked.is_none() {
        info!(
            "No slot at {} on {target_date} (preferred courts {preferred_courts:?})",
            minutes_to_hhmm(target_time)
        );
    }
    Ok(picked)
}

/// Whether an existing booking already covers `date` at `start_time`.
pub fn booking_exists(booked: &[Slot], date: NaiveDate, start_time: u16) -> bool {
    booked
        .iter()
        .any(|slot| slot.date == Some(date) && slot.start_time == start_time)
}
