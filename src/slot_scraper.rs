use std::sync::LazyLock;

use log::info;
use scraper::{ElementRef, Html, Selector};

use crate::{
    layout_error::LayoutError, slot::Slot, tag_stats::TagStats,
    text_manipulators::{selector, trailing_integer},
};

static RESOURCE: LazyLock<Selector> = LazyLock::new(|| selector("div.resource"));
static INTERVAL: LazyLock<Selector> = LazyLock::new(|| selector("div.resource-interval"));
static AVAILABLE_MARKER: LazyLock<Selector> =
    LazyLock::new(|| selector("span.available-booking-slot"));
static BOOK_INTERVAL: LazyLock<Selector> = LazyLock::new(|| selector("a.book-interval"));

const COURT_NAME_ATTR: &str = "data-resource-name";
const START_TIME_ATTR: &str = "data-system-start-time";
const SLOT_KEY_ATTR: &str = "data-test-id";

/// Parses the "book by date" day view into the intervals that can be booked.
///
/// Courts and intervals come out in document order. Slot selection breaks
/// ties on that order, so it must not be changed. The returned slots carry no
/// date; the page only ever shows the date that was queried.
pub fn extract_available_slots(markup: &str) -> Result<Vec<Slot>, LayoutError> {
    let (slots, stats) = extract_available_slots_with_stats(markup)?;
    info!("{}", stats.report());
    Ok(slots)
}

pub fn extract_available_slots_with_stats(
    markup: &str,
) -> Result<(Vec<Slot>, TagStats), LayoutError> {
    let document = Html::parse_document(markup);
    let mut stats = TagStats::new();
    let mut slots = vec![];

    for resource in document.select(&RESOURCE) {
        let court = parse_court_number(resource.value().attr(COURT_NAME_ATTR))?;
        for interval in resource.select(&INTERVAL) {
            // Reserved and blocked intervals simply lack the marker.
            if interval.select(&AVAILABLE_MARKER).next().is_none() {
                continue;
            }
            let slot = parse_interval(interval, court, &mut stats);
            if let Some(slot) = stats.entry(slot) {
                slots.push(slot);
            }
        }
    }

    Ok((slots, stats))
}

fn parse_court_number(name: Option<&str>) -> Result<u32, LayoutError> {
    let name = name.ok_or(LayoutError::MissingCourtName)?;
    if name.trim().is_empty() {
        return Err(LayoutError::BlankCourtName);
    }
    // "<label> <integer>": a bare number has no label and is rejected too.
    let has_label = name.split_whitespace().count() >= 2;
    match trailing_integer(name) {
        Some(court) if has_label && court > 0 => Ok(court),
        _ => Err(LayoutError::InvalidCourtNumber(name.to_string())),
    }
}

fn parse_interval(interval: ElementRef, court: u32, stats: &mut TagStats) -> Option<Slot> {
    let start_time = stats.check(interval.value().attr(START_TIME_ATTR))?;
    let start_time: i64 = start_time.trim().parse().ok()?;
    let start_time = u16::try_from(start_time).ok().filter(|m| *m < 1440)?;

    let book_interval = stats.check(interval.select(&BOOK_INTERVAL).next())?;
    let slot_key = stats.check(book_interval.value().attr(SLOT_KEY_ATTR))?;

    Some(Slot::new(slot_key, court, start_time))
}
