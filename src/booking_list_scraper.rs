use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use log::info;
use scraper::{ElementRef, Html, Selector};

use crate::{
    slot::Slot,
    tag_stats::TagStats,
    text_manipulators::{
        extract_text, hhmm_to_minutes, selector, trailing_integer, trailing_path_segment,
    },
};

// Tabular layout.
static BOOKING_TBODY: LazyLock<Selector> = LazyLock::new(|| selector("tbody#booking-tbody"));
static ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static SUMMARY_CELL: LazyLock<Selector> = LazyLock::new(|| selector("td.booking-summary"));
static STRONG: LazyLock<Selector> = LazyLock::new(|| selector("strong"));
static TIME_LABEL: LazyLock<Selector> = LazyLock::new(|| selector("td.time span.booking-time"));
static RESOURCE_LABEL: LazyLock<Selector> =
    LazyLock::new(|| selector("td.resource span.booking-resource"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a"));

// Panel layout.
static PANEL: LazyLock<Selector> = LazyLock::new(|| selector("div.block-panel"));
static PANEL_TITLE: LazyLock<Selector> = LazyLock::new(|| selector("div.block-panel-title h2"));
static ROW_LABEL: LazyLock<Selector> = LazyLock::new(|| selector("span.block-panel-row-label"));
static ROW_VALUE: LazyLock<Selector> = LazyLock::new(|| selector("span.block-panel-row-value"));
static DETAILS_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a.cs-btn"));

const RESOURCE_ROW_LABEL: &str = "Resource(s)";

/// Parses the "my bookings" page into the user's existing reservations.
///
/// The site has shipped two layouts. There is no reliable marker telling them
/// apart, so the panel layout (the one currently deployed) is tried first and
/// the tabular layout only when that finds nothing. An empty panel page
/// therefore always falls through to the tabular parser.
pub fn extract_booked_slots(markup: &str) -> Vec<Slot> {
    let document = Html::parse_document(markup);
    let slots = extract_panel_bookings(&document);
    if !slots.is_empty() {
        return slots;
    }
    extract_tabular_bookings(&document)
}

/// Panel layout: one `div.block-panel` per booking, titled
/// `Tue, 19 Aug 2025, 16:00 - 17:00`.
pub fn extract_panel_bookings(document: &Html) -> Vec<Slot> {
    let mut stats = TagStats::new();
    let slots = document
        .select(&PANEL)
        .filter_map(|panel| {
            let slot = parse_panel(panel, &mut stats);
            stats.entry(slot)
        })
        .collect();
    info!("Panel bookings: {}", stats.report());
    slots
}

/// Tabular layout: rows of `tbody#booking-tbody`.
pub fn extract_tabular_bookings(document: &Html) -> Vec<Slot> {
    let mut stats = TagStats::new();
    let Some(tbody) = stats.check(document.select(&BOOKING_TBODY).next()) else {
        info!("Tabular bookings: {}", stats.report());
        return vec![];
    };
    let slots = tbody
        .select(&ROW)
        .filter_map(|row| {
            let slot = parse_row(row, &mut stats);
            stats.entry(slot)
        })
        .collect();
    info!("Tabular bookings: {}", stats.report());
    slots
}

fn parse_panel(panel: ElementRef, stats: &mut TagStats) -> Option<Slot> {
    let title = stats.check(panel.select(&PANEL_TITLE).next())?;
    let booked_at = parse_panel_title(&extract_text(title))?;

    let label = stats.check(
        panel
            .select(&ROW_LABEL)
            .find(|label| extract_text(*label).contains(RESOURCE_ROW_LABEL)),
    )?;
    let value = stats.check(
        label
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|sibling| ROW_VALUE.matches(sibling)),
    )?;
    let court = trailing_integer(&extract_text(value))?;

    let link = stats.check(panel.select(&DETAILS_LINK).next())?;
    let href = stats.check(link.value().attr("href"))?;

    let start_time = (booked_at.hour() * 60 + booked_at.minute()) as u16;
    Some(Slot::new(trailing_path_segment(href), court, start_time).on(booked_at.date()))
}

/// `<Weekday>, DD Mon YYYY, HH:MM - HH:MM`; only the date and the start are kept.
fn parse_panel_title(title: &str) -> Option<NaiveDateTime> {
    let mut parts = title.trim().split(',');
    let (_weekday, date, times) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let start = times.split('-').next()?.trim();
    NaiveDateTime::parse_from_str(&format!("{} {}", date.trim(), start), "%d %b %Y %H:%M").ok()
}

fn parse_row(row: ElementRef, stats: &mut TagStats) -> Option<Slot> {
    let summary = stats.check(row.select(&SUMMARY_CELL).next())?;
    let date = stats.check(summary.select(&STRONG).next())?;
    let date = NaiveDate::parse_from_str(extract_text(date).trim(), "%d/%m/%Y").ok()?;

    let time = stats.check(row.select(&TIME_LABEL).next())?;
    let resource = stats.check(row.select(&RESOURCE_LABEL).next())?;
    let court = trailing_integer(&extract_text(resource))?;
    let time = extract_text(time);
    let start_time = hhmm_to_minutes(time.split('-').next()?)?;

    let link = stats.check(summary.select(&LINK).next())?;
    let href = stats.check(link.value().attr("href"))?;

    Some(Slot::new(trailing_path_segment(href), court, start_time).on(date))
}
