use scraper::{ElementRef, Selector};

/// Parses a hard-coded CSS selector, panicking on a typo.
pub fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}

pub fn extract_text(node: ElementRef) -> String {
    node.text().collect::<String>()
}

/// Formats minutes since midnight as `HH:MM`.
pub fn minutes_to_hhmm(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Parses `HH:MM` into minutes since midnight.
pub fn hhmm_to_minutes(text: &str) -> Option<u16> {
    let (hours, minutes) = text.trim().split_once(':')?;
    let hours: u16 = hours.trim().parse().ok()?;
    let minutes: u16 = minutes.trim().parse().ok()?;
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Last `/`-separated piece of a link, e.g. the booking id of
/// `/Booking/BookingConfirmation/<id>`.
pub fn trailing_path_segment(href: &str) -> &str {
    href.rsplit('/').next().unwrap_or(href)
}

/// Integer at the end of a label such as `Court 3` or `Tennis Court 12`.
pub fn trailing_integer(label: &str) -> Option<u32> {
    label.split_whitespace().last()?.parse().ok()
}
