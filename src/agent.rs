use std::fmt;

use anyhow::{Context, bail};
use chrono::NaiveDate;
use log::{info, warn};

use crate::{
    booking_context::BookingContext,
    booking_list_scraper::extract_booked_slots,
    card::Card,
    site::BookingSite,
    slot::{Slot, SlotPreference},
    slot_picker::{booking_exists, find_slot},
    text_manipulators::minutes_to_hhmm,
};

/// How a booking attempt ended, short of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Booked(Slot),
    /// Everything up to the final submit went through.
    DryRun(Slot),
    AlreadyBooked { date: NaiveDate, start_time: u16 },
    NoSlot { date: NaiveDate, start_time: u16 },
}

impl BookingOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Booked(_) | Self::DryRun(_))
    }

    pub fn slot(&self) -> Option<&Slot> {
        match self {
            Self::Booked(slot) | Self::DryRun(slot) => Some(slot),
            _ => None,
        }
    }
}

impl fmt::Display for BookingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Booked(slot) => write!(f, "Booked {slot}"),
            Self::DryRun(slot) => write!(f, "Dry run reached checkout for {slot}"),
            Self::AlreadyBooked { date, start_time } => write!(
                f,
                "Already have a booking for {} at {}",
                date.format("%Y-%m-%d"),
                minutes_to_hhmm(*start_time)
            ),
            Self::NoSlot { date, start_time } => write!(
                f,
                "Found no slot at {} for preferred time {}",
                date.format("%Y-%m-%d"),
                minutes_to_hhmm(*start_time)
            ),
        }
    }
}

async fn sign_in<S: BookingSite>(
    site: &mut S,
    context: &BookingContext,
    date: NaiveDate,
) -> anyhow::Result<()> {
    let credentials = context.config.credentials()?;
    info!("Initial page load start");
    site.open(&context.config.site.book_by_date(date)).await?;
    if let Err(e) = site.accept_cookies().await {
        info!("Assuming cookie banner is not present: {e:#}");
    }
    info!("Login start");
    site.login(credentials).await.context("login failed")?;
    info!("Logged in");
    Ok(())
}

async fn fetch_booked_slots<S: BookingSite>(
    site: &mut S,
    context: &BookingContext,
) -> anyhow::Result<Vec<Slot>> {
    info!("Fetching existing bookings");
    let Some(markup) = site.bookings_markup(&context.config.site.bookings()).await? else {
        info!("Booking list did not render, assuming no existing bookings");
        return Ok(vec![]);
    };
    let booked = extract_booked_slots(&markup);
    info!("Found {} existing booking(s)", booked.len());
    Ok(booked)
}

/// Logs in and lists the account's existing bookings.
pub async fn fetch_existing_bookings<S: BookingSite>(
    site: &mut S,
    context: &BookingContext,
    today: NaiveDate,
) -> anyhow::Result<Vec<Slot>> {
    sign_in(site, context, today).await?;
    fetch_booked_slots(site, context).await
}

/// Books the slot matching `preference` on `target_date`.
///
/// Returns early without touching the day view when a booking at the same
/// date and time already exists.
pub async fn fetch_and_book_session<S: BookingSite>(
    site: &mut S,
    context: &BookingContext,
    preference: &SlotPreference,
    target_date: NaiveDate,
    dry_run: bool,
) -> anyhow::Result<BookingOutcome> {
    let target_time = preference.start_time;
    sign_in(site, context, target_date).await?;

    let booked = fetch_booked_slots(site, context).await?;
    if booking_exists(&booked, target_date, target_time) {
        let outcome = BookingOutcome::AlreadyBooked {
            date: target_date,
            start_time: target_time,
        };
        info!("{outcome}");
        return Ok(outcome);
    }

    info!("Slot booking process start");
    let markup = site
        .day_view_markup(&context.config.site.book_by_date(target_date))
        .await?;
    let slot = find_slot(&markup, target_time, target_date, &preference.preferred_courts)
        .context("day view layout changed")?;
    let Some(slot) = slot else {
        let outcome = BookingOutcome::NoSlot {
            date: target_date,
            start_time: target_time,
        };
        warn!("{outcome}");
        return Ok(outcome);
    };

    info!("Found available slot {slot}");
    site.click_slot(&slot.slot_key).await?;
    checkout(site, context.config.card.as_ref(), dry_run).await?;
    info!("Booking process completed");
    Ok(if dry_run {
        BookingOutcome::DryRun(slot)
    } else {
        BookingOutcome::Booked(slot)
    })
}

/// Walks the checkout after a slot has been clicked.
///
/// Free sessions either confirm straight away or show a zero-cost pay-now
/// button; paid ones need the card.
pub async fn checkout<S: BookingSite>(
    site: &mut S,
    card: Option<&Card>,
    dry_run: bool,
) -> anyhow::Result<()> {
    info!("Clicking continue booking button");
    site.continue_booking().await?;

    let Some(label) = site.paynow_label().await? else {
        info!("Paynow button not found, maybe free booking?");
        if site.wait_for_confirmation().await? {
            info!("Free booking confirmed");
            return Ok(());
        }
        bail!("neither a pay-now button nor a booking confirmation appeared");
    };

    if label.to_lowercase().contains("pay") {
        info!("Actually need to pay");
        let card = card.context("payment required but TENNIS_CARD is not set")?;
        site.click_paynow().await?;
        info!("Filling card {}", card.masked_number());
        site.fill_card(card).await?;
        if dry_run {
            info!("Dry run, skipping submit");
            return Ok(());
        }
        site.submit_payment().await?;
    } else {
        info!("No need to pay");
        if dry_run {
            info!("Dry run, skipping booking");
            return Ok(());
        }
        site.click_paynow().await?;
    }

    if !site.wait_for_confirmation().await? {
        bail!("booking confirmation did not appear");
    }
    info!("Successfully booked session");
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::Weekday;

    use super::*;
    use crate::{
        config::{BookingConfig, Credentials, SiteUrls},
        preferences::Preferences,
    };

    /// Scripted [`BookingSite`] recording every call it receives.
    #[derive(Default)]
    pub(crate) struct FakeSite {
        pub bookings: Option<String>,
        pub day_view: String,
        pub paynow: Option<String>,
        pub confirms: bool,
        pub fail_login: bool,
        pub calls: Vec<String>,
    }

    impl BookingSite for FakeSite {
        async fn open(&mut self, url: &str) -> anyhow::Result<()> {
            self.calls.push(format!("open {url}"));
            Ok(())
        }
        async fn accept_cookies(&mut self) -> anyhow::Result<()> {
            self.calls.push("accept_cookies".into());
            bail!("no banner")
        }
        async fn login(&mut self, credentials: &Credentials) -> anyhow::Result<()> {
            self.calls.push(format!("login {}", credentials.username));
            if self.fail_login {
                bail!("account options never appeared");
            }
            Ok(())
        }
        async fn bookings_markup(&mut self, url: &str) -> anyhow::Result<Option<String>> {
            self.calls.push(format!("bookings {url}"));
            Ok(self.bookings.clone())
        }
        async fn day_view_markup(&mut self, url: &str) -> anyhow::Result<String> {
            self.calls.push(format!("day_view {url}"));
            Ok(self.day_view.clone())
        }
        async fn click_slot(&mut self, slot_key: &str) -> anyhow::Result<()> {
            self.calls.push(format!("click_slot {slot_key}"));
            Ok(())
        }
        async fn continue_booking(&mut self) -> anyhow::Result<()> {
            self.calls.push("continue_booking".into());
            Ok(())
        }
        async fn paynow_label(&mut self) -> anyhow::Result<Option<String>> {
            Ok(self.paynow.clone())
        }
        async fn click_paynow(&mut self) -> anyhow::Result<()> {
            self.calls.push("click_paynow".into());
            Ok(())
        }
        async fn fill_card(&mut self, card: &Card) -> anyhow::Result<()> {
            self.calls.push(format!("fill_card {}", card.masked_number()));
            Ok(())
        }
        async fn submit_payment(&mut self) -> anyhow::Result<()> {
            self.calls.push("submit_payment".into());
            Ok(())
        }
        async fn wait_for_confirmation(&mut self) -> anyhow::Result<bool> {
            self.calls.push("wait_for_confirmation".into());
            Ok(self.confirms)
        }
    }

    pub(crate) fn context(card: Option<Card>) -> BookingContext {
        BookingContext {
            config: BookingConfig {
                credentials: Some(Credentials {
                    username: "player".into(),
                    password: "secret".into(),
                }),
                bot_token: None,
                card,
                site: SiteUrls::new("https://site.test/Venue"),
                authorized_users: vec![42],
                preferences_path: "unused.json".into(),
                subscribers_path: "unused.json".into(),
            },
            preferences: Preferences::from_json(
                r#"{"preferences": [{"weekdays": ["saturday"], "time": "08:00", "courts": [3, 4]}]}"#,
            )
            .unwrap(),
        }
    }

    pub(crate) const DAY_VIEW: &str = r#"
        <div class="resource" data-resource-name="Court 1">
            <div class="resource-interval" data-system-start-time="480">
                <span class="available-booking-slot"></span>
                <a class="book-interval" data-test-id="c1-0800"></a>
            </div>
        </div>
        <div class="resource" data-resource-name="Court 4">
            <div class="resource-interval" data-system-start-time="480">
                <span class="available-booking-slot"></span>
                <a class="book-interval" data-test-id="c4-0800"></a>
            </div>
        </div>"#;

    fn saturday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 23).unwrap()
    }

    fn preference() -> SlotPreference {
        SlotPreference {
            weekday: Weekday::Sat,
            start_time: 480,
            preferred_courts: vec![3, 4],
        }
    }

    #[tokio::test]
    async fn books_preferred_court_for_free() {
        let mut site = FakeSite {
            day_view: DAY_VIEW.into(),
            paynow: Some("Confirm booking".into()),
            confirms: true,
            ..Default::default()
        };
        let outcome = fetch_and_book_session(&mut site, &context(None), &preference(), saturday(), false)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            BookingOutcome::Booked(Slot::new("c4-0800", 4, 480).on(saturday()))
        );
        assert_eq!(
            site.calls,
            vec![
                "open https://site.test/Venue/Booking/BookByDate#?date=2025-08-23&role=guest",
                "accept_cookies",
                "login player",
                "bookings https://site.test/Venue/Booking/Bookings",
                "day_view https://site.test/Venue/Booking/BookByDate#?date=2025-08-23&role=guest",
                "click_slot c4-0800",
                "continue_booking",
                "click_paynow",
                "wait_for_confirmation",
            ]
        );
    }

    #[tokio::test]
    async fn existing_booking_short_circuits() {
        let mut site = FakeSite {
            bookings: Some(
                r#"<div class="block-panel">
                    <div class="block-panel-title"><h2>Sat, 23 Aug 2025, 08:00 - 09:00</h2></div>
                    <span class="block-panel-row-label">Resource(s)</span>
                    <span class="block-panel-row-value">Court 3</span>
                    <a class="cs-btn" href="/Booking/Details/52846ae4"></a>
                </div>"#
                    .into(),
            ),
            day_view: DAY_VIEW.into(),
            ..Default::default()
        };
        let outcome = fetch_and_book_session(&mut site, &context(None), &preference(), saturday(), false)
            .await
            .unwrap();
        assert_eq!(
            outcome.to_string(),
            "Already have a booking for 2025-08-23 at 08:00"
        );
        assert!(!site.calls.iter().any(|call| call.starts_with("day_view")));
    }

    #[tokio::test]
    async fn no_slot_at_preferred_time() {
        let mut site = FakeSite {
            day_view: DAY_VIEW.replace("480", "540"),
            ..Default::default()
        };
        let outcome = fetch_and_book_session(&mut site, &context(None), &preference(), saturday(), false)
            .await
            .unwrap();
        assert!(!outcome.is_success());
        assert_eq!(
            outcome.to_string(),
            "Found no slot at 2025-08-23 for preferred time 08:00"
        );
        assert!(!site.calls.iter().any(|call| call.starts_with("click_slot")));
    }

    #[tokio::test]
    async fn layout_change_is_an_error() {
        let mut site = FakeSite {
            day_view: r#"<div class="resource" data-resource-name="Centre Court"></div>"#.into(),
            ..Default::default()
        };
        let err = fetch_and_book_session(&mut site, &context(None), &preference(), saturday(), false)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("Could not parse court number"));
    }

    #[tokio::test]
    async fn login_failure_propagates() {
        let mut site = FakeSite {
            fail_login: true,
            ..Default::default()
        };
        assert!(
            fetch_and_book_session(&mut site, &context(None), &preference(), saturday(), false)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn paid_checkout_uses_card() {
        let card: Card = "4242424242424242@12/30@123".parse().unwrap();
        let mut site = FakeSite {
            paynow: Some("Pay now £6.00".into()),
            confirms: true,
            ..Default::default()
        };
        checkout(&mut site, Some(&card), false).await.unwrap();
        assert_eq!(
            site.calls,
            vec![
                "continue_booking",
                "click_paynow",
                "fill_card 4242****",
                "submit_payment",
                "wait_for_confirmation",
            ]
        );
    }

    #[tokio::test]
    async fn paid_checkout_dry_run_stops_before_submit() {
        let card: Card = "4242424242424242@12/30@123".parse().unwrap();
        let mut site = FakeSite {
            paynow: Some("PAY".into()),
            ..Default::default()
        };
        checkout(&mut site, Some(&card), true).await.unwrap();
        assert_eq!(site.calls.last().map(String::as_str), Some("fill_card 4242****"));
    }

    #[tokio::test]
    async fn paid_checkout_without_card_fails() {
        let mut site = FakeSite {
            paynow: Some("Pay now".into()),
            ..Default::default()
        };
        assert!(checkout(&mut site, None, false).await.is_err());
        assert!(!site.calls.contains(&"click_paynow".to_string()));
    }

    #[tokio::test]
    async fn free_checkout_without_paynow_button() {
        let mut site = FakeSite {
            confirms: true,
            ..Default::default()
        };
        checkout(&mut site, None, false).await.unwrap();

        let mut site = FakeSite::default();
        assert!(checkout(&mut site, None, false).await.is_err());
    }

    #[tokio::test]
    async fn free_checkout_dry_run() {
        let mut site = FakeSite {
            day_view: DAY_VIEW.into(),
            paynow: Some("Confirm".into()),
            ..Default::default()
        };
        let outcome = fetch_and_book_session(&mut site, &context(None), &preference(), saturday(), true)
            .await
            .unwrap();
        assert!(matches!(outcome, BookingOutcome::DryRun(ref slot) if slot.court == 4));
        assert!(!site.calls.contains(&"click_paynow".to_string()));
    }

    #[tokio::test]
    async fn lists_existing_bookings() {
        let mut site = FakeSite::default();
        let booked = fetch_existing_bookings(&mut site, &context(None), saturday())
            .await
            .unwrap();
        assert!(booked.is_empty());
        assert_eq!(site.calls[2], "login player");
    }
}
