use crate::{card::Card, config::Credentials};

/// The browser session driving the reservation site.
///
/// Implementations own navigation, waiting for elements and form filling.
/// Everything that decides *what* to do next lives in [`crate::agent`].
#[allow(async_fn_in_trait)]
pub trait BookingSite {
    async fn open(&mut self, url: &str) -> anyhow::Result<()>;

    /// Dismisses the cookie banner. Failing here is not fatal: the banner is
    /// often absent.
    async fn accept_cookies(&mut self) -> anyhow::Result<()>;

    async fn login(&mut self, credentials: &Credentials) -> anyhow::Result<()>;

    /// Rendered "my bookings" page, or `None` if neither booking layout
    /// showed up in time (which the site does when there are no bookings).
    async fn bookings_markup(&mut self, url: &str) -> anyhow::Result<Option<String>>;

    /// Rendered day view, once its court grid has loaded.
    async fn day_view_markup(&mut self, url: &str) -> anyhow::Result<String>;

    /// Clicks the element whose `data-test-id` is `slot_key`.
    async fn click_slot(&mut self, slot_key: &str) -> anyhow::Result<()>;

    async fn continue_booking(&mut self) -> anyhow::Result<()>;

    /// Label of the pay-now button, `None` when the checkout has no such button.
    async fn paynow_label(&mut self) -> anyhow::Result<Option<String>>;

    async fn click_paynow(&mut self) -> anyhow::Result<()>;

    async fn fill_card(&mut self, card: &Card) -> anyhow::Result<()>;

    async fn submit_payment(&mut self) -> anyhow::Result<()>;

    /// Waits for the "booking has been confirmed" page.
    async fn wait_for_confirmation(&mut self) -> anyhow::Result<bool>;
}
