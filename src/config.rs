use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, de::DeserializeOwned};

use crate::card::Card;

const DEFAULT_SITE_URL: &str = "https://clubspark.lta.org.uk/PrioryPark2";

fn default_site_url() -> String {
    DEFAULT_SITE_URL.to_string()
}

fn default_preferences_path() -> String {
    "booking_preferences.json".to_string()
}

fn default_subscribers_path() -> String {
    "subscribed_users.json".to_string()
}

/// The env vars read by the booking job and the bot, all `TENNIS_` prefixed.
#[derive(Debug, Deserialize)]
pub struct BookingEnv {
    username: Option<String>,
    password: Option<String>,
    bot_token: Option<String>,
    card: Option<String>,
    #[serde(default = "default_site_url")]
    site_url: String,
    #[serde(default)]
    authorized_users: Vec<i64>,
    #[serde(default = "default_preferences_path")]
    preferences_path: String,
    #[serde(default = "default_subscribers_path")]
    subscribers_path: String,
}

impl BookingEnv {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from_prefixed_env("TENNIS_")
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct BookingConfig {
    pub credentials: Option<Credentials>,
    pub bot_token: Option<String>,
    pub card: Option<Card>,
    pub site: SiteUrls,
    pub authorized_users: Vec<i64>,
    pub preferences_path: String,
    pub subscribers_path: String,
}

impl BookingConfig {
    pub fn new() -> anyhow::Result<Self> {
        Self::from_env(BookingEnv::load()?)
    }

    pub fn from_env(env: BookingEnv) -> anyhow::Result<Self> {
        let credentials = match (env.username, env.password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(Credentials { username, password })
            }
            _ => None,
        };
        let card = env
            .card
            .map(|card| card.parse::<Card>())
            .transpose()
            .context("TENNIS_CARD is not in number@expiry@cvc form")?;
        Ok(Self {
            credentials,
            bot_token: env.bot_token.filter(|token| !token.is_empty()),
            card,
            site: SiteUrls::new(env.site_url),
            authorized_users: env.authorized_users,
            preferences_path: env.preferences_path,
            subscribers_path: env.subscribers_path,
        })
    }

    pub fn credentials(&self) -> anyhow::Result<&Credentials> {
        self.credentials
            .as_ref()
            .context("TENNIS_USERNAME and TENNIS_PASSWORD environment variables must be set")
    }

    pub fn bot_token(&self) -> anyhow::Result<&str> {
        self.bot_token
            .as_deref()
            .context("TENNIS_BOT_TOKEN environment variable must be set")
    }
}

/// Pages of the reservation site, relative to the venue's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrls {
    base: String,
}

impl SiteUrls {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn book_by_date(&self, date: NaiveDate) -> String {
        format!(
            "{}/Booking/BookByDate#?date={}&role=guest",
            self.base,
            date.format("%Y-%m-%d")
        )
    }

    pub fn bookings(&self) -> String {
        format!("{}/Booking/Bookings", self.base)
    }
}

impl Default for SiteUrls {
    fn default() -> Self {
        Self::new(DEFAULT_SITE_URL)
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_prefixed_env(prefix: &str) -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config = envy::prefixed(prefix)
            .from_env::<Self>()
            .with_context(|| format!("failed to load {prefix}* env variables into config struct"))?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}
