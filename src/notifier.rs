use std::{
    collections::BTreeSet,
    fs, io,
    path::PathBuf,
};

use anyhow::Context;
use log::{error, info};
use serde::Serialize;

use crate::requests::RequestClient;

const TELEGRAM_API: &str = "https://api.telegram.org";

#[allow(async_fn_in_trait)]
pub trait Notifier {
    /// Broadcasts `text` to every subscriber.
    async fn send_message(&self, text: &str, disable_notification: bool) -> anyhow::Result<()>;
}

/// Chat ids that asked for notifications, persisted as a JSON list.
#[derive(Debug, Clone)]
pub struct SubscriberStore {
    path: PathBuf,
}

impl SubscriberStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> anyhow::Result<BTreeSet<i64>> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No subscribed users file found, returning empty set");
                return Ok(BTreeSet::new());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", self.path.display()));
            }
        };
        let users: BTreeSet<i64> = serde_json::from_str(&json)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        info!("Loaded {} subscribed users", users.len());
        Ok(users)
    }

    fn save(&self, users: &BTreeSet<i64>) -> anyhow::Result<()> {
        let json = serde_json::to_string(users)?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        info!("Saved {} subscribed users", users.len());
        Ok(())
    }

    /// Returns `false` if `user_id` was already subscribed.
    pub fn add(&self, user_id: i64) -> anyhow::Result<bool> {
        let mut users = self.load()?;
        let added = users.insert(user_id);
        self.save(&users)?;
        Ok(added)
    }

    /// Returns `false` if `user_id` was not subscribed.
    pub fn remove(&self, user_id: i64) -> anyhow::Result<bool> {
        let mut users = self.load()?;
        if !users.remove(&user_id) {
            return Ok(false);
        }
        self.save(&users)?;
        Ok(true)
    }

    pub fn contains(&self, user_id: i64) -> anyhow::Result<bool> {
        Ok(self.load()?.contains(&user_id))
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    disable_notification: bool,
}

/// Sends through the Telegram Bot API to everyone in a [`SubscriberStore`].
pub struct TelegramNotifier {
    request_client: RequestClient,
    token: String,
    subscribers: SubscriberStore,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, subscribers: SubscriberStore) -> anyhow::Result<Self> {
        let token = token.into();
        info!("Loaded bot token: {}...", token.chars().take(5).collect::<String>());
        Ok(Self {
            request_client: RequestClient::new()?,
            token,
            subscribers,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{TELEGRAM_API}/bot{}/{method}", self.token)
    }
}

impl Notifier for TelegramNotifier {
    async fn send_message(&self, text: &str, disable_notification: bool) -> anyhow::Result<()> {
        let users = self.subscribers.load()?;
        info!("Sending message to {} users", users.len());
        let url = self.method_url("sendMessage");
        for chat_id in users {
            let body = SendMessage {
                chat_id,
                text,
                parse_mode: "HTML",
                disable_notification,
            };
            // One unreachable chat must not keep the others from hearing about it.
            match self.request_client.post_json(&url, &body).await {
                Ok(()) => info!("Message sent successfully to user {chat_id}"),
                Err(e) => error!("Failed to send message to user {chat_id}: {e:#}"),
            }
        }
        Ok(())
    }
}
