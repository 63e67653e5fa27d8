use std::time::Duration;

use reqwest::{Client, ClientBuilder, Response};
use serde::Serialize;

const TIMEOUT: Duration = Duration::from_secs(30);

pub struct RequestClient {
    client: Client,
}

impl RequestClient {
    pub fn new() -> anyhow::Result<Self> {
        let client = ClientBuilder::new().timeout(TIMEOUT).build()?;
        Ok(Self { client })
    }

    pub async fn post_json_response<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> anyhow::Result<Response> {
        let response = self.client.post(url).json(body).send().await?;
        Ok(response)
    }

    /// Posts `body` and fails on any non-2xx status, including the response
    /// text in the error.
    pub async fn post_json<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> anyhow::Result<()> {
        let response = self.post_json_response(url, body).await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("{status}: {text}");
        }
        Ok(())
    }
}
