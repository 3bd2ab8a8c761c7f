//! Roku External Control Protocol client

use std::time::Duration;

use async_trait::async_trait;

use crate::{Error, Result};

/// Side-effecting calls a Roku device accepts
#[async_trait]
pub trait RokuRemote: Send + Sync {
    /// Press a remote key, e.g. `Home` or `VolumeUp`
    async fn keypress(&self, base: &str, key: &str) -> Result<()>;

    /// Launch a channel app at a piece of content
    async fn launch(
        &self,
        base: &str,
        app_id: &str,
        content_id: &str,
        media_type: &str,
    ) -> Result<()>;
}

/// ECP over HTTP
#[derive(Debug, Clone)]
pub struct HttpRokuRemote {
    client: reqwest::Client,
}

impl HttpRokuRemote {
    /// Create a remote whose requests give up after `timeout`
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn post(&self, url: &str, query: &[(&str, &str)]) -> Result<()> {
        tracing::debug!(%url, "roku request");

        let response = self.client.post(url).query(query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Device(format!("roku returned {status}: {body}")));
        }
        Ok(())
    }
}

#[async_trait]
impl RokuRemote for HttpRokuRemote {
    async fn keypress(&self, base: &str, key: &str) -> Result<()> {
        let url = format!("{}/keypress/{key}", base.trim_end_matches('/'));
        self.post(&url, &[]).await
    }

    async fn launch(
        &self,
        base: &str,
        app_id: &str,
        content_id: &str,
        media_type: &str,
    ) -> Result<()> {
        let url = format!("{}/launch/{app_id}", base.trim_end_matches('/'));
        self.post(
            &url,
            &[("contentID", content_id), ("mediaType", media_type)],
        )
        .await
    }
}

/// Normalize a spoken or typed address into a base URL
#[must_use]
pub fn base_url(address: &str) -> String {
    let address = address.trim().trim_end_matches('/');
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{address}")
    }
}
