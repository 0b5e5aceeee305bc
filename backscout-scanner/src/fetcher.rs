use crate::error::{Result, ScanError};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Issues one bounded-time GET per page.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let request = self
            .client
            .get(url)
            .build()
            .map_err(|source| ScanError::RequestConstruction {
                url: url.to_string(),
                source,
            })?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|source| ScanError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ScanError::NonSuccessStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ScanError::BodyRead {
                url: url.to_string(),
                source,
            })?;

        debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body.to_vec())
    }
}
