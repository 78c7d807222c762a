use crate::{config::ScraperConfig, PageSource, ScraperError};
use std::path::Path;
use tracing::debug;

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<HttpFetcher, ScraperError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .build()?;
        Ok(HttpFetcher { client })
    }
}

#[async_trait::async_trait]
impl PageSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!("GET {} -> {}", url, status);
        if !status.is_success() {
            return Err(ScraperError::StatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

/// Reads `target` from disk when it names an existing file, otherwise
/// fetches it.
pub async fn load<P: PageSource + Sync>(source: &P, target: &str) -> Result<String, ScraperError> {
    if Path::new(target).is_file() {
        Ok(tokio::fs::read_to_string(target).await?)
    } else {
        source.fetch(target).await
    }
}
