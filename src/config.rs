use tokio::time::Duration;

/// Target request rate of the origin server is 15 requests per minute.
pub const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_millis(60_000 / 15);

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Minimum delay between the start of two requests.
    pub request_interval: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Rows pulled from the work queue per round trip.
    pub batch_size: u32,
    /// Stop after this many pages, `None` drains the queue.
    pub max_pages: Option<u32>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        ScraperConfig {
            request_interval: DEFAULT_REQUEST_INTERVAL,
            request_timeout: Duration::from_secs(30),
            user_agent: format!("nba-boxscore-scraper/{}", env!("CARGO_PKG_VERSION")),
            batch_size: 10,
            max_pages: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interval_is_four_seconds() {
        assert_eq!(
            ScraperConfig::default().request_interval,
            Duration::from_secs(4)
        );
    }
}
