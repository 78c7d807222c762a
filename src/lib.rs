use scraper::Html;
use tokio::{
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::{debug, error, info, warn};

pub mod bref;
pub mod config;
pub mod fetch;
pub mod page;
pub mod queue;
pub mod sink;

mod data;
mod error;
mod utils;

pub use config::ScraperConfig;
pub use data::Table;
pub use error::ScraperError;

pub trait Extractor {
    type Record: Send + Sync;

    fn can_be_scrapped(&self, doc: &Html) -> bool;
    fn extract(&self, doc: &Html, url: Option<&str>) -> Vec<Self::Record>;
}

/// Where page HTML comes from.
#[async_trait::async_trait]
pub trait PageSource {
    async fn fetch(&self, url: &str) -> Result<String, ScraperError>;
}

/// Pending game URLs and their acknowledgement.
///
/// Rows carry a monotonically increasing id so a run can walk the queue
/// once, past URLs that failed and stay pending.
#[async_trait::async_trait]
pub trait WorkQueue {
    async fn pending_after(&self, cursor: i64, n: u32) -> Result<Vec<(i64, String)>, ScraperError>;
    async fn pending_count(&self) -> Result<u32, ScraperError>;
    /// Returns `false` when the URL was already queued.
    async fn enqueue(&self, url: &str) -> Result<bool, ScraperError>;
    async fn mark_scraped(&self, url: &str) -> Result<(), ScraperError>;
    async fn mark_warned(&self, url: &str) -> Result<(), ScraperError>;

    async fn enqueue_all(&self, urls: &[String]) -> Result<u32, ScraperError> {
        let mut added = 0;
        for url in urls {
            if self.enqueue(url).await? {
                added += 1;
            }
        }
        Ok(added)
    }
}

#[async_trait::async_trait]
pub trait Sink {
    type Record: Send + Sync;

    async fn write(&self, url: &str, records: &[Self::Record]) -> Result<(), ScraperError>;
}

/// Minimum spacing between the start of two requests.
pub struct Throttle {
    interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Throttle {
        Throttle {
            interval,
            last_request: Mutex::new(None),
        }
    }

    pub async fn wait(&self) {
        let mut last_request = self.last_request.lock().await;
        if let Some(last) = *last_request {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }
        last_request.replace(Instant::now());
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub scraped: u32,
    pub warned: u32,
    pub failed: u32,
    pub records: u32,
}

enum Outcome {
    Scraped(u32),
    Warned,
}

pub async fn run_scrapper<E, Q, P, S>(
    extractor: &E,
    queue: &Q,
    source: &P,
    sink: &S,
    config: &ScraperConfig,
) -> Result<RunSummary, ScraperError>
where
    E: Extractor,
    Q: WorkQueue + Sync,
    P: PageSource + Sync,
    S: Sink<Record = E::Record> + Sync,
{
    let throttle = Throttle::new(config.request_interval);
    let mut summary = RunSummary::default();
    let mut cursor = 0;
    let mut visited = 0;

    info!("Pending URLs: {}", queue.pending_count().await?);

    'batches: loop {
        let batch = queue.pending_after(cursor, config.batch_size).await?;
        if batch.is_empty() {
            break;
        }

        for (id, url) in batch {
            if config.max_pages.map_or(false, |max| visited >= max) {
                break 'batches;
            }
            cursor = id;
            visited += 1;

            throttle.wait().await;
            match handle(&url, extractor, queue, source, sink).await {
                Ok(Outcome::Scraped(n)) => {
                    summary.scraped += 1;
                    summary.records += n;
                    info!("[{}] Insert {} records {}", summary.scraped, n, url);
                }
                Ok(Outcome::Warned) => summary.warned += 1,
                Err(e) => {
                    summary.failed += 1;
                    error!("Failed {}: {}", url, e);
                }
            }
        }
    }

    info!(
        "Done: {} scraped, {} warned, {} failed, {} records",
        summary.scraped, summary.warned, summary.failed, summary.records
    );
    Ok(summary)
}

async fn handle<E, Q, P, S>(
    url: &str,
    extractor: &E,
    queue: &Q,
    source: &P,
    sink: &S,
) -> Result<Outcome, ScraperError>
where
    E: Extractor,
    Q: WorkQueue + Sync,
    P: PageSource + Sync,
    S: Sink<Record = E::Record> + Sync,
{
    debug!("Visit {}", url);
    let html = source.fetch(url).await?;

    let records = {
        let doc = Html::parse_document(&html);
        if extractor.can_be_scrapped(&doc) {
            Some(extractor.extract(&doc, Some(url)))
        } else {
            None
        }
    };

    match records {
        Some(records) => {
            sink.write(url, &records).await?;
            queue.mark_scraped(url).await?;
            Ok(Outcome::Scraped(records.len() as u32))
        }
        None => {
            warn!("No box score found: {}", url);
            queue.mark_warned(url).await?;
            Ok(Outcome::Warned)
        }
    }
}
