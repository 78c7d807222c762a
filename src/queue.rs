//! A work queue backed by a plain list of URLs.
//!
//! Acknowledged URLs are appended to a log file; a URL found in the log is no
//! longer pending, so a rerun resumes where the previous one stopped.

use crate::{ScraperError, WorkQueue};
use std::{
    collections::HashSet,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::debug;

pub struct FileQueue {
    urls: Mutex<Vec<String>>,
    done: Mutex<HashSet<String>>,
    log_path: PathBuf,
}

impl FileQueue {
    /// Loads `list` (one URL per line) and the acknowledgement log at `log`.
    pub fn open<P: AsRef<Path>, L: AsRef<Path>>(list: P, log: L) -> Result<FileQueue, ScraperError> {
        let mut urls = Vec::new();
        for url in fs::read_to_string(list)?.lines().map(str::trim) {
            if !url.is_empty() && !urls.iter().any(|u| u == url) {
                urls.push(url.to_string());
            }
        }

        let log_path = log.as_ref().to_path_buf();
        let done = if log_path.is_file() {
            fs::read_to_string(&log_path)?
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(ToString::to_string)
                .collect()
        } else {
            HashSet::new()
        };
        debug!("Loaded {} urls, {} already done", urls.len(), done.len());

        Ok(FileQueue {
            urls: Mutex::new(urls),
            done: Mutex::new(done),
            log_path,
        })
    }

    fn acknowledge(&self, url: &str) -> Result<(), ScraperError> {
        let mut done = self.done.lock().unwrap_or_else(|e| e.into_inner());
        if done.insert(url.to_string()) {
            let mut log = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.log_path)?;
            writeln!(log, "{}", url)?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl WorkQueue for FileQueue {
    async fn pending_after(&self, cursor: i64, n: u32) -> Result<Vec<(i64, String)>, ScraperError> {
        let urls = self.urls.lock().unwrap_or_else(|e| e.into_inner());
        let done = self.done.lock().unwrap_or_else(|e| e.into_inner());
        Ok(urls
            .iter()
            .enumerate()
            .map(|(i, url)| (i as i64 + 1, url))
            .filter(|(id, url)| *id > cursor && !done.contains(*url))
            .take(n as usize)
            .map(|(id, url)| (id, url.clone()))
            .collect())
    }

    async fn pending_count(&self) -> Result<u32, ScraperError> {
        let urls = self.urls.lock().unwrap_or_else(|e| e.into_inner());
        let done = self.done.lock().unwrap_or_else(|e| e.into_inner());
        Ok(urls.iter().filter(|u| !done.contains(*u)).count() as u32)
    }

    async fn enqueue(&self, url: &str) -> Result<bool, ScraperError> {
        let url = url.trim();
        let mut urls = self.urls.lock().unwrap_or_else(|e| e.into_inner());
        if urls.iter().any(|u| u == url) {
            return Ok(false);
        }
        urls.push(url.to_string());
        Ok(true)
    }

    async fn mark_scraped(&self, url: &str) -> Result<(), ScraperError> {
        self.acknowledge(url)
    }

    /// Pages without a box score are not retried either.
    async fn mark_warned(&self, url: &str) -> Result<(), ScraperError> {
        self.acknowledge(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn skips_logged_urls() {
        let list = "test_queue_urls.txt";
        let log = "test_queue_success.txt";
        fs::write(list, "a\n\nb\n  c  \nb\n").unwrap();
        fs::write(log, "b\n").unwrap();

        let q = FileQueue::open(list, log).unwrap();
        assert_eq!(q.pending_count().await.unwrap(), 2);
        assert_eq!(
            q.pending_after(0, 10).await.unwrap(),
            vec![(1, "a".to_string()), (3, "c".to_string())]
        );
        assert_eq!(
            q.pending_after(1, 10).await.unwrap(),
            vec![(3, "c".to_string())]
        );

        q.mark_scraped("a").await.unwrap();
        q.mark_scraped("a").await.unwrap();
        assert_eq!(fs::read_to_string(log).unwrap(), "b\na\n");

        let reopened = FileQueue::open(list, log).unwrap();
        assert_eq!(
            reopened.pending_after(0, 10).await.unwrap(),
            vec![(3, "c".to_string())]
        );
        assert!(!reopened.enqueue("c").await.unwrap());
        assert!(reopened.enqueue("d").await.unwrap());
        assert_eq!(reopened.pending_count().await.unwrap(), 2);

        fs::remove_file(list).unwrap();
        fs::remove_file(log).unwrap();
    }
}
