use nba_boxscore_scraper::bref::{BrefData, ScrapedStatus};
use nba_boxscore_scraper::sink::CsvDirSink;
use std::env;

/// Flips done URLs whose per-game CSV is gone back to pending.
async fn requeue_missing(db: &str, dir: &str) -> Result<(), Box<dyn std::error::Error>> {
    let p = BrefData::new(db, "game_urls").await?;
    let sink = CsvDirSink::new(dir)?;
    let mut i = 0;
    for url in p.urls_with_status(ScrapedStatus::Done).await? {
        if !sink.path_for(&url).is_file() {
            p.set_status(&url, ScrapedStatus::Pending).await?;
            i += 1;
            println!("Requeue {} {}", i, url);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let db = args.next().unwrap_or_else(|| "bref".to_string());
    let dir = args.next().unwrap_or_else(|| "boxscores".to_string());
    requeue_missing(&db, &dir).await
}
