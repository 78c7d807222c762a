use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use nba_boxscore_scraper::{
    bref::{
        self, schedule, BoxScoreExtractor, BrefData, ScrapedStatus, Season, TeamStatRecord,
    },
    fetch::{self, HttpFetcher},
    queue::FileQueue,
    run_scrapper,
    sink::{self, CsvDirSink, CsvFileSink},
    PageSource, RunSummary, ScraperConfig, ScraperError, Throttle, WorkQueue,
};
use scraper::Html;
use std::{fs, path::PathBuf};
use tokio::time::Duration;
use tracing::{info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "nba-boxscore-scraper")]
#[command(about = "Scrape basketball-reference box scores into CSV", long_about = None)]
struct Cli {
    /// SQLite database name, stored as `<db>.db`
    #[arg(long, default_value = "bref")]
    db: String,

    /// Work-queue table name
    #[arg(long, default_value = "game_urls")]
    queue: String,

    /// Minimum milliseconds between two requests
    #[arg(long)]
    interval_ms: Option<u64>,

    /// URLs pulled from the queue per round trip
    #[arg(long)]
    batch_size: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add the URLs listed in a file (one per line) to the queue
    Enqueue { file: PathBuf },
    /// Crawl season schedules and queue every box-score link
    Discover {
        /// First season, by the year it ends in
        #[arg(long)]
        from: i32,
        /// Last season, by the year it ends in
        #[arg(long)]
        to: i32,
    },
    /// Scrape pending box scores
    Scrape {
        /// Read URLs from this file instead of the database queue
        #[arg(long)]
        queue_file: Option<PathBuf>,
        /// Acknowledgement log used with --queue-file
        #[arg(long, default_value = "success_log.txt")]
        success_log: PathBuf,
        #[arg(long, value_enum, default_value_t = SinkKind::CsvDir)]
        sink: SinkKind,
        /// Output directory or file, depending on the sink
        #[arg(long)]
        out: Option<PathBuf>,
        /// Stop after this many pages
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Extract a single box score from a URL or a saved HTML file
    Extract {
        target: String,
        /// Print JSON instead of CSV
        #[arg(long)]
        json: bool,
    },
    /// List the games scheduled on a date (default: today)
    Today {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Merge a directory of per-game CSV files into one
    Merge { dir: PathBuf, output: PathBuf },
    /// Show queue counts
    Status,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SinkKind {
    /// One CSV per game
    CsvDir,
    /// One combined CSV
    CsvFile,
    /// The results table of the database
    Sqlite,
}

async fn scrape<Q: WorkQueue + Sync>(
    queue: &Q,
    kind: SinkKind,
    out: Option<PathBuf>,
    cli: &Cli,
    config: &ScraperConfig,
) -> Result<RunSummary, ScraperError> {
    let fetcher = HttpFetcher::new(config)?;
    let extractor = BoxScoreExtractor;
    match kind {
        SinkKind::CsvDir => {
            let sink = CsvDirSink::new(out.unwrap_or_else(|| PathBuf::from("boxscores")))?;
            run_scrapper(&extractor, queue, &fetcher, &sink, config).await
        }
        SinkKind::CsvFile => {
            let sink = CsvFileSink::new(out.unwrap_or_else(|| PathBuf::from("boxscores.csv")))?;
            run_scrapper(&extractor, queue, &fetcher, &sink, config).await
        }
        SinkKind::Sqlite => {
            let sink = BrefData::new(&cli.db, &cli.queue).await?;
            run_scrapper(&extractor, queue, &fetcher, &sink, config).await
        }
    }
}

async fn discover(
    data: &BrefData,
    from: i32,
    to: i32,
    config: &ScraperConfig,
) -> Result<(), ScraperError> {
    let fetcher = HttpFetcher::new(config)?;
    let throttle = Throttle::new(config.request_interval);

    for end_year in from..=to {
        for url in schedule::season_month_urls(end_year) {
            throttle.wait().await;
            let html = match fetcher.fetch(&url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Skip {}: {}", url, e);
                    continue;
                }
            };
            let links = schedule::boxscore_links(&Html::parse_document(&html));
            let added = data.enqueue_all(&links).await?;
            info!("{}: {} links, {} new", url, links.len(), added);
        }
    }
    Ok(())
}

async fn today(date: NaiveDate, config: &ScraperConfig) -> Result<(), ScraperError> {
    let fetcher = HttpFetcher::new(config)?;
    let url = format!(
        "{}/leagues/NBA_{}_games-{}.html",
        bref::BASE_URL,
        Season::of(date).end(),
        date.format("%B").to_string().to_lowercase()
    );
    let html = fetcher.fetch(&url).await?;
    let games = schedule::games_on(&Html::parse_document(&html), date);

    if games.is_empty() {
        println!("No games found for {}.", date);
    }
    for game in games {
        println!("{}", serde_json::to_string(&game)?);
    }
    Ok(())
}

async fn extract(target: &str, json: bool, config: &ScraperConfig) -> Result<(), ScraperError> {
    let fetcher = HttpFetcher::new(config)?;
    let html = fetch::load(&fetcher, target).await?;
    let url = target.starts_with("http").then_some(target);
    let records = bref::extract(&Html::parse_document(&html), url);

    if json {
        let rows = records.iter().map(TeamStatRecord::to_json).collect::<Vec<_>>();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        let mut writer = csv::Writer::from_writer(std::io::stdout());
        writer.write_record(TeamStatRecord::columns())?;
        for record in &records {
            writer.write_record(record.to_row())?;
        }
        writer.flush()?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
                "info,html5ever=error,selectors=error,hyper=warn,reqwest=info,sqlx=warn".into()
            }),
        )
        .with(ErrorLayer::default())
        .init();

    let cli = Cli::parse();

    let mut config = ScraperConfig::default();
    if let Some(ms) = cli.interval_ms {
        config.request_interval = Duration::from_millis(ms);
    }
    if let Some(n) = cli.batch_size {
        config.batch_size = n;
    }

    match &cli.command {
        Commands::Enqueue { file } => {
            let data = BrefData::new(&cli.db, &cli.queue).await?;
            let urls = fs::read_to_string(file)?
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(ToString::to_string)
                .collect::<Vec<_>>();
            let added = data.enqueue_all(&urls).await?;
            info!("Queued {} of {} urls", added, urls.len());
        }
        Commands::Discover { from, to } => {
            let data = BrefData::new(&cli.db, &cli.queue).await?;
            discover(&data, *from, *to, &config).await?;
        }
        Commands::Scrape {
            queue_file,
            success_log,
            sink,
            out,
            limit,
        } => {
            config.max_pages = *limit;
            match queue_file {
                Some(list) => {
                    let queue = FileQueue::open(list, success_log)?;
                    scrape(&queue, *sink, out.clone(), &cli, &config).await?;
                }
                None => {
                    let queue = BrefData::new(&cli.db, &cli.queue).await?;
                    scrape(&queue, *sink, out.clone(), &cli, &config).await?;
                }
            }
        }
        Commands::Extract { target, json } => extract(target, *json, &config).await?,
        Commands::Today { date } => {
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            today(date, &config).await?;
        }
        Commands::Merge { dir, output } => {
            let rows = sink::merge_csv_dir(dir, output)?;
            info!("Merged {} rows into {}", rows, output.display());
        }
        Commands::Status => {
            let data = BrefData::new(&cli.db, &cli.queue).await?;
            println!(
                "pending: {}, done: {}, warned: {}",
                data.count_status(ScrapedStatus::Pending).await?,
                data.count_status(ScrapedStatus::Done).await?,
                data.count_status(ScrapedStatus::Warned).await?
            );
        }
    }

    Ok(())
}
