use super::TeamStatRecord;
use crate::{utils, ScraperError, Sink, Table, WorkQueue};
use futures::TryStreamExt;
use sqlx::{sqlite::SqliteConnectOptions, Row, SqlitePool};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapedStatus {
    Pending = 0,
    Done = 1,
    /// Fetched, but the page held no box score.
    Warned = 2,
}

pub struct GameUrlTable {
    name: String,
    pool: SqlitePool,
}

#[async_trait::async_trait]
impl Table for GameUrlTable {
    type Record<'a> = &'a str;

    fn get_name(&self) -> &str {
        self.name.as_str()
    }

    fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn get_key(&self) -> &str {
        "game_url"
    }

    async fn create(&self) -> Result<(), sqlx::Error> {
        if !utils::is_table_exists(self.get_pool(), &self.name).await? {
            let query = format!(
                "CREATE TABLE {} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    game_url TEXT NOT NULL UNIQUE,
                    scraped_status INTEGER NOT NULL DEFAULT 0,
                    created_at DATETIME
                 )",
                &self.name
            );
            sqlx::query(query.as_str()).execute(self.get_pool()).await?;
        }
        Ok(())
    }

    async fn insert<'a>(&self, record: Self::Record<'a>) -> Result<(), sqlx::Error> {
        let mut tx = self.get_pool().begin().await?;
        let query = format!(
            "INSERT OR IGNORE INTO {} (game_url, scraped_status, created_at) VALUES (?, 0, ?)",
            &self.name
        );
        sqlx::query(&query)
            .bind(record.trim())
            .bind(utils::get_now())
            .execute(&mut tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

impl GameUrlTable {
    async fn set_status(&self, url: &str, status: ScrapedStatus) -> Result<(), sqlx::Error> {
        let query = format!(
            "UPDATE {} SET scraped_status = ? WHERE game_url = ?",
            &self.name
        );
        sqlx::query(&query)
            .bind(status as i64)
            .bind(url)
            .execute(self.get_pool())
            .await?;
        Ok(())
    }

    async fn count_status(&self, status: ScrapedStatus) -> Result<u32, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM {} WHERE scraped_status = ?",
            &self.name
        );
        sqlx::query(&query)
            .bind(status as i64)
            .fetch_one(self.get_pool())
            .await?
            .try_get(0)
    }
}

pub struct RecordTable {
    name: String,
    pool: SqlitePool,
}

#[async_trait::async_trait]
impl Table for RecordTable {
    type Record<'a> = (&'a str, &'a TeamStatRecord);

    fn get_name(&self) -> &str {
        self.name.as_str()
    }

    fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create(&self) -> Result<(), sqlx::Error> {
        if !utils::is_table_exists(self.get_pool(), &self.name).await? {
            let query = format!(
                r#"
                        CREATE TABLE {} (
                            id TEXT PRIMARY KEY,
                            created_at DATETIME,
                            game_url TEXT,
                            team TEXT,
                            game_date TEXT,
                            season TEXT,
                            record TEXT
                        )
                    "#,
                &self.name
            );
            sqlx::query(query.as_str()).execute(self.get_pool()).await?;
        }
        Ok(())
    }

    async fn insert<'a>(&self, (url, record): Self::Record<'a>) -> Result<(), sqlx::Error> {
        let mut tx = self.get_pool().begin().await?;
        let query = format!(
            r#"INSERT OR REPLACE INTO {} (
                id,
                game_url,
                team,
                game_date,
                season,
                record,
                created_at) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            self.name
        );
        sqlx::query(&query)
            .bind(format!("{}#{}", url.trim(), record.team))
            .bind(url.trim())
            .bind(&record.team)
            .bind(record.game_date.map(|d| d.format("%Y-%m-%d").to_string()))
            .bind(record.season.map(|s| s.to_string()))
            .bind(record.to_json().to_string())
            .bind(utils::get_now())
            .execute(&mut tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

pub struct BrefData {
    pub name: String,
    pub queue: GameUrlTable,
    pub results: RecordTable,
    pool: SqlitePool,
}

impl BrefData {
    /// Opens (creating if needed) `{name}.db` with the queue table
    /// `queue_name` and the results table `{queue_name}_results`.
    pub async fn new(name: &str, queue_name: &str) -> Result<BrefData, ScraperError> {
        let opt = SqliteConnectOptions::new()
            .filename(format!("{}.db", name))
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(opt).await?;
        let p = BrefData {
            name: name.to_string(),
            queue: GameUrlTable {
                name: queue_name.to_string(),
                pool: pool.clone(),
            },
            results: RecordTable {
                name: format!("{}_results", queue_name),
                pool: pool.clone(),
            },
            pool,
        };

        if !utils::is_table_exists(&p.pool, &p.queue.name).await? {
            tracing::debug!("Create table {}", p.queue.name);
            p.queue.create().await?;
        } else {
            tracing::debug!("Use table {}", p.queue.name);
        }
        if !utils::is_table_exists(&p.pool, &p.results.name).await? {
            tracing::debug!("Create table {}", p.results.name);
            p.results.create().await?;
        } else {
            tracing::debug!("Use table {}", p.results.name);
        }

        Ok(p)
    }

    pub async fn urls_with_status(&self, status: ScrapedStatus) -> Result<Vec<String>, ScraperError> {
        let query = format!(
            "SELECT game_url FROM {} WHERE scraped_status = ? ORDER BY id",
            self.queue.get_name()
        );
        let mut urls = vec![];
        let mut rows = sqlx::query(&query).bind(status as i64).fetch(&self.pool);
        while let Some(row) = rows.try_next().await? {
            urls.push(row.try_get("game_url")?);
        }
        Ok(urls)
    }

    pub async fn set_status(&self, url: &str, status: ScrapedStatus) -> Result<(), ScraperError> {
        Ok(self.queue.set_status(url, status).await?)
    }

    pub async fn count_status(&self, status: ScrapedStatus) -> Result<u32, ScraperError> {
        Ok(self.queue.count_status(status).await?)
    }
}

#[async_trait::async_trait]
impl WorkQueue for BrefData {
    async fn pending_after(&self, cursor: i64, n: u32) -> Result<Vec<(i64, String)>, ScraperError> {
        let query = format!(
            "SELECT id, game_url FROM {} WHERE scraped_status = ? AND id > ? ORDER BY id LIMIT ?",
            self.queue.get_name()
        );
        let mut pending = vec![];
        for row in sqlx::query(&query)
            .bind(ScrapedStatus::Pending as i64)
            .bind(cursor)
            .bind(n)
            .fetch_all(&self.pool)
            .await?
        {
            pending.push((row.try_get("id")?, row.try_get("game_url")?));
        }
        Ok(pending)
    }

    async fn pending_count(&self) -> Result<u32, ScraperError> {
        self.count_status(ScrapedStatus::Pending).await
    }

    async fn enqueue(&self, url: &str) -> Result<bool, ScraperError> {
        let url = url.trim();
        if self.queue.is_exist(url).await? {
            return Ok(false);
        }
        self.queue.insert(url).await?;
        Ok(true)
    }

    async fn mark_scraped(&self, url: &str) -> Result<(), ScraperError> {
        self.set_status(url, ScrapedStatus::Done).await
    }

    async fn mark_warned(&self, url: &str) -> Result<(), ScraperError> {
        self.set_status(url, ScrapedStatus::Warned).await
    }
}

#[async_trait::async_trait]
impl Sink for BrefData {
    type Record = TeamStatRecord;

    async fn write(&self, url: &str, records: &[TeamStatRecord]) -> Result<(), ScraperError> {
        for record in records {
            self.results.insert((url, record)).await?;
        }
        Ok(())
    }
}
