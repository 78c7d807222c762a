use sqlx::{Row, SqlitePool};
use std::fmt::Display;

#[async_trait::async_trait]
pub trait Table {
    type Record<'a>;

    fn get_name(&self) -> &str;
    fn get_pool(&self) -> &SqlitePool;

    /// Column holding the natural key of a row.
    fn get_key(&self) -> &str {
        "id"
    }

    async fn create(&self) -> Result<(), sqlx::Error>;
    async fn insert<'a>(&self, record: Self::Record<'a>) -> Result<(), sqlx::Error>;

    async fn is_exist<I: AsRef<str> + Display + Send + Sync>(
        &self,
        key: I,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "SELECT {key} FROM {} WHERE {key} = ?",
            self.get_name(),
            key = self.get_key()
        );
        Ok(sqlx::query(&query)
            .bind(key.as_ref())
            .fetch_optional(self.get_pool())
            .await?
            .is_some())
    }

    async fn count(&self) -> Result<u32, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM {}", self.get_name());
        Ok(sqlx::query(&query)
            .fetch_one(self.get_pool())
            .await?
            .try_get(0)?)
    }
}
