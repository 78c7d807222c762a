use chrono::{DateTime, FixedOffset};
use sqlx::SqlitePool;

pub(crate) async fn is_table_exists(
    pool: &SqlitePool,
    table_name: &str,
) -> Result<bool, sqlx::Error> {
    Ok(
        sqlx::query("SELECT name FROM sqlite_master WHERE type='table' AND name = ?")
            .bind(table_name)
            .fetch_optional(pool)
            .await?
            .is_some(),
    )
}

pub(crate) fn get_now() -> DateTime<FixedOffset> {
    let now = chrono::offset::Local::now();
    now.with_timezone(now.offset())
}

/// Joins a site-relative `href` onto `base`. Absolute links pass through.
pub(crate) fn absolutize(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", base.trim_end_matches('/'), href)
    } else {
        format!("{}/{}", base.trim_end_matches('/'), href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolutize_links() {
        let base = "https://www.basketball-reference.com";
        assert_eq!(
            absolutize(base, "/boxscores/202410220BOS.html"),
            "https://www.basketball-reference.com/boxscores/202410220BOS.html"
        );
        assert_eq!(
            absolutize(base, "https://example.com/x.html"),
            "https://example.com/x.html"
        );
        assert_eq!(
            absolutize("https://a.com/", "b.html"),
            "https://a.com/b.html"
        );
    }
}
