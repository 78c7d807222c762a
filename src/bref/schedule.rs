//! Season schedule pages: where box-score URLs come from.

use super::BASE_URL;
use crate::{page::text_of, utils};
use chrono::NaiveDate;
use itertools::Itertools;
use lazy_static::lazy_static;
use scraper::{Html, Selector};
use serde::Serialize;

const E: &str = "Invalid selector";
lazy_static! {
    static ref A: Selector = Selector::parse("a").expect(E);
    static ref ROWS: Selector = Selector::parse("tr").expect(E);
    static ref DATE_CELL: Selector = Selector::parse(r#"th[data-stat="date_game"]"#).expect(E);
    static ref VISITOR: Selector =
        Selector::parse(r#"td[data-stat="visitor_team_name"]"#).expect(E);
    static ref HOME: Selector = Selector::parse(r#"td[data-stat="home_team_name"]"#).expect(E);
    static ref BOX_SCORE_CELL: Selector =
        Selector::parse(r#"td[data-stat="box_score_text"] a"#).expect(E);
}

/// Schedule pages are split by calendar month, October through June.
pub const SEASON_MONTHS: &[&str] = &[
    "october", "november", "december", "january", "february", "march", "april", "may", "june",
];

const SCHEDULE_DATE_FORMAT: &str = "%a, %b %d, %Y";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledGame {
    pub date: NaiveDate,
    pub visitor: String,
    pub home: String,
    pub boxscore_url: Option<String>,
}

/// Monthly schedule pages of the season ending in `end_year`.
pub fn season_month_urls(end_year: i32) -> Vec<String> {
    SEASON_MONTHS
        .iter()
        .map(|month| format!("{}/leagues/NBA_{}_games-{}.html", BASE_URL, end_year, month))
        .collect()
}

/// Absolute URLs of every "Box Score" link on a schedule page.
pub fn boxscore_links(doc: &Html) -> Vec<String> {
    doc.select(&A)
        .filter(|a| a.text().collect::<String>().contains("Box Score"))
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(|href| utils::absolutize(BASE_URL, href))
        .sorted()
        .dedup()
        .collect()
}

/// Games listed for `date` on a monthly schedule page.
pub fn games_on(doc: &Html, date: NaiveDate) -> Vec<ScheduledGame> {
    doc.select(&ROWS)
        .filter_map(|row| {
            let cell = row.select(&DATE_CELL).next()?;
            let row_date = NaiveDate::parse_from_str(&text_of(&cell), SCHEDULE_DATE_FORMAT).ok()?;
            if row_date != date {
                return None;
            }
            Some(ScheduledGame {
                date: row_date,
                visitor: text_of(&row.select(&VISITOR).next()?),
                home: text_of(&row.select(&HOME).next()?),
                boxscore_url: row
                    .select(&BOX_SCORE_CELL)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(|href| utils::absolutize(BASE_URL, href)),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn schedule() -> Html {
        let html = fs::read_to_string("tests/htmls/schedule.html").expect("Invalid file path");
        Html::parse_document(&html)
    }

    #[test]
    fn test_season_month_urls() {
        let urls = season_month_urls(2025);
        assert_eq!(urls.len(), 9);
        assert_eq!(
            urls[0],
            "https://www.basketball-reference.com/leagues/NBA_2025_games-october.html"
        );
        assert_eq!(
            urls[8],
            "https://www.basketball-reference.com/leagues/NBA_2025_games-june.html"
        );
    }

    #[test]
    fn test_boxscore_links() {
        assert_eq!(
            boxscore_links(&schedule()),
            vec![
                "https://www.basketball-reference.com/boxscores/202503100BOS.html".to_string(),
                "https://www.basketball-reference.com/boxscores/202503100MIA.html".to_string(),
                "https://www.basketball-reference.com/boxscores/202503110DEN.html".to_string(),
            ]
        );
    }

    #[test]
    fn test_games_on() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let games = games_on(&schedule(), date);

        assert_eq!(
            games,
            vec![
                ScheduledGame {
                    date,
                    visitor: "Portland Trail Blazers".to_string(),
                    home: "Boston Celtics".to_string(),
                    boxscore_url: Some(
                        "https://www.basketball-reference.com/boxscores/202503100BOS.html"
                            .to_string()
                    ),
                },
                ScheduledGame {
                    date,
                    visitor: "Utah Jazz".to_string(),
                    home: "Miami Heat".to_string(),
                    boxscore_url: Some(
                        "https://www.basketball-reference.com/boxscores/202503100MIA.html"
                            .to_string()
                    ),
                },
            ]
        );

        let upcoming = games_on(&schedule(), NaiveDate::from_ymd_opt(2025, 3, 12).unwrap());
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].home, "Brooklyn Nets");
        assert_eq!(upcoming[0].boxscore_url, None);

        let empty = games_on(&schedule(), NaiveDate::from_ymd_opt(2025, 3, 13).unwrap());
        assert!(empty.is_empty());
    }
}
