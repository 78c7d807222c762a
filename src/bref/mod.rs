mod boxscore;
mod data;
pub mod schedule;
pub mod teams;

pub use boxscore::{extract, BoxScoreExtractor};
pub use data::{BrefData, GameUrlTable, RecordTable, ScrapedStatus};

use chrono::{Datelike, NaiveDate};
use std::{collections::BTreeMap, fmt};

pub const BASE_URL: &str = "https://www.basketball-reference.com";

/// Placeholder written for every value that could not be located.
pub const MISSING: &str = "N/A";

/// An NBA season runs from October of `start` to June of `start + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Season {
    pub start: i32,
}

impl Season {
    pub fn of(date: NaiveDate) -> Season {
        if date.month() >= 10 {
            Season { start: date.year() }
        } else {
            Season {
                start: date.year() - 1,
            }
        }
    }

    /// The site names seasons by the year they end in (`NBA_2025`).
    pub fn end(&self) -> i32 {
        self.start + 1
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end())
    }
}

/// One stat table row, `data-stat` attribute to cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatLine(BTreeMap<String, String>);

impl StatLine {
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or(MISSING)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StatLine {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        StatLine(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarterScores {
    pub q1: String,
    pub q2: String,
    pub q3: String,
    pub q4: String,
    pub total: String,
    /// Abbreviation taken from the team link of the line-score row, if any.
    pub abbreviation: Option<String>,
}

pub const BASIC_COLUMNS: &[(&str, &str)] = &[
    ("FG", "fg"),
    ("FGA", "fga"),
    ("FG%", "fg_pct"),
    ("3P", "fg3"),
    ("3PA", "fg3a"),
    ("3P%", "fg3_pct"),
    ("FT", "ft"),
    ("FTA", "fta"),
    ("FT%", "ft_pct"),
    ("ORB", "orb"),
    ("DRB", "drb"),
    ("TRB", "trb"),
    ("AST", "ast"),
    ("STL", "stl"),
    ("BLK", "blk"),
    ("TOV", "tov"),
    ("PF", "pf"),
    ("PTS", "pts"),
];

pub const ADVANCED_COLUMNS: &[(&str, &str)] = &[
    ("TS%", "ts_pct"),
    ("eFG%", "efg_pct"),
    ("3PAr", "fg3a_per_fga_pct"),
    ("FTr", "fta_per_fga_pct"),
    ("ORB%", "orb_pct"),
    ("DRB%", "drb_pct"),
    ("TRB%", "trb_pct"),
    ("AST%", "ast_pct"),
    ("STL%", "stl_pct"),
    ("BLK%", "blk_pct"),
    ("TOV%", "tov_pct"),
    ("USG%", "usg_pct"),
    ("ORtg", "off_rtg"),
    ("DRtg", "def_rtg"),
];

pub const FOUR_FACTORS_COLUMNS: &[(&str, &str)] = &[
    ("Pace", "pace"),
    ("eFG% (FF)", "efg_pct"),
    ("TOV% (FF)", "tov_pct"),
    ("ORB% (FF)", "orb_pct"),
    ("FT/FGA", "ft_rate"),
    ("ORtg (FF)", "off_rtg"),
];

pub const IDENTITY_COLUMNS: &[&str] = &[
    "Game URL",
    "Game Date",
    "NBA Season",
    "Home Team",
    "Away Team",
    "Team",
];

pub const QUARTER_COLUMNS: &[&str] = &[
    "Q1 Points",
    "Q2 Points",
    "Q3 Points",
    "Q4 Points",
    "Total Points",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamStatRecord {
    pub game_url: Option<String>,
    pub game_date: Option<NaiveDate>,
    pub season: Option<Season>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub team: String,
    pub basic: StatLine,
    pub advanced: StatLine,
    pub four_factors: StatLine,
    pub quarters: Option<QuarterScores>,
}

impl TeamStatRecord {
    /// CSV header, in output order.
    pub fn columns() -> Vec<&'static str> {
        IDENTITY_COLUMNS
            .iter()
            .copied()
            .chain(BASIC_COLUMNS.iter().map(|(label, _)| *label))
            .chain(ADVANCED_COLUMNS.iter().map(|(label, _)| *label))
            .chain(FOUR_FACTORS_COLUMNS.iter().map(|(label, _)| *label))
            .chain(QUARTER_COLUMNS.iter().copied())
            .collect()
    }

    /// Values aligned with [`TeamStatRecord::columns`].
    pub fn to_row(&self) -> Vec<String> {
        let or_missing = |v: Option<&String>| v.map(String::as_str).unwrap_or(MISSING).to_string();

        let mut row = vec![
            or_missing(self.game_url.as_ref()),
            self.game_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| MISSING.to_string()),
            self.season
                .map(|s| s.to_string())
                .unwrap_or_else(|| MISSING.to_string()),
            or_missing(self.home_team.as_ref()),
            or_missing(self.away_team.as_ref()),
            self.team.clone(),
        ];

        for (line, columns) in [
            (&self.basic, BASIC_COLUMNS),
            (&self.advanced, ADVANCED_COLUMNS),
            (&self.four_factors, FOUR_FACTORS_COLUMNS),
        ] {
            row.extend(columns.iter().map(|(_, key)| line.get(key).to_string()));
        }

        match &self.quarters {
            Some(q) => row.extend(
                [&q.q1, &q.q2, &q.q3, &q.q4, &q.total]
                    .into_iter()
                    .cloned(),
            ),
            None => row.extend(QUARTER_COLUMNS.iter().map(|_| MISSING.to_string())),
        }

        row
    }

    /// Column label to value, as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        let map = Self::columns()
            .into_iter()
            .map(str::to_string)
            .zip(self.to_row().into_iter().map(serde_json::Value::String))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

impl fmt::Display for TeamStatRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in Self::columns().into_iter().zip(self.to_row()) {
            writeln!(f, "{:<16}: {}", label, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn season_rolls_over_in_october() {
        let opening = NaiveDate::from_ymd_opt(2024, 10, 22).unwrap();
        let march = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let september = NaiveDate::from_ymd_opt(2024, 9, 30).unwrap();

        assert_eq!(Season::of(opening).to_string(), "2024-2025");
        assert_eq!(Season::of(march).to_string(), "2024-2025");
        assert_eq!(Season::of(september).to_string(), "2023-2024");
        assert_eq!(Season::of(march).end(), 2025);
    }

    #[test]
    fn row_matches_columns() {
        let record = TeamStatRecord {
            game_url: None,
            game_date: None,
            season: None,
            home_team: Some("Boston Celtics".to_string()),
            away_team: Some("New York Knicks".to_string()),
            team: "BOS".to_string(),
            basic: [("fg", "48"), ("pts", "132")].into_iter().collect(),
            advanced: StatLine::default(),
            four_factors: StatLine::default(),
            quarters: None,
        };

        let columns = TeamStatRecord::columns();
        let row = record.to_row();
        assert_eq!(columns.len(), row.len());
        assert_eq!(columns.len(), 6 + 18 + 14 + 6 + 5);

        let get = |label: &str| {
            let i = columns.iter().position(|c| *c == label).unwrap();
            row[i].as_str()
        };
        assert_eq!(get("Game URL"), MISSING);
        assert_eq!(get("Game Date"), MISSING);
        assert_eq!(get("Team"), "BOS");
        assert_eq!(get("FG"), "48");
        assert_eq!(get("PTS"), "132");
        assert_eq!(get("FGA"), MISSING);
        assert_eq!(get("ORtg (FF)"), MISSING);
        assert_eq!(get("Q1 Points"), MISSING);

        assert_eq!(record.to_json()["Home Team"], "Boston Celtics");
    }
}
