use super::{teams, QuarterScores, Season, StatLine, TeamStatRecord};
use crate::{
    page::{text_of, HiddenTables},
    Extractor,
};
use chrono::NaiveDate;
use lazy_regex::regex_captures;
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use tracing::{debug, warn};

const E: &str = "Invalid selector";
lazy_static! {
    static ref TEAM_NAMES: Selector = Selector::parse("div.scorebox strong a").expect(E);
    static ref META_LINE: Selector = Selector::parse("div.scorebox_meta div").expect(E);
    static ref BASIC_TABLES: Selector =
        Selector::parse(r#"table[id^="box-"][id$="-game-basic"]"#).expect(E);
    static ref ADVANCED_TABLES: Selector =
        Selector::parse(r#"table[id^="box-"][id$="-game-advanced"]"#).expect(E);
    static ref TOTALS_ROW: Selector = Selector::parse("tfoot tr").expect(E);
    static ref FOUR_FACTORS: Selector = Selector::parse("table#four_factors").expect(E);
    static ref LINE_SCORE: Selector = Selector::parse("table#line_score").expect(E);
    static ref BODY_ROWS: Selector = Selector::parse("tbody tr").expect(E);
    static ref ROWS: Selector = Selector::parse("tr").expect(E);
    static ref TEAM_HEADER: Selector = Selector::parse(r#"th[data-stat="team"]"#).expect(E);
    static ref TH: Selector = Selector::parse("th").expect(E);
    static ref TD: Selector = Selector::parse("td").expect(E);
    static ref A: Selector = Selector::parse("a").expect(E);
}

const DATE_FORMAT: &str = "%B %d, %Y";

/// Team key to stat line, in the order the tables appear on the page.
type Keyed = Vec<(String, StatLine)>;

#[derive(Debug, Default)]
pub struct BoxScoreExtractor;

impl Extractor for BoxScoreExtractor {
    type Record = TeamStatRecord;

    fn can_be_scrapped(&self, doc: &Html) -> bool {
        doc.select(&BASIC_TABLES).next().is_some()
    }

    fn extract(&self, doc: &Html, url: Option<&str>) -> Vec<TeamStatRecord> {
        extract(doc, url)
    }
}

/// Extracts one [`TeamStatRecord`] per team with a basic box-score table.
///
/// Missing regions of the page degrade to [`super::MISSING`] values; this
/// never fails.
pub fn extract(doc: &Html, url: Option<&str>) -> Vec<TeamStatRecord> {
    let (away_team, home_team) = team_names(doc);
    let game_date = game_date(doc);
    let season = game_date.map(Season::of);

    let basic = totals(doc, &BASIC_TABLES);
    let advanced = totals(doc, &ADVANCED_TABLES);
    let four_factors = four_factors(doc);
    let quarters = points_per_quarter(doc);

    debug!(
        "Extracted {} basic, {} advanced, {} four factors, {} line score rows",
        basic.len(),
        advanced.len(),
        four_factors.len(),
        quarters.len()
    );

    let team_keys = basic.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>();
    let quarters = join_quarters(quarters, &team_keys);

    basic
        .iter()
        .map(|(team, line)| TeamStatRecord {
            game_url: url.map(ToString::to_string),
            game_date,
            season,
            home_team: home_team.clone(),
            away_team: away_team.clone(),
            team: team.clone(),
            basic: line.clone(),
            advanced: lookup(&advanced, team),
            four_factors: lookup(&four_factors, team),
            quarters: quarters.get(team).cloned(),
        })
        .collect()
}

/// `(away, home)`; both are missing unless the scorebox names two teams.
fn team_names(doc: &Html) -> (Option<String>, Option<String>) {
    let names = doc
        .select(&TEAM_NAMES)
        .map(|a| text_of(&a))
        .collect::<Vec<_>>();
    match names.as_slice() {
        [away, home, ..] => (Some(away.clone()), Some(home.clone())),
        _ => (None, None),
    }
}

fn game_date(doc: &Html) -> Option<NaiveDate> {
    let Some(line) = doc.select(&META_LINE).next().map(|el| text_of(&el)) else {
        warn!("Game date not found");
        return None;
    };
    let date = parse_game_date(&line);
    if date.is_none() {
        warn!("Unexpected date format: {:?}", line);
    }
    date
}

/// Parses a scorebox line such as `7:30 PM, October 22, 2024`.
pub(crate) fn parse_game_date(line: &str) -> Option<NaiveDate> {
    let (_, text) = line.split_once(", ")?;
    let date = NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()?;
    // chrono's %B also takes "Oct"; only full month names are accepted.
    let month = text.split_whitespace().next()?;
    month
        .eq_ignore_ascii_case(&date.format("%B").to_string())
        .then_some(date)
}

/// Footer totals of every table matched by `tables`, keyed by the
/// upper-cased team segment of `box-{team}-game-{kind}`.
fn totals(doc: &Html, tables: &Selector) -> Keyed {
    let mut keyed = Keyed::new();
    for table in doc.select(tables) {
        let Some(team) = table.value().id().and_then(team_of_table_id) else {
            continue;
        };
        let Some(row) = table.select(&TOTALS_ROW).next() else {
            continue;
        };
        upsert(&mut keyed, team, stat_cells(&row));
    }
    keyed
}

fn team_of_table_id(id: &str) -> Option<String> {
    let (_, team, _) = regex_captures!(r"^box-([^-]+)-game-(basic|advanced)$", id)?;
    Some(team.to_uppercase())
}

fn stat_cells(row: &ElementRef) -> StatLine {
    row.select(&TD)
        .filter_map(|td| td.value().attr("data-stat").map(|key| (key, text_of(&td))))
        .collect()
}

fn four_factors(doc: &Html) -> Keyed {
    let mut keyed = Keyed::new();
    let Some(hidden) = doc.hidden_document("four_factors") else {
        return keyed;
    };
    let Some(table) = hidden.select(&FOUR_FACTORS).next() else {
        return keyed;
    };

    for row in table.select(&BODY_ROWS) {
        let team = row
            .select(&TH)
            .next()
            .and_then(|th| th.select(&A).next())
            .map(|a| text_of(&a))
            .unwrap_or_else(|| "Unknown".to_string());
        upsert(&mut keyed, team, stat_cells(&row));
    }
    keyed
}

/// Line-score rows keyed by the team's display name.
fn points_per_quarter(doc: &Html) -> BTreeMap<String, QuarterScores> {
    let mut quarters = BTreeMap::new();
    let Some(hidden) = doc.hidden_document("line_score") else {
        return quarters;
    };
    let Some(table) = hidden.select(&LINE_SCORE).next() else {
        return quarters;
    };

    for row in table.select(&ROWS) {
        let Some(header) = row.select(&TEAM_HEADER).next() else {
            continue;
        };
        let cells = row.select(&TD).map(|td| text_of(&td)).collect::<Vec<_>>();
        let [q1, q2, q3, q4, total, ..] = cells.as_slice() else {
            continue;
        };

        let abbreviation = header
            .select(&A)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| regex_captures!(r"/teams/([A-Z]{3})/", href))
            .map(|(_, abbr)| abbr.to_string());

        quarters.insert(
            text_of(&header),
            QuarterScores {
                q1: q1.clone(),
                q2: q2.clone(),
                q3: q3.clone(),
                q4: q4.clone(),
                total: total.clone(),
                abbreviation,
            },
        );
    }
    quarters
}

/// Re-keys line-score rows from display names to the team keys of the
/// basic tables. A row matches by exact key, then by its team link, then
/// through the franchise name table. Rows matching nothing are dropped.
fn join_quarters(
    quarters: BTreeMap<String, QuarterScores>,
    team_keys: &[&str],
) -> BTreeMap<String, QuarterScores> {
    let mut joined = BTreeMap::new();
    for (name, scores) in quarters {
        let key = team_keys
            .iter()
            .copied()
            .find(|k| *k == name)
            .or_else(|| {
                let abbr = scores.abbreviation.as_deref()?;
                team_keys.iter().copied().find(|k| *k == abbr)
            })
            .or_else(|| teams::resolve(&name, team_keys.iter().copied()));

        match key {
            Some(key) => {
                joined.insert(key.to_string(), scores);
            }
            None => warn!("Line score row {:?} matches no team in the box score", name),
        }
    }
    joined
}

fn upsert(keyed: &mut Keyed, team: String, line: StatLine) {
    match keyed.iter_mut().find(|(k, _)| *k == team) {
        Some((_, existing)) => *existing = line,
        None => keyed.push((team, line)),
    }
}

fn lookup(keyed: &Keyed, team: &str) -> StatLine {
    keyed
        .iter()
        .find(|(k, _)| k == team)
        .map(|(_, line)| line.clone())
        .unwrap_or_default()
}
