//! Franchise display names as printed on basketball-reference, mapped to the
//! abbreviations used in its table ids.
//!
//! Some names were used by more than one franchise (the Charlotte Hornets
//! were `CHH` before 2002 and `CHO` since 2014), so a name maps to every
//! abbreviation it has carried and the caller picks the one present in the
//! game.

use lazy_static::lazy_static;
use std::collections::HashMap;

const TEAMS: &[(&str, &[&str])] = &[
    ("Atlanta Hawks", &["ATL"]),
    ("Boston Celtics", &["BOS"]),
    ("Brooklyn Nets", &["BRK"]),
    ("New Jersey Nets", &["NJN"]),
    ("Charlotte Hornets", &["CHO", "CHH"]),
    ("Charlotte Bobcats", &["CHA"]),
    ("Chicago Bulls", &["CHI"]),
    ("Cleveland Cavaliers", &["CLE"]),
    ("Dallas Mavericks", &["DAL"]),
    ("Denver Nuggets", &["DEN"]),
    ("Detroit Pistons", &["DET"]),
    ("Golden State Warriors", &["GSW"]),
    ("Houston Rockets", &["HOU"]),
    ("Indiana Pacers", &["IND"]),
    ("Los Angeles Clippers", &["LAC"]),
    ("LA Clippers", &["LAC"]),
    ("Los Angeles Lakers", &["LAL"]),
    ("Memphis Grizzlies", &["MEM"]),
    ("Vancouver Grizzlies", &["VAN"]),
    ("Miami Heat", &["MIA"]),
    ("Milwaukee Bucks", &["MIL"]),
    ("Minnesota Timberwolves", &["MIN"]),
    ("New Orleans Pelicans", &["NOP"]),
    ("New Orleans Hornets", &["NOH"]),
    ("New Orleans/Oklahoma City Hornets", &["NOK"]),
    ("New York Knicks", &["NYK"]),
    ("Oklahoma City Thunder", &["OKC"]),
    ("Seattle SuperSonics", &["SEA"]),
    ("Orlando Magic", &["ORL"]),
    ("Philadelphia 76ers", &["PHI"]),
    ("Phoenix Suns", &["PHO"]),
    ("Portland Trail Blazers", &["POR"]),
    ("Sacramento Kings", &["SAC"]),
    ("San Antonio Spurs", &["SAS"]),
    ("Toronto Raptors", &["TOR"]),
    ("Utah Jazz", &["UTA"]),
    ("Washington Wizards", &["WAS"]),
    ("Washington Bullets", &["WSB"]),
];

lazy_static! {
    static ref BY_NAME: HashMap<String, &'static [&'static str]> = TEAMS
        .iter()
        .map(|(name, abbrs)| (name.to_lowercase(), *abbrs))
        .collect();
}

/// Every abbreviation the franchise called `name` has used.
pub fn abbreviations(name: &str) -> &'static [&'static str] {
    BY_NAME
        .get(&name.trim().to_lowercase())
        .copied()
        .unwrap_or(&[])
}

/// Resolves a display name to the abbreviation among `candidates`.
pub fn resolve<'a, I>(name: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let known = abbreviations(name);
    candidates.into_iter().find(|c| known.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(abbreviations("Boston Celtics"), &["BOS"]);
        assert_eq!(abbreviations("  boston celtics "), &["BOS"]);
        assert!(abbreviations("Springfield Isotopes").is_empty());
    }

    #[test]
    fn resolve_picks_abbreviation_in_game() {
        assert_eq!(resolve("Charlotte Hornets", ["CHH", "NYK"]), Some("CHH"));
        assert_eq!(resolve("Charlotte Hornets", ["CHO", "NYK"]), Some("CHO"));
        assert_eq!(resolve("Brooklyn Nets", ["NJN", "BOS"]), None);
    }
}
