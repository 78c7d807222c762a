use crate::{bref::TeamStatRecord, ScraperError, Sink};
use itertools::Itertools;
use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// One CSV file per game, named after the last segment of the game URL.
pub struct CsvDirSink {
    dir: PathBuf,
}

impl CsvDirSink {
    /// Creates `dir` if it does not exist.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<CsvDirSink, ScraperError> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(CsvDirSink {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", file_stem(url)))
    }
}

/// `https://.../boxscores/202410220BOS.html` -> `202410220BOS`.
pub fn file_stem(url: &str) -> String {
    let last = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url);
    let stem = last.strip_suffix(".html").unwrap_or(last);
    stem.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[async_trait::async_trait]
impl Sink for CsvDirSink {
    type Record = TeamStatRecord;

    async fn write(&self, url: &str, records: &[TeamStatRecord]) -> Result<(), ScraperError> {
        let path = self.path_for(url);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(TeamStatRecord::columns())?;
        for record in records {
            writer.write_record(record.to_row())?;
        }
        writer.flush()?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}

/// All games appended to one CSV file. The header is written only when the
/// file is created.
pub struct CsvFileSink {
    path: PathBuf,
}

impl CsvFileSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<CsvFileSink, ScraperError> {
        if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(CsvFileSink {
            path: path.as_ref().to_path_buf(),
        })
    }
}

#[async_trait::async_trait]
impl Sink for CsvFileSink {
    type Record = TeamStatRecord;

    async fn write(&self, _url: &str, records: &[TeamStatRecord]) -> Result<(), ScraperError> {
        let headers_written = self.path.is_file() && fs::metadata(&self.path)?.len() > 0;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if !headers_written {
            writer.write_record(TeamStatRecord::columns())?;
        }
        for record in records {
            writer.write_record(record.to_row())?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Concatenates every `*.csv` in `dir` into `output` under a single header.
///
/// The header comes from the first file by name; files whose header differs
/// are skipped. Returns the number of data rows written.
pub fn merge_csv_dir<P: AsRef<Path>, O: AsRef<Path>>(dir: P, output: O) -> Result<u64, ScraperError> {
    let mut writer = csv::Writer::from_path(output.as_ref())?;
    // The output may live inside `dir` under another spelling of its path.
    let output = fs::canonicalize(output.as_ref())?;
    let files = fs::read_dir(dir.as_ref())?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().map_or(false, |ext| ext == "csv"))
        .filter(|p| fs::canonicalize(p).map_or(true, |p| p != output))
        .sorted()
        .collect::<Vec<_>>();

    let mut header: Option<csv::StringRecord> = None;
    let mut rows = 0;

    for file in files {
        let mut reader = csv::Reader::from_path(&file)?;
        let file_header = reader.headers()?.clone();
        match &header {
            None => {
                writer.write_record(&file_header)?;
                header = Some(file_header);
            }
            Some(h) if *h != file_header => {
                warn!("Skip {}: header differs", file.display());
                continue;
            }
            Some(_) => {}
        }
        for record in reader.records() {
            writer.write_record(&record?)?;
            rows += 1;
        }
    }
    writer.flush()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bref::{StatLine, MISSING};
    use pretty_assertions::assert_eq;

    fn record(team: &str, pts: &str) -> TeamStatRecord {
        TeamStatRecord {
            game_url: Some("https://www.basketball-reference.com/boxscores/202410220BOS.html".into()),
            game_date: None,
            season: None,
            home_team: Some("Boston Celtics".into()),
            away_team: Some("New York Knicks".into()),
            team: team.to_string(),
            basic: [("pts", pts)].into_iter().collect(),
            advanced: StatLine::default(),
            four_factors: StatLine::default(),
            quarters: None,
        }
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(
            file_stem("https://www.basketball-reference.com/boxscores/202410220BOS.html"),
            "202410220BOS"
        );
        assert_eq!(file_stem("https://example.com/a/b/"), "b");
        assert_eq!(file_stem("weird?name"), "weird_name");
    }

    #[tokio::test]
    async fn dir_sink_then_merge() {
        let dir = "test_sink_dir";
        let merged = "test_sink_merged.csv";
        if Path::new(dir).is_dir() {
            fs::remove_dir_all(dir).unwrap();
        }

        let sink = CsvDirSink::new(dir).unwrap();
        sink.write(
            "https://www.basketball-reference.com/boxscores/202410220BOS.html",
            &[record("NYK", "109"), record("BOS", "132")],
        )
        .await
        .unwrap();
        sink.write(
            "https://www.basketball-reference.com/boxscores/202410220LAL.html",
            &[record("MIN", "103"), record("LAL", "110")],
        )
        .await
        .unwrap();
        fs::write(Path::new(dir).join("other.csv"), "a,b\n1,2\n").unwrap();

        let path = sink.path_for("https://www.basketball-reference.com/boxscores/202410220BOS.html");
        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            TeamStatRecord::columns()
        );
        let rows = reader.records().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(rows.len(), 2);
        let pts = headers.iter().position(|h| h == "PTS").unwrap();
        let fga = headers.iter().position(|h| h == "FGA").unwrap();
        assert_eq!(&rows[1][pts], "132");
        assert_eq!(&rows[1][fga], MISSING);

        assert_eq!(merge_csv_dir(dir, merged).unwrap(), 4);
        let mut reader = csv::Reader::from_path(merged).unwrap();
        assert_eq!(reader.headers().unwrap(), &headers);
        let teams = reader
            .records()
            .map(|r| r.unwrap()[5].to_string())
            .collect::<Vec<_>>();
        assert_eq!(teams, vec!["NYK", "BOS", "MIN", "LAL"]);

        fs::remove_dir_all(dir).unwrap();
        fs::remove_file(merged).unwrap();
    }

    #[test]
    fn merge_skips_its_own_output() {
        let dir = "test_sink_rerun";
        if Path::new(dir).is_dir() {
            fs::remove_dir_all(dir).unwrap();
        }
        fs::create_dir_all(dir).unwrap();
        fs::write(Path::new(dir).join("a.csv"), "team,pts\nBOS,132\n").unwrap();

        let output = "./test_sink_rerun/all.csv";
        assert_eq!(merge_csv_dir(dir, output).unwrap(), 1);
        assert_eq!(merge_csv_dir(dir, output).unwrap(), 1);
        assert_eq!(
            fs::read_to_string(output).unwrap(),
            "team,pts\nBOS,132\n"
        );

        fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn file_sink_writes_header_once() {
        let path = "test_sink_combined.csv";
        if Path::new(path).is_file() {
            fs::remove_file(path).unwrap();
        }

        let sink = CsvFileSink::new(path).unwrap();
        sink.write("u1", &[record("NYK", "109")]).await.unwrap();
        sink.write("u2", &[record("BOS", "132")]).await.unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(content.starts_with("Game URL,Game Date,NBA Season"));
        assert_eq!(content.matches("Game URL").count(), 1);

        fs::remove_file(path).unwrap();
    }
}
