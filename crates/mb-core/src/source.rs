//! Source descriptors: where collection exports come from and who owns them

use crate::error::{Error, Result};
use crate::parser::parse_csv_str;
use crate::table::{CardField, CardRow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

/// Label used when a locator does not follow the export naming scheme
pub const UNKNOWN_COLLECTOR: &str = "Unknown Collector";

const EXPORT_PREFIX: &str = "Manabox_Collection_";
const EXPORT_SUFFIX: &str = ".csv";

/// One configured collection export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// File path or http(s) URL
    pub locator: String,
    /// Provenance label derived from the locator
    pub collector: String,
}

impl SourceDescriptor {
    pub fn new(locator: impl Into<String>) -> Self {
        let locator = locator.into();
        let collector = extract_collector_name(&locator);
        Self { locator, collector }
    }
}

/// Extract the collector label from a locator of the form
/// `<dir>/Manabox_Collection_<label>.csv`.
///
/// Examples:
/// - "Manabox_Collection_Timo.csv" -> "Timo"
/// - "data/Manabox_Collection_Mitch.csv" -> "Mitch"
/// - "weird_file.csv" -> "Unknown Collector"
pub fn extract_collector_name(locator: &str) -> String {
    let Some(stem) = locator.strip_suffix(EXPORT_SUFFIX) else {
        return UNKNOWN_COLLECTOR.to_string();
    };

    // The prefix must start the locator or follow a '/'; the rightmost
    // such occurrence wins.
    stem.rmatch_indices(EXPORT_PREFIX)
        .filter(|(pos, _)| *pos == 0 || stem[..*pos].ends_with('/'))
        .map(|(pos, _)| &stem[pos + EXPORT_PREFIX.len()..])
        .find(|label| !label.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_COLLECTOR.to_string())
}

fn is_remote(locator: &str) -> bool {
    locator.starts_with("http://") || locator.starts_with("https://")
}

/// Default timeout for remote collection exports
pub const SOURCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Retrieves the raw text of sources, over HTTP or from disk.
///
/// One fetcher is shared by every source of a load cycle so remote
/// exports reuse the same connection pool.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    http: Client,
}

impl SourceFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http {
                url: "(client setup)".to_string(),
                source: e,
            })?;
        Ok(Self { http })
    }

    pub fn fetch(&self, locator: &str) -> Result<String> {
        if !is_remote(locator) {
            return fs::read_to_string(locator).map_err(|e| Error::FileRead {
                path: PathBuf::from(locator),
                source: e,
            });
        }

        let http_err = |source| Error::Http {
            url: locator.to_string(),
            source,
        };
        let response = self.http.get(locator).send().map_err(http_err)?;

        if !response.status().is_success() {
            return Err(Error::HttpStatus {
                url: locator.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.text().map_err(http_err)
    }
}

/// Parse a source's text into rows tagged with its collector
pub fn parse_source(source: &SourceDescriptor, content: &str) -> Result<Vec<CardRow>> {
    let table = parse_csv_str(content, &source.locator)?;
    table.check_columns(&CardField::REQUIRED)?;

    let rows = table
        .rows
        .iter()
        .map(|row| {
            let fields: BTreeMap<_, _> = table
                .columns
                .iter()
                .filter_map(|col| row.get(col.index).map(|v| (col.name.clone(), v.clone())))
                .collect();
            CardRow::new(source.collector.clone(), fields)
        })
        .collect();

    Ok(rows)
}

/// Scan directories for collection exports, sorted by path
pub fn discover_sources<P: AsRef<Path>>(roots: &[P]) -> Result<Vec<SourceDescriptor>> {
    let mut paths: Vec<PathBuf> = Vec::new();

    for root in roots {
        for entry in WalkDir::new(root.as_ref()).follow_links(true) {
            let entry = entry?;
            let is_export = entry.file_type().is_file()
                && entry.file_name().to_str().is_some_and(|name| {
                    name.starts_with(EXPORT_PREFIX) && name.ends_with(EXPORT_SUFFIX)
                });
            if is_export {
                paths.push(entry.into_path());
            }
        }
    }

    paths.sort();
    paths.dedup();

    Ok(paths
        .into_iter()
        .map(|p| SourceDescriptor::new(p.to_string_lossy().replace('\\', "/")))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_http::{refused_url, serve_once};

    #[test]
    fn test_extract_collector_plain() {
        assert_eq!(extract_collector_name("Manabox_Collection_Timo.csv"), "Timo");
    }

    #[test]
    fn test_extract_collector_with_directory() {
        assert_eq!(
            extract_collector_name("exports/2024/Manabox_Collection_Jorrit.csv"),
            "Jorrit"
        );
        assert_eq!(
            extract_collector_name("https://example.org/c/Manabox_Collection_Job.csv"),
            "Job"
        );
    }

    #[test]
    fn test_extract_collector_keeps_spaces() {
        assert_eq!(
            extract_collector_name("Manabox_Collection_Van Dijk.csv"),
            "Van Dijk"
        );
    }

    #[test]
    fn test_extract_collector_unknown() {
        assert_eq!(extract_collector_name("weird_file.csv"), UNKNOWN_COLLECTOR);
        assert_eq!(extract_collector_name("Manabox_Collection_.csv"), UNKNOWN_COLLECTOR);
        assert_eq!(extract_collector_name("Manabox_Collection_Timo.tsv"), UNKNOWN_COLLECTOR);
        // Prefix must begin a path segment
        assert_eq!(extract_collector_name("MyManabox_Collection_Timo.csv"), UNKNOWN_COLLECTOR);
    }

    #[test]
    fn test_extract_collector_after_leading_slash() {
        // A leading slash starts a segment like any other separator
        assert_eq!(extract_collector_name("/Manabox_Collection_Timo.csv"), "Timo");
        assert_eq!(
            extract_collector_name("/srv/exports/Manabox_Collection_Job.csv"),
            "Job"
        );
    }

    #[test]
    fn test_parse_source_tags_rows() {
        let source = SourceDescriptor::new("Manabox_Collection_Mitch.csv");
        let csv = "Name,Foil,Quantity,Set code,Collector number,Rarity,Binder Name\n\
            Island,normal,10,UNF,235,common,Lands\n\
            Forest,foil,2,UNF,239,common,Lands\n";

        let rows = parse_source(&source, csv).unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.collector() == "Mitch"));
        assert_eq!(rows[1].name(), "Forest");
        assert_eq!(rows[0].catalog_id(), None);
    }

    #[test]
    fn test_parse_source_rejects_missing_columns() {
        let source = SourceDescriptor::new("Manabox_Collection_Mitch.csv");
        let err = parse_source(&source, "Name\nIsland\n").unwrap_err();
        assert!(matches!(err, Error::MissingColumn { .. }));
    }

    #[test]
    fn test_discover_sources() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("Manabox_Collection_Timo.csv"), "Name\n").unwrap();
        fs::write(dir.path().join("nested/Manabox_Collection_Job.csv"), "Name\n").unwrap();
        fs::write(dir.path().join("notes.csv"), "Name\n").unwrap();

        let sources = discover_sources(&[dir.path()]).unwrap();

        let collectors: Vec<&str> = sources.iter().map(|s| s.collector.as_str()).collect();
        assert_eq!(collectors, vec!["Timo", "Job"]);
    }

    #[test]
    fn test_fetch_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Manabox_Collection_Timo.csv");
        fs::write(&path, "Name\nIsland\n").unwrap();

        let fetcher = SourceFetcher::new(Duration::from_secs(5)).unwrap();
        let text = fetcher.fetch(path.to_str().unwrap()).unwrap();

        assert_eq!(text, "Name\nIsland\n");
    }

    #[test]
    fn test_fetch_missing_file() {
        let fetcher = SourceFetcher::new(Duration::from_secs(5)).unwrap();
        let err = fetcher
            .fetch("/nonexistent/Manabox_Collection_Nobody.csv")
            .unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }

    #[test]
    fn test_fetch_remote_body() {
        let base = serve_once("200 OK", "Name\nIsland\n");
        let fetcher = SourceFetcher::new(Duration::from_secs(5)).unwrap();

        let text = fetcher
            .fetch(&format!("{}/Manabox_Collection_Job.csv", base))
            .unwrap();

        assert_eq!(text, "Name\nIsland\n");
    }

    #[test]
    fn test_fetch_remote_error_status() {
        let base = serve_once("500 Internal Server Error", "");
        let fetcher = SourceFetcher::new(Duration::from_secs(5)).unwrap();

        let err = fetcher
            .fetch(&format!("{}/Manabox_Collection_Job.csv", base))
            .unwrap_err();

        assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
    }

    #[test]
    fn test_fetch_remote_unreachable() {
        let fetcher = SourceFetcher::new(Duration::from_secs(5)).unwrap();
        let err = fetcher
            .fetch(&format!("{}/Manabox_Collection_Job.csv", refused_url()))
            .unwrap_err();
        assert!(matches!(err, Error::Http { .. }));
    }
}
