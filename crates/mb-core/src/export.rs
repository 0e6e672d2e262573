//! Export of the merged collection to CSV or JSON

use crate::error::{Error, Result};
use crate::merger::MergedCollection;
use std::collections::HashSet;
use std::io::Write;
use std::str::FromStr;

/// Header of the injected provenance column
pub const COLLECTOR_HEADER: &str = "Collector";

/// Output formats understood by the exporter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Html,
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "html" | "htm" => Ok(ExportFormat::Html),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Collector first, then every source header in first-seen order
pub fn export_headers(collection: &MergedCollection) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::from([COLLECTOR_HEADER]);
    let mut headers = vec![COLLECTOR_HEADER.to_string()];
    for row in &collection.rows {
        for name in row.fields.keys() {
            if seen.insert(name.as_str()) {
                headers.push(name.clone());
            }
        }
    }
    headers
}

/// Write the collection as CSV
pub fn export_csv<W: Write>(collection: &MergedCollection, writer: W) -> Result<()> {
    let headers = export_headers(collection);
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&headers)?;

    for row in &collection.rows {
        let record = headers.iter().map(|h| {
            if h == COLLECTOR_HEADER {
                row.collector().to_string()
            } else {
                row.fields
                    .get(h)
                    .map(|v| v.to_string_value())
                    .unwrap_or_default()
            }
        });
        csv_writer.write_record(record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write the collection as pretty-printed JSON
pub fn export_json<W: Write>(collection: &MergedCollection, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, collection)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{parse_source, SourceDescriptor};
    use chrono::Utc;

    fn collection() -> MergedCollection {
        let timo = SourceDescriptor::new("Manabox_Collection_Timo.csv");
        let job = SourceDescriptor::new("Manabox_Collection_Job.csv");
        let header = "Name,Foil,Quantity,Set code,Collector number,Rarity,Binder Name";
        let timo_csv = format!(
            "{}\n\"Jace, the Mind Sculptor\",foil,1,A25,62,mythic,Main\n",
            header
        );
        let job_csv = format!(
            "{},Language\nIsland,normal,3,UNF,235,common,Lands,en\n",
            header
        );
        let mut rows = parse_source(&timo, &timo_csv).unwrap();
        rows.extend(parse_source(&job, &job_csv).unwrap());
        MergedCollection {
            rows,
            sources: Vec::new(),
            loaded_at: Utc::now(),
        }
    }

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("html".parse::<ExportFormat>().unwrap(), ExportFormat::Html);
        assert!(matches!("xml".parse::<ExportFormat>(), Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_export_headers_union() {
        let headers = export_headers(&collection());
        assert_eq!(headers[0], "Collector");
        assert_eq!(headers.iter().filter(|h| *h == "Name").count(), 1);
        assert_eq!(headers.last().map(String::as_str), Some("Language"));
    }

    #[test]
    fn test_export_csv() {
        let mut out = Vec::new();
        export_csv(&collection(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Timo,"));
        assert!(lines[1].contains("\"Jace, the Mind Sculptor\""));
        assert!(lines[1].ends_with(','));
        assert!(lines[2].ends_with(",en"));
    }

    #[test]
    fn test_export_json() {
        let mut out = Vec::new();
        export_json(&collection(), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["rows"][1]["collector"], "Job");
        assert_eq!(value["rows"][1]["fields"]["Quantity"], 3);
    }
}
