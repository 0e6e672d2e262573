//! CSV parser for collection exports

use crate::error::{Error, Result};
use crate::table::{CardField, CellValue, Column, Row, Table};
use std::io::Read;
use std::path::PathBuf;

/// Parse the text of an export into a Table; `source_name` labels errors
pub fn parse_csv_str(content: &str, source_name: &str) -> Result<Table> {
    parse_reader(content.as_bytes(), PathBuf::from(source_name))
}

fn parse_reader<R: Read>(reader: R, path: PathBuf) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // Allow varying number of fields
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(|e| Error::Csv {
        path: path.clone(),
        source: e,
    })?;

    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.trim_start_matches('\u{feff}').to_string(), i))
        .collect();

    if columns.is_empty() || columns.iter().all(|c| c.name.is_empty()) {
        return Err(Error::CsvParse {
            path,
            message: "no columns found in CSV".to_string(),
        });
    }

    let mut rows = Vec::new();
    for (row_idx, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| Error::Csv {
            path: path.clone(),
            source: e,
        })?;

        let mut cells: Vec<CellValue> = record.iter().map(CellValue::parse).collect();

        if cells.len() > columns.len() {
            tracing::warn!(
                row = row_idx + 1,
                path = %path.display(),
                "row has more cells than columns, truncating"
            );
            cells.truncate(columns.len());
        }
        cells.resize(columns.len(), CellValue::Empty);

        rows.push(Row::new(cells));
    }

    Ok(Table {
        columns,
        rows,
        source_path: path,
    })
}

impl Table {
    /// Fail if any of the given columns is absent from the header row
    pub fn check_columns(&self, required: &[CardField]) -> Result<()> {
        match required
            .iter()
            .find(|field| self.find_column(field.header()).is_none())
        {
            Some(field) => Err(Error::MissingColumn {
                column: field.header().to_string(),
                path: self.source_path.clone(),
            }),
            None => Ok(()),
        }
    }
}
