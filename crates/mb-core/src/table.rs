//! Core row types for collection exports

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A parsed table from a single CSV file, before provenance tagging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Column definitions
    pub columns: Vec<Column>,
    /// Row data
    pub rows: Vec<Row>,
    /// Source locator
    pub source_path: PathBuf,
}

impl Table {
    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A column definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Header text as it appears in the export
    pub name: String,
    /// Column index (0-based)
    pub index: usize,
}

impl Column {
    /// Create a new column
    pub fn new(name: String, index: usize) -> Self {
        Self { name, index }
    }
}

/// A row of raw cells, positionally aligned with `Table::columns`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<CellValue>,
}

impl Row {
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

/// A cell value with type detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Integer value
    Integer(i64),
    /// Floating-point value
    Float(f64),
    /// String value
    String(String),
    /// Empty/null cell
    Empty,
}

impl CellValue {
    /// Parse a string into a CellValue, detecting the type
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Integer(i);
        }

        // "inf" and "NaN" parse as f64 but are card names, not numbers
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return CellValue::Float(f);
            }
        }

        CellValue::String(trimmed.to_string())
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Convert to a display string
    pub fn to_string_value(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(fl) => write!(f, "{}", fl),
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::Empty => Ok(()),
        }
    }
}

/// The columns of a Manabox export that the viewer knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardField {
    Name,
    Foil,
    Quantity,
    SetCode,
    CollectorNumber,
    Rarity,
    BinderName,
    /// Optional catalog identifier
    ScryfallId,
}

impl CardField {
    /// Columns every collection export must carry
    pub const REQUIRED: [CardField; 7] = [
        CardField::Name,
        CardField::Foil,
        CardField::Quantity,
        CardField::SetCode,
        CardField::CollectorNumber,
        CardField::Rarity,
        CardField::BinderName,
    ];

    /// Header text in the export
    pub fn header(self) -> &'static str {
        match self {
            CardField::Name => "Name",
            CardField::Foil => "Foil",
            CardField::Quantity => "Quantity",
            CardField::SetCode => "Set code",
            CardField::CollectorNumber => "Collector number",
            CardField::Rarity => "Rarity",
            CardField::BinderName => "Binder Name",
            CardField::ScryfallId => "Scryfall ID",
        }
    }
}

/// One card record, tagged with the collector it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRow {
    collector: String,
    /// Every field of the source row, keyed by header
    pub fields: BTreeMap<String, CellValue>,
}

impl CardRow {
    /// Create a row; the collector label is fixed for the row's lifetime
    pub fn new(collector: impl Into<String>, fields: BTreeMap<String, CellValue>) -> Self {
        Self {
            collector: collector.into(),
            fields,
        }
    }

    /// Provenance label of the source export
    pub fn collector(&self) -> &str {
        &self.collector
    }

    /// Raw value for a known field, `Empty` when the column is absent
    pub fn get(&self, field: CardField) -> &CellValue {
        self.fields.get(field.header()).unwrap_or(&CellValue::Empty)
    }

    /// Field value rendered as text
    pub fn text(&self, field: CardField) -> String {
        self.get(field).to_string_value()
    }

    pub fn name(&self) -> String {
        self.text(CardField::Name)
    }

    /// Catalog identifier, if the export carries a non-empty one
    pub fn catalog_id(&self) -> Option<&str> {
        match self.get(CardField::ScryfallId) {
            CellValue::String(s) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }
}
