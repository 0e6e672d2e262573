//! Grid model for the merged collection: fixed column projection,
//! per-column cell rendering, live column search and pagination.

use crate::merger::MergedCollection;
use crate::table::{CardField, CardRow};
use serde::{Deserialize, Serialize};

/// Rows per page when nothing else is configured
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Displayed columns, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridColumn {
    Collector,
    Name,
    Foil,
    Quantity,
    SetCode,
    CollectorNumber,
    Rarity,
    BinderName,
}

impl GridColumn {
    pub const ALL: [GridColumn; 8] = [
        GridColumn::Collector,
        GridColumn::Name,
        GridColumn::Foil,
        GridColumn::Quantity,
        GridColumn::SetCode,
        GridColumn::CollectorNumber,
        GridColumn::Rarity,
        GridColumn::BinderName,
    ];

    /// Position in `ALL`
    pub fn index(self) -> usize {
        self as usize
    }

    /// Source field backing the column; the collector is not a source field
    pub fn field(self) -> Option<CardField> {
        match self {
            GridColumn::Collector => None,
            GridColumn::Name => Some(CardField::Name),
            GridColumn::Foil => Some(CardField::Foil),
            GridColumn::Quantity => Some(CardField::Quantity),
            GridColumn::SetCode => Some(CardField::SetCode),
            GridColumn::CollectorNumber => Some(CardField::CollectorNumber),
            GridColumn::Rarity => Some(CardField::Rarity),
            GridColumn::BinderName => Some(CardField::BinderName),
        }
    }

    /// Title shown in the table header
    pub fn header(self) -> &'static str {
        match self {
            GridColumn::Collector => "Collector",
            GridColumn::CollectorNumber => "#",
            other => other.field().map(CardField::header).unwrap_or_default(),
        }
    }

    /// Look a column up by header title or source field name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|col| {
            col.header().eq_ignore_ascii_case(name)
                || col
                    .field()
                    .is_some_and(|f| f.header().eq_ignore_ascii_case(name))
        })
    }

    pub fn renderer(self) -> CellRenderer {
        match self {
            GridColumn::Name => CellRenderer::PreviewName,
            GridColumn::Foil => CellRenderer::FoilTag,
            GridColumn::Rarity => CellRenderer::RarityBadge,
            _ => CellRenderer::Text,
        }
    }

    /// Raw text of this column for a row
    pub fn raw(self, row: &CardRow) -> String {
        match self.field() {
            Some(field) => row.text(field),
            None => row.collector().to_string(),
        }
    }

    pub fn render(self, row: &CardRow) -> Cell {
        self.renderer().render(self.raw(row), row)
    }
}

/// How a column's cells are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRenderer {
    /// Card name preceded by a preview marker
    PreviewName,
    FoilTag,
    RarityBadge,
    Text,
}

impl CellRenderer {
    pub fn render(self, raw: String, row: &CardRow) -> Cell {
        let tag = match self {
            CellRenderer::PreviewName => {
                return Cell::Preview {
                    name: raw,
                    catalog_id: row.catalog_id().map(str::to_string),
                }
            }
            CellRenderer::FoilTag => foil_tag(&raw),
            CellRenderer::RarityBadge => rarity_badge(&raw),
            CellRenderer::Text => None,
        };
        match tag {
            Some((class, label)) => Cell::Tag { class, label },
            None => Cell::Text(raw),
        }
    }
}

fn foil_tag(raw: &str) -> Option<(&'static str, &'static str)> {
    match raw.to_lowercase().as_str() {
        "foil" => Some(("foil", "foil")),
        "normal" => Some(("normal", "normal")),
        "etched" => Some(("etched", "etched")),
        _ => None,
    }
}

fn rarity_badge(raw: &str) -> Option<(&'static str, &'static str)> {
    match raw.to_lowercase().as_str() {
        "common" => Some(("common", "C")),
        "uncommon" => Some(("uncommon", "U")),
        "rare" => Some(("rare", "R")),
        "mythic" => Some(("mythic", "M")),
        _ => None,
    }
}

/// A rendered cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Preview {
        name: String,
        catalog_id: Option<String>,
    },
    Tag {
        class: &'static str,
        label: &'static str,
    },
    Text(String),
}

impl Cell {
    /// Visible text of the cell
    pub fn display_text(&self) -> &str {
        match self {
            Cell::Preview { name, .. } => name.as_str(),
            Cell::Tag { label, .. } => *label,
            Cell::Text(text) => text.as_str(),
        }
    }
}

/// Row style class: "collector-" plus the label with whitespace replaced by '-'
pub fn collector_class(collector: &str) -> String {
    let label: String = collector
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect();
    format!("collector-{}", label)
}

/// One rendered row
#[derive(Debug, Clone)]
pub struct GridRow {
    /// Position in the merged collection
    pub index: usize,
    pub class: String,
    pub cells: Vec<Cell>,
    search_text: Vec<String>,
}

impl GridRow {
    fn new(index: usize, row: &CardRow) -> Self {
        let cells: Vec<Cell> = GridColumn::ALL.iter().map(|col| col.render(row)).collect();
        let search_text = GridColumn::ALL
            .iter()
            .zip(&cells)
            .map(|(col, cell)| {
                let raw = col.raw(row);
                let shown = cell.display_text();
                if raw == shown {
                    raw.to_lowercase()
                } else {
                    format!("{} {}", raw, shown).to_lowercase()
                }
            })
            .collect();

        Self {
            index,
            class: collector_class(row.collector()),
            cells,
            search_text,
        }
    }

    pub fn cell(&self, column: GridColumn) -> &Cell {
        &self.cells[column.index()]
    }

    /// Lowercased text a column filter is matched against
    pub fn search_text(&self, column: GridColumn) -> &str {
        &self.search_text[column.index()]
    }

    fn matches_column(&self, column: GridColumn, query: &str) -> bool {
        matches_terms(&self.search_text[column.index()], query)
    }

    fn matches_any(&self, query: &str) -> bool {
        let all = self.search_text.join(" ");
        matches_terms(&all, query)
    }
}

/// Every whitespace-separated term of the query must occur in the text
fn matches_terms(haystack: &str, query: &str) -> bool {
    query
        .split_whitespace()
        .all(|term| haystack.contains(&term.to_lowercase()))
}

/// One page of filtered rows
#[derive(Debug, Clone)]
pub struct Page<'a> {
    /// Zero-based page index
    pub index: usize,
    pub page_count: usize,
    pub rows: Vec<&'a GridRow>,
    /// Rows passing every filter
    pub filtered: usize,
    pub total: usize,
    offset: usize,
}

impl Page<'_> {
    /// One-based position of the first row on the page, 0 when empty
    pub fn first_row(&self) -> usize {
        if self.rows.is_empty() {
            0
        } else {
            self.offset + 1
        }
    }

    /// One-based position of the last row on the page
    pub fn last_row(&self) -> usize {
        self.offset + self.rows.len()
    }
}

/// The merged collection projected into display columns
#[derive(Debug)]
pub struct Grid {
    collection: MergedCollection,
    rows: Vec<GridRow>,
    column_search: [String; 8],
    global_search: String,
    filtered: Vec<usize>,
    page_size: usize,
    page: usize,
}

impl Grid {
    /// Build the grid; a page size of 0 shows every row on one page
    pub fn build(collection: MergedCollection, page_size: usize) -> Self {
        let rows: Vec<GridRow> = collection
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| GridRow::new(i, row))
            .collect();
        let filtered = (0..rows.len()).collect();

        Self {
            collection,
            rows,
            column_search: Default::default(),
            global_search: String::new(),
            filtered,
            page_size,
            page: 0,
        }
    }

    pub fn columns(&self) -> &'static [GridColumn] {
        &GridColumn::ALL
    }

    pub fn collection(&self) -> &MergedCollection {
        &self.collection
    }

    /// All rows, ignoring filters
    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    /// Source record behind a rendered row
    pub fn record(&self, row: &GridRow) -> &CardRow {
        &self.collection.rows[row.index]
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Currently applied filter for a column
    pub fn column_search(&self, column: GridColumn) -> &str {
        &self.column_search[column.index()]
    }

    pub fn global_search(&self) -> &str {
        &self.global_search
    }

    /// Apply a column filter if it differs from the applied one.
    /// Returns whether the grid was redrawn.
    pub fn search_column(&mut self, column: GridColumn, value: &str) -> bool {
        if self.column_search[column.index()] == value {
            return false;
        }
        self.column_search[column.index()] = value.to_string();
        self.draw();
        true
    }

    /// Apply a filter across every column
    pub fn search_global(&mut self, value: &str) -> bool {
        if self.global_search == value {
            return false;
        }
        self.global_search = value.to_string();
        self.draw();
        true
    }

    /// Drop every filter
    pub fn clear_search(&mut self) {
        self.column_search = Default::default();
        self.global_search.clear();
        self.draw();
    }

    fn draw(&mut self) {
        self.filtered = self
            .rows
            .iter()
            .filter(|row| {
                GridColumn::ALL
                    .iter()
                    .all(|&col| row.matches_column(col, &self.column_search[col.index()]))
                    && row.matches_any(&self.global_search)
            })
            .map(|row| row.index)
            .collect();
        self.page = 0;
    }

    /// Rows passing every filter, in collection order
    pub fn filtered_rows(&self) -> impl Iterator<Item = &GridRow> {
        self.filtered.iter().map(|&i| &self.rows[i])
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn page_count(&self) -> usize {
        if self.page_size == 0 {
            1
        } else {
            self.filtered.len().div_ceil(self.page_size).max(1)
        }
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    /// Jump to a page, clamped to the last one
    pub fn set_page(&mut self, page: usize) {
        self.page = page.min(self.page_count() - 1);
    }

    pub fn next_page(&mut self) -> bool {
        let before = self.page;
        self.set_page(self.page + 1);
        self.page != before
    }

    pub fn prev_page(&mut self) -> bool {
        let before = self.page;
        self.page = self.page.saturating_sub(1);
        self.page != before
    }

    pub fn page(&self) -> Page<'_> {
        let rows = if self.page_size == 0 {
            self.filtered_rows().collect()
        } else {
            self.filtered
                .iter()
                .skip(self.page * self.page_size)
                .take(self.page_size)
                .map(|&i| &self.rows[i])
                .collect()
        };

        Page {
            index: self.page,
            page_count: self.page_count(),
            rows,
            filtered: self.filtered.len(),
            total: self.rows.len(),
            offset: self.page * self.page_size,
        }
    }
}
