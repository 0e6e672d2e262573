//! mb-core: Core library for merging and browsing Manabox collection exports
//!
//! This library provides functionality to:
//! - Load several collection exports (files or URLs) and tag each row
//!   with the collector it belongs to
//! - Merge them into one collection once every source has settled
//! - Project the collection into a searchable, paginated grid
//! - Look up preview images and prices in the card catalog
//! - Present a single preview overlay per surface
//! - Render the grid as a self-contained HTML page, or export it

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod grid;
pub mod html;
pub mod merger;
pub mod overlay;
pub mod parser;
pub mod preview;
pub mod source;
pub mod table;

#[cfg(test)]
mod test_http;

pub use catalog::{
    fetch_card_detail, CardDetail, CatalogCard, CatalogClient, Currency, ScryfallClient,
};
pub use config::{CatalogConfig, ViewerConfig};
pub use error::{Error, Result};
pub use export::{export_csv, export_json, ExportFormat};
pub use grid::{Cell, Grid, GridColumn, GridRow};
pub use html::{render_page, write_page, PageOptions};
pub use merger::{load_sources, MergeCoordinator, MergedCollection, SourceOutcome, SourceStatus};
pub use overlay::{ClickTarget, ElementId, Overlay, OverlayManager, Rect};
pub use parser::parse_csv_str;
pub use preview::{PreviewController, RequestToken};
pub use source::{discover_sources, extract_collector_name, SourceDescriptor, SourceFetcher};
pub use table::{CardField, CardRow, CellValue};
