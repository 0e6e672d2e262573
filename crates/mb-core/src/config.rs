//! Viewer configuration, stored as JSON

use crate::catalog::{Currency, ScryfallClient, SCRYFALL_API_BASE};
use crate::error::{Error, Result};
use crate::grid::DEFAULT_PAGE_SIZE;
use crate::html::PageOptions;
use crate::source::{discover_sources, SourceDescriptor};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Catalog service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub currency: Currency,
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: SCRYFALL_API_BASE.to_string(),
            currency: Currency::Eur,
            timeout_secs: 10,
        }
    }
}

impl CatalogConfig {
    /// Build an HTTP client for these settings
    pub fn client(&self) -> Result<ScryfallClient> {
        ScryfallClient::new(&self.base_url, Duration::from_secs(self.timeout_secs))
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Export locators (paths or URLs), in configuration order
    pub sources: Vec<String>,
    /// Directories scanned for `Manabox_Collection_*.csv`
    pub roots: Vec<PathBuf>,
    pub catalog: CatalogConfig,
    /// Rows per page; 0 shows everything
    pub page_size: usize,
    pub title: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            roots: Vec::new(),
            catalog: CatalogConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
            title: PageOptions::default().title,
        }
    }
}

impl ViewerConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration file from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the configuration as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Explicit sources first, then anything discovered under `roots`
    /// that is not already listed
    pub fn resolve_sources(&self) -> Result<Vec<SourceDescriptor>> {
        let mut sources: Vec<SourceDescriptor> =
            self.sources.iter().map(SourceDescriptor::new).collect();

        for found in discover_sources(self.roots.as_slice())? {
            if !sources.iter().any(|s| s.locator == found.locator) {
                sources.push(found);
            }
        }
        Ok(sources)
    }

    pub fn page_options(&self) -> PageOptions {
        PageOptions {
            title: self.title.clone(),
            catalog_base: self.catalog.base_url.clone(),
            currency: self.catalog.currency,
        }
    }
}
