//! Merge coordination: collects rows from every source and builds the
//! merged collection once all of them have settled.

use crate::error::Result;
use crate::source::{parse_source, SourceDescriptor};
use crate::table::CardRow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::mpsc;
use std::thread;

/// How a single source ended up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Loaded { rows: usize },
    Failed { error: String },
}

/// A source together with its load outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceOutcome {
    pub source: SourceDescriptor,
    pub status: SourceStatus,
}

/// Rows from every source, in the order their sources settled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedCollection {
    pub rows: Vec<CardRow>,
    /// Outcomes in configuration order
    pub sources: Vec<SourceOutcome>,
    pub loaded_at: DateTime<Utc>,
}

impl MergedCollection {
    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Distinct collector labels, in first-seen row order
    pub fn collectors(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.rows
            .iter()
            .map(CardRow::collector)
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Sources that could not be loaded
    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.sources
            .iter()
            .filter(|o| matches!(o.status, SourceStatus::Failed { .. }))
    }
}

/// Tracks source completions for one load cycle
#[derive(Debug)]
pub struct MergeCoordinator {
    sources: Vec<SourceDescriptor>,
    statuses: Vec<Option<SourceStatus>>,
    settled: usize,
    rows: Vec<CardRow>,
    built: bool,
}

impl MergeCoordinator {
    pub fn new(sources: Vec<SourceDescriptor>) -> Self {
        let statuses = vec![None; sources.len()];
        Self {
            sources,
            statuses,
            settled: 0,
            rows: Vec::new(),
            built: false,
        }
    }

    /// Number of distinct sources that have settled so far
    pub fn settled(&self) -> usize {
        self.settled
    }

    /// Whether the collection has been handed out
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Called once before any source settles. With no sources configured
    /// there is nothing to wait for, so the empty collection is built here.
    pub fn start(&mut self) -> Option<MergedCollection> {
        if self.sources.is_empty() {
            self.build()
        } else {
            None
        }
    }

    /// Record the result of one source. Returns the merged collection
    /// exactly once, when the last outstanding source settles.
    pub fn settle(
        &mut self,
        index: usize,
        result: Result<Vec<CardRow>>,
    ) -> Option<MergedCollection> {
        let Some(slot) = self.statuses.get_mut(index) else {
            tracing::warn!(index, "settle for unknown source ignored");
            return None;
        };
        if slot.is_some() {
            tracing::warn!(index, "source settled twice, ignoring");
            return None;
        }

        let source = &self.sources[index];
        *slot = Some(match result {
            Ok(rows) => {
                tracing::debug!(collector = %source.collector, rows = rows.len(), "source loaded");
                let count = rows.len();
                self.rows.extend(rows);
                SourceStatus::Loaded { rows: count }
            }
            Err(e) => {
                tracing::warn!(locator = %source.locator, error = %e, "failed to load source");
                SourceStatus::Failed {
                    error: e.to_string(),
                }
            }
        });
        self.settled += 1;

        if self.settled == self.sources.len() {
            self.build()
        } else {
            None
        }
    }

    fn build(&mut self) -> Option<MergedCollection> {
        if self.built {
            return None;
        }
        self.built = true;

        let sources = self
            .sources
            .iter()
            .zip(self.statuses.iter_mut())
            .map(|(source, status)| SourceOutcome {
                source: source.clone(),
                status: status.take().unwrap_or_else(|| SourceStatus::Failed {
                    error: "never settled".to_string(),
                }),
            })
            .collect();

        tracing::info!(
            rows = self.rows.len(),
            sources = self.sources.len(),
            "merged collection ready"
        );

        Some(MergedCollection {
            rows: std::mem::take(&mut self.rows),
            sources,
            loaded_at: Utc::now(),
        })
    }
}

/// Run one load cycle: fetch and parse every source on its own thread and
/// merge the rows as sources finish.
pub fn load_sources<F>(sources: &[SourceDescriptor], fetch: F) -> MergedCollection
where
    F: Fn(&str) -> Result<String> + Sync,
{
    let mut coordinator = MergeCoordinator::new(sources.to_vec());
    if let Some(collection) = coordinator.start() {
        return collection;
    }

    let fetch = &fetch;
    thread::scope(|scope| {
        let (tx, rx) = mpsc::channel();

        for (index, source) in sources.iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move || {
                let result = fetch(&source.locator).and_then(|text| parse_source(source, &text));
                // Receiver outlives every sender inside the scope
                let _ = tx.send((index, result));
            });
        }
        drop(tx);

        let mut merged = None;
        for (index, result) in rx {
            if let Some(collection) = coordinator.settle(index, result) {
                merged = Some(collection);
            }
        }

        // Every spawned worker sends exactly once, so the last settle built it
        merged.unwrap_or_else(|| MergedCollection {
            rows: Vec::new(),
            sources: Vec::new(),
            loaded_at: Utc::now(),
        })
    })
}
