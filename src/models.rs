use crate::errors::AppError;
use serde::Deserialize;
use std::path::PathBuf;

/// One row of the source list: a named data source and its base page URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceRecord {
    #[serde(rename = "Source")]
    pub name: String,
    #[serde(rename = "URL")]
    pub url: String,
}

impl SourceRecord {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Result of exporting a single source.
#[derive(Debug)]
pub enum ExportOutcome {
    /// The annotations file already existed; no request was made.
    Skipped(PathBuf),
    /// The export attachment was written to this path.
    Saved(PathBuf),
    Failed(AppError),
}

impl ExportOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Skipped(_) => "skipped",
            Self::Saved(_) => "saved",
            Self::Failed(_) => "failed",
        }
    }
}

/// Per-run tally of export outcomes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &ExportOutcome) {
        match outcome {
            ExportOutcome::Skipped(_) => self.skipped += 1,
            ExportOutcome::Saved(_) => self.saved += 1,
            ExportOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.saved + self.skipped + self.failed
    }
}
