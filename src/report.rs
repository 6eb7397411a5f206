// src/report.rs
//! Report assembly: ordered sections rendered into one Markdown document,
//! written in a single shot.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

use crate::ingest::types::EventRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionBody {
    /// Fetched records; an empty vec renders the "no data" placeholder.
    Records(Vec<EventRecord>),
    /// The provider could not be reached; carries the error text.
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub body: SectionBody,
}

impl Section {
    pub fn records(title: impl Into<String>, records: Vec<EventRecord>) -> Self {
        Self {
            title: title.into(),
            body: SectionBody::Records(records),
        }
    }

    pub fn unavailable(title: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: SectionBody::Unavailable(error.into()),
        }
    }
}

/// The assembled output of one run. `generated_at` is supplied by the caller
/// so rendering stays deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<Section>,
}

impl ReportDocument {
    pub fn new(generated_at: DateTime<Utc>, sections: Vec<Section>) -> Self {
        Self {
            generated_at,
            sections,
        }
    }

    /// Render the whole document. Pure: identical inputs yield identical
    /// bytes.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("# Market Update\n\n");
        out.push_str(&format!(
            "_Generated on {}_\n\n",
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        ));

        for section in &self.sections {
            out.push_str(&format!("## {}\n\n", section.title));
            match &section.body {
                SectionBody::Records(records) if records.is_empty() => {
                    out.push_str("_No data available._\n\n");
                }
                SectionBody::Records(records) => {
                    for record in records {
                        out.push_str(&render_record(record));
                        out.push('\n');
                    }
                    out.push('\n');
                }
                SectionBody::Unavailable(error) => {
                    out.push_str(&format!("_Section unavailable: {error}_\n\n"));
                }
            }
        }
        out
    }

    /// Build the full string first, then write once. Parent directories are
    /// created as needed. Failure here is fatal for the run.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating report directory {}", parent.display()))?;
            }
        }
        let rendered = self.render();
        fs::write(path, rendered)
            .with_context(|| format!("writing report to {}", path.display()))
    }
}

fn render_record(record: &EventRecord) -> String {
    let mut line = format!(
        "- **{}** — {}: {}",
        record.when.label(),
        record.subject,
        record.text
    );
    if let Some(detail) = &record.detail {
        line.push_str(&format!(" ({detail})"));
    }
    if let Some(url) = &record.url {
        line.push_str(&format!("\n  [{url}]({url})"));
    }
    line
}
