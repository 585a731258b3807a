//! Catalogue files on disk.
//!
//! A catalogue is the JSON document the CLI reads and writes: the summary of
//! the most recent analysis, the merged place list, and a timestamp. Plain
//! `AnalysisResult` documents and bare place arrays are accepted on read so
//! model output saved by hand can be merged too.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wayfind_core::PlaceRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Catalogue {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub places: Vec<PlaceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogueFile {
    Document(Catalogue),
    Places(Vec<PlaceRecord>),
}

impl Catalogue {
    pub(crate) fn new(summary: String, places: Vec<PlaceRecord>) -> Self {
        Self {
            summary,
            places,
            updated_at: Some(Utc::now()),
        }
    }

    pub(crate) fn from_json(raw: &str) -> anyhow::Result<Self> {
        let parsed: CatalogueFile = serde_json::from_str(raw)?;
        Ok(match parsed {
            CatalogueFile::Document(doc) => doc,
            CatalogueFile::Places(places) => Self {
                summary: String::new(),
                places,
                updated_at: None,
            },
        })
    }

    /// Read a catalogue file.
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalogue {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("failed to parse catalogue {}", path.display()))
    }

    /// Read a catalogue file, or start empty when it does not exist yet.
    pub(crate) fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!(path = %path.display(), "catalogue not found, starting empty");
            Ok(Self {
                summary: String::new(),
                places: Vec::new(),
                updated_at: None,
            })
        }
    }

    pub(crate) fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Write `body` to `path`, or to stdout when no path is given.
pub(crate) fn write_output(path: Option<&Path>, body: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => std::fs::write(path, format!("{body}\n"))
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{body}");
            Ok(())
        }
    }
}
