//! Pretrained Model Catalog
//!
//! Mirrors the gensim-data release index (`list.json`): which models exist,
//! how many parts each archive is split into, and how to parse them.
//!
//! A built-in copy of the well-known models is used when the remote index
//! cannot be reached and nothing is cached.

mod builtin;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::formats::VectorFormat;

/// Where `list.json` lives
pub const DEFAULT_INDEX_URL: &str =
    "https://raw.githubusercontent.com/RaRe-Technologies/gensim-data/master/list.json";

/// Base URL of the gensim-data release assets
pub const DEFAULT_DATA_BASE_URL: &str =
    "https://github.com/RaRe-Technologies/gensim-data/releases/download";

/// Catalog error types
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The index document could not be parsed
    #[error("Invalid catalog index: {0}")]
    InvalidIndex(#[from] serde_json::Error),
}

/// One model in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    /// Name, filled in from the index key
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub num_records: Option<u64>,
    /// Total compressed size of all parts, in bytes
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default = "default_parts")]
    pub parts: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub license: Option<String>,
    /// Archive file name as published, e.g. `glove-wiki-gigaword-50.gz`
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub read_more: Vec<String>,
}

fn default_parts() -> u32 {
    1
}

impl CatalogEntry {
    /// word2vec releases ship the original binary layout; everything else is text
    pub fn format(&self) -> VectorFormat {
        format_for_name(&self.name)
    }

    /// Vector dimensionality, if the index records it
    pub fn dimension(&self) -> Option<u64> {
        self.parameters
            .get("dimension")
            .or_else(|| self.parameters.get("dimensions"))
            .and_then(|v| v.as_u64())
    }

    /// Download URLs in concatenation order
    pub fn urls(&self, base_url: &str) -> Vec<String> {
        let base = base_url.trim_end_matches('/');
        if self.parts <= 1 {
            vec![format!("{base}/{name}/{name}.gz", name = self.name)]
        } else {
            (1..=self.parts)
                .map(|part| format!("{base}/{name}/{name}.gz_0{part}", name = self.name))
                .collect()
        }
    }
}

/// Infer the word2vec layout from a model name
pub fn format_for_name(name: &str) -> VectorFormat {
    if name.starts_with("word2vec-") {
        VectorFormat::Binary
    } else {
        VectorFormat::Text
    }
}

#[derive(Debug, Deserialize)]
struct IndexDocument {
    #[serde(default)]
    models: BTreeMap<String, CatalogEntry>,
}

/// The set of downloadable models
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    /// Well-known models, available without network access
    pub fn builtin() -> Self {
        Self::from_entries(builtin::entries())
    }

    /// Parse a gensim-data `list.json` document
    ///
    /// Only the `models` section is read; corpora are not embeddings.
    pub fn from_index_json(json: &str) -> Result<Self, CatalogError> {
        let doc: IndexDocument = serde_json::from_str(json)?;
        let entries = doc.models.into_iter().map(|(name, mut entry)| {
            entry.name = name;
            entry
        });
        Ok(Self::from_entries(entries))
    }

    fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|e| (e.name.clone(), e))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Model names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
