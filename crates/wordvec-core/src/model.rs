//! Model types - what a cached model is and where it came from

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::embeddings::KeyedVectors;

/// Where a model's vectors were originally obtained
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSource {
    /// Pretrained model from the gensim-data catalog
    Catalog,
    /// FastText Common Crawl vectors for a language
    FastTextCrawl { lang: String },
    /// A word2vec file imported from disk
    LocalFile { path: String },
}

impl std::fmt::Display for ModelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelSource::Catalog => write!(f, "catalog"),
            ModelSource::FastTextCrawl { lang } => write!(f, "fasttext-crawl:{}", lang),
            ModelSource::LocalFile { path } => write!(f, "local:{}", path),
        }
    }
}

impl std::str::FromStr for ModelSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("catalog") {
            return Ok(ModelSource::Catalog);
        }
        if let Some(lang) = s.strip_prefix("fasttext-crawl:") {
            if !lang.is_empty() {
                return Ok(ModelSource::FastTextCrawl {
                    lang: lang.to_string(),
                });
            }
        }
        if let Some(path) = s.strip_prefix("local:") {
            if !path.is_empty() {
                return Ok(ModelSource::LocalFile {
                    path: path.to_string(),
                });
            }
        }
        Err(format!("Unknown model source: {}", s))
    }
}

/// Metadata stored alongside the vectors in a cached `.model` file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadata {
    pub name: String,
    pub source: ModelSource,
    pub vocab_size: usize,
    pub vector_size: usize,
    pub saved_at: DateTime<Utc>,
    /// Version of wordvec-core that wrote the file
    pub crate_version: String,
}

impl ModelMetadata {
    /// Describe `vectors` as model `name` obtained from `source`, stamped now
    pub fn describe(name: &str, source: ModelSource, vectors: &KeyedVectors) -> Self {
        Self {
            name: name.to_string(),
            source,
            vocab_size: vectors.len(),
            vector_size: vectors.vector_size(),
            saved_at: Utc::now(),
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// A loaded model: its vectors and how it got here
#[derive(Debug, Clone)]
pub struct Model {
    pub metadata: ModelMetadata,
    pub vectors: KeyedVectors,
    /// True when this call read the model from the local cache
    pub from_cache: bool,
}

impl Model {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}
