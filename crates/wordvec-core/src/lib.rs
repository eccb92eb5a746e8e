//! # wordvec-core
//!
//! Pretrained word embeddings without the ceremony:
//!
//! - **Catalog**: the gensim-data model index (word2vec, GloVe, FastText, ConceptNet)
//! - **Download**: streamed, multi-part aware, resumable at the archive level
//! - **FastText fallback**: `fasttext-<lang>` resolves to the Common Crawl vectors
//! - **Local cache**: models are converted once into a compact `.model` file
//! - **Lookup**: word → vector, with a zero vector for out-of-vocabulary words
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wordvec_core::{get_embedding, LoaderConfig, ModelLoader};
//!
//! let loader = ModelLoader::with_http(LoaderConfig::from_env())?;
//! let model = loader.load_or_download("glove-wiki-gigaword-50")?;
//!
//! let king = get_embedding("king", &model.vectors);
//! let nothing = get_embedding("qwxzrt", &model.vectors); // all zeros, logs a warning
//! assert_eq!(nothing.len(), model.vectors.vector_size());
//! ```
//!
//! ## Feature Flags
//!
//! - `http` (default): blocking HTTP fetcher (reqwest). Disable it to supply
//!   your own [`Fetcher`] or to work purely from the cache.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod catalog;
pub mod embeddings;
pub mod fetch;
pub mod formats;
pub mod loader;
pub mod model;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Lookups
pub use embeddings::{
    cosine_similarity, dot_product, euclidean_distance, get_embedding, l2_norm, l2_normalize,
    EmbeddingError, KeyedVectors, OovPolicy, Similar,
};

// Catalog
pub use catalog::{Catalog, CatalogEntry, CatalogError};

// Fetching
pub use fetch::{download_to_file, FetchError, Fetcher};

#[cfg(feature = "http")]
#[cfg_attr(docsrs, doc(cfg(feature = "http")))]
pub use fetch::HttpFetcher;

// File formats
pub use formats::{FormatError, ReadOptions, VectorFormat};

// Loader
pub use loader::{fasttext_lang, LoaderConfig, LoaderError, ModelLoader, Result};

#[cfg(feature = "http")]
#[cfg_attr(docsrs, doc(cfg(feature = "http")))]
pub use loader::load_or_download_embedding;

// Model types
pub use model::{Model, ModelMetadata, ModelSource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
