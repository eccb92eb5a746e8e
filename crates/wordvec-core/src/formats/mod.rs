//! File Formats Module
//!
//! - `word2vec`: import of pretrained text/binary word2vec files (gzip aware)
//! - `native`: the cache format `<name>.model` used by the loader

mod native;
mod word2vec;

pub use native::{read_native, read_native_metadata, write_native, FORMAT_VERSION, MAGIC};
pub use word2vec::{
    read_word2vec, read_word2vec_file, write_word2vec_text, ReadOptions, VectorFormat,
};

use crate::embeddings::EmbeddingError;

/// Errors raised while reading or writing vector files
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Input contained no data
    #[error("Input is empty")]
    Empty,
    /// First line is not a usable `<count> <dim>` header
    #[error("Invalid header: {0:?}")]
    InvalidHeader(String),
    /// A row could not be parsed
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    /// Fewer entries than the header promised
    #[error("Unexpected end of input: expected {expected} vectors, got {got}")]
    Truncated { expected: usize, got: usize },
    /// Vector table rejected the data
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
    /// Not a native cache file
    #[error("Not a wordvec model file")]
    BadMagic,
    /// Native cache file from a newer format version
    #[error("Unsupported model file version: {0}")]
    UnsupportedVersion(u32),
    /// Native cache file is damaged
    #[error("Corrupt model file: {0}")]
    Corrupt(String),
    /// Metadata (de)serialization error
    #[error("Metadata error: {0}")]
    Metadata(#[from] serde_json::Error),
}
