//! Word Embeddings Module
//!
//! In-memory keyed vectors and the lookups built on them:
//! - Word → vector lookup with a zero-vector default for OOV words
//! - Cosine similarity and nearest neighbours
//! - Batch lookup

mod keyed;
mod similarity;

pub use keyed::{get_embedding, EmbeddingError, KeyedVectors, OovPolicy, Similar};
pub use similarity::{cosine_similarity, dot_product, euclidean_distance, l2_norm, l2_normalize};
