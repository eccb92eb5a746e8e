//! Keyed Vectors
//!
//! A word → vector table backed by one flat row-major matrix.
//!
//! ## Lookups
//!
//! - [`get_embedding`] returns the stored vector, or a zero vector of
//!   `vector_size` for out-of-vocabulary words and logs a warning.
//! - [`KeyedVectors::embedding_or_zero`] does the same with an explicit
//!   [`OovPolicy`], so callers that expect misses can stay quiet.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::similarity::{cosine_similarity, cosine_with_norm, l2_norm};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Embedding table error types
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingError {
    /// A vector did not match the table's dimensionality
    DimensionMismatch { expected: usize, got: usize },
    /// Raw parts do not describe a consistent table
    Inconsistent(String),
}

impl std::fmt::Display for EmbeddingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingError::DimensionMismatch { expected, got } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, got)
            }
            EmbeddingError::Inconsistent(e) => write!(f, "Inconsistent vector table: {}", e),
        }
    }
}

impl std::error::Error for EmbeddingError {}

// ============================================================================
// OOV POLICY
// ============================================================================

/// What to do when a looked-up word is not in the vocabulary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum OovPolicy {
    /// Log a warning naming the word, then return a zero vector
    #[default]
    Warn,
    /// Return a zero vector without logging
    Silent,
}

/// A nearest-neighbour result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Similar {
    pub word: String,
    pub score: f32,
}

// ============================================================================
// KEYED VECTORS
// ============================================================================

/// Vocabulary plus embedding matrix
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedVectors {
    vocab: Vec<String>,
    key_to_index: HashMap<String, usize>,
    vectors: Vec<f32>,
    vector_size: usize,
}

impl KeyedVectors {
    /// Create an empty table for vectors of `vector_size` dimensions
    pub fn new(vector_size: usize) -> Self {
        Self::with_capacity(vector_size, 0)
    }

    /// Create an empty table with room for `capacity` words
    pub fn with_capacity(vector_size: usize, capacity: usize) -> Self {
        Self {
            vocab: Vec::with_capacity(capacity),
            key_to_index: HashMap::with_capacity(capacity),
            vectors: Vec::with_capacity(capacity.saturating_mul(vector_size)),
            vector_size,
        }
    }

    /// Build a table from a vocabulary and a flat row-major matrix
    pub fn from_parts(
        vocab: Vec<String>,
        vectors: Vec<f32>,
        vector_size: usize,
    ) -> Result<Self, EmbeddingError> {
        if vocab.len().checked_mul(vector_size) != Some(vectors.len()) {
            return Err(EmbeddingError::Inconsistent(format!(
                "{} words x {} dims does not match {} values",
                vocab.len(),
                vector_size,
                vectors.len()
            )));
        }

        let mut key_to_index = HashMap::with_capacity(vocab.len());
        for (i, word) in vocab.iter().enumerate() {
            if key_to_index.insert(word.clone(), i).is_some() {
                return Err(EmbeddingError::Inconsistent(format!(
                    "duplicate word '{}'",
                    word
                )));
            }
        }

        Ok(Self {
            vocab,
            key_to_index,
            vectors,
            vector_size,
        })
    }

    /// Append a word and its vector
    ///
    /// Returns `Ok(false)` without modifying the table if the word is already
    /// present; the first vector wins.
    pub fn push(&mut self, word: impl Into<String>, vector: &[f32]) -> Result<bool, EmbeddingError> {
        if vector.len() != self.vector_size {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.vector_size,
                got: vector.len(),
            });
        }

        let word = word.into();
        if self.key_to_index.contains_key(&word) {
            return Ok(false);
        }

        self.key_to_index.insert(word.clone(), self.vocab.len());
        self.vocab.push(word);
        self.vectors.extend_from_slice(vector);
        Ok(true)
    }

    /// Number of words
    pub fn len(&self) -> usize {
        self.vocab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocab.is_empty()
    }

    /// Dimensionality of every vector
    pub fn vector_size(&self) -> usize {
        self.vector_size
    }

    pub fn contains(&self, word: &str) -> bool {
        self.key_to_index.contains_key(word)
    }

    /// Row index of a word
    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.key_to_index.get(word).copied()
    }

    /// Vocabulary in file order
    pub fn words(&self) -> &[String] {
        &self.vocab
    }

    /// The whole matrix, row-major
    pub fn matrix(&self) -> &[f32] {
        &self.vectors
    }

    /// Vector at a row index
    pub fn vector_at(&self, index: usize) -> Option<&[f32]> {
        if index >= self.vocab.len() {
            return None;
        }
        let start = index * self.vector_size;
        Some(&self.vectors[start..start + self.vector_size])
    }

    /// Vector for a word, if present
    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.index_of(word).and_then(|i| self.vector_at(i))
    }

    /// Iterate over `(word, vector)` pairs in file order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> + '_ {
        self.vocab
            .iter()
            .enumerate()
            .map(move |(i, w)| {
                let start = i * self.vector_size;
                (w.as_str(), &self.vectors[start..start + self.vector_size])
            })
    }

    /// Vector for a word, or a zero vector when it is out of vocabulary
    pub fn embedding_or_zero(&self, word: &str, policy: OovPolicy) -> Vec<f32> {
        match self.get(word) {
            Some(v) => v.to_vec(),
            None => {
                if policy == OovPolicy::Warn {
                    tracing::warn!(
                        word = %word,
                        "'{}' not found in vocabulary. Returning zero vector.",
                        word
                    );
                }
                vec![0.0; self.vector_size]
            }
        }
    }

    /// Look up several words at once
    pub fn embed_batch(&self, words: &[&str], policy: OovPolicy) -> Vec<Vec<f32>> {
        words
            .iter()
            .map(|w| self.embedding_or_zero(w, policy))
            .collect()
    }

    /// Cosine similarity between two words; `None` if either is OOV
    pub fn similarity(&self, a: &str, b: &str) -> Option<f32> {
        let va = self.get(a)?;
        let vb = self.get(b)?;
        Some(cosine_similarity(va, vb))
    }

    /// The `top_k` words closest to `word` by cosine similarity
    ///
    /// The query word itself is excluded. OOV words yield an empty list.
    pub fn most_similar(&self, word: &str, top_k: usize) -> Vec<Similar> {
        let Some(query_index) = self.index_of(word) else {
            return Vec::new();
        };
        let Some(query) = self.vector_at(query_index) else {
            return Vec::new();
        };

        let query_norm = l2_norm(query);
        let mut scored: Vec<(usize, f32)> = self
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != query_index)
            .map(|(i, (_, v))| (i, cosine_with_norm(query, query_norm, v)))
            .collect();

        // Sort by similarity (highest first)
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(top_k)
            .map(|(i, score)| Similar {
                word: self.vocab[i].clone(),
                score,
            })
            .collect()
    }
}

/// Vector for `word`, or a zero vector of `model.vector_size()` if it is
/// not in the vocabulary. Misses are logged at warn level.
pub fn get_embedding(word: &str, model: &KeyedVectors) -> Vec<f32> {
    model.embedding_or_zero(word, OovPolicy::Warn)
}

// ============================================================================
// TESTS
// ============================================================================
