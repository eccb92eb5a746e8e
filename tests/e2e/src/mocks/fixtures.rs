//! Test Data Factory
//!
//! Builds small word2vec archives and catalog indexes:
//! - Text (with and without header) and binary layouts
//! - Gzip compression and multi-part splitting
//! - gensim-data style `list.json` documents

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;

/// Catalog index URL the harness points loaders at
pub const INDEX_URL: &str = "http://mock/gensim-data/list.json";
/// gensim-data release base URL
pub const DATA_URL: &str = "http://mock/gensim-data/releases";
/// FastText crawl base URL
pub const FASTTEXT_URL: &str = "http://mock/fasttext/vectors-crawl";

/// Builder for word2vec fixture files
///
/// # Example
///
/// ```rust,ignore
/// let archive = FixtureBuilder::new(3)
///     .word("king", &[0.9, 0.1, 0.0])
///     .word("queen", &[0.8, 0.2, 0.0])
///     .text_gz();
/// ```
#[derive(Debug, Clone)]
pub struct FixtureBuilder {
    dims: usize,
    entries: Vec<(String, Vec<f32>)>,
}

impl FixtureBuilder {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            entries: Vec::new(),
        }
    }

    /// A small 4-d vocabulary with two clear clusters (royalty, fruit)
    pub fn royalty_and_fruit() -> Self {
        Self::new(4)
            .word("king", &[0.9, 0.1, 0.0, 0.0])
            .word("queen", &[0.85, 0.15, 0.05, 0.0])
            .word("prince", &[0.8, 0.2, 0.0, 0.1])
            .word("apple", &[0.0, 0.1, 0.9, 0.1])
            .word("pear", &[0.05, 0.0, 0.85, 0.2])
    }

    pub fn word(mut self, word: &str, vector: &[f32]) -> Self {
        assert_eq!(vector.len(), self.dims, "fixture vector has wrong dimensions");
        self.entries.push((word.to_string(), vector.to_vec()));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// word2vec text with a `<count> <dim>` header
    pub fn text(&self) -> Vec<u8> {
        let mut out = format!("{} {}\n", self.entries.len(), self.dims);
        out.push_str(&self.rows());
        out.into_bytes()
    }

    /// GloVe-style text without a header
    pub fn headerless_text(&self) -> Vec<u8> {
        self.rows().into_bytes()
    }

    fn rows(&self) -> String {
        let mut out = String::new();
        for (word, vector) in &self.entries {
            out.push_str(word);
            for v in vector {
                out.push_str(&format!(" {}", v));
            }
            out.push('\n');
        }
        out
    }

    /// word2vec binary
    pub fn binary(&self) -> Vec<u8> {
        let mut out = format!("{} {}\n", self.entries.len(), self.dims).into_bytes();
        for (word, vector) in &self.entries {
            out.extend_from_slice(word.as_bytes());
            out.push(b' ');
            for v in vector {
                out.extend_from_slice(&v.to_le_bytes());
            }
            out.push(b'\n');
        }
        out
    }

    pub fn text_gz(&self) -> Vec<u8> {
        gzip(&self.text())
    }

    pub fn binary_gz(&self) -> Vec<u8> {
        gzip(&self.binary())
    }
}

/// Gzip-compress bytes
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(data).expect("gzip write");
    encoder.finish().expect("gzip finish")
}

/// Split `data` into `parts` nearly equal chunks (the last takes the remainder)
pub fn split(data: &[u8], parts: usize) -> Vec<Vec<u8>> {
    let size = data.len().div_ceil(parts.max(1)).max(1);
    data.chunks(size).map(<[u8]>::to_vec).collect()
}

/// A gensim-data style `list.json` with the given models
///
/// Each model is `(name, parts, file_size)`.
pub fn index_json(models: &[(&str, u32, Option<u64>)]) -> String {
    let mut map = serde_json::Map::new();
    for (name, parts, file_size) in models {
        let mut entry = serde_json::json!({
            "num_records": 5,
            "parts": parts,
            "description": format!("{} test fixture", name),
            "parameters": {"dimension": 4},
        });
        if let Some(size) = file_size {
            entry["file_size"] = serde_json::json!(size);
        }
        map.insert((*name).to_string(), entry);
    }
    serde_json::json!({ "corpora": {}, "models": map }).to_string()
}

/// Release asset URL for a single-part catalog model
pub fn data_url(name: &str) -> String {
    format!("{DATA_URL}/{name}/{name}.gz")
}

/// Release asset URL for part `part` (1-based) of a multi-part model
pub fn data_part_url(name: &str, part: u32) -> String {
    format!("{DATA_URL}/{name}/{name}.gz_0{part}")
}

/// FastText crawl archive URL for a language
pub fn fasttext_url(lang: &str) -> String {
    format!("{FASTTEXT_URL}/cc.{lang}.300.vec.gz")
}
