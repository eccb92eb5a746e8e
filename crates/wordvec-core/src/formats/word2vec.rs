//! word2vec Import
//!
//! Reads the two layouts every pretrained distribution we care about uses:
//!
//! - **Text**: `<count> <dim>` header, then `word v1 v2 ... vN` per line.
//!   GloVe-style files without a header are accepted; the dimensionality is
//!   taken from the first row.
//! - **Binary**: the same header, then per entry the word, one space, and
//!   `dim` little-endian `f32` values (optionally followed by `\n`).
//!
//! Gzip-compressed input is detected by its magic bytes and decompressed on
//! the fly, including archives stitched together from several parts.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use serde::{Deserialize, Serialize};

use super::FormatError;
use crate::embeddings::KeyedVectors;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// On-disk layout of a word2vec file
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum VectorFormat {
    #[default]
    Text,
    Binary,
}

impl std::fmt::Display for VectorFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorFormat::Text => write!(f, "text"),
            VectorFormat::Binary => write!(f, "binary"),
        }
    }
}

impl std::str::FromStr for VectorFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(VectorFormat::Text),
            "binary" | "bin" => Ok(VectorFormat::Binary),
            _ => Err(format!("Unknown vector format: {}", s)),
        }
    }
}

/// Options for reading word2vec files
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Read at most this many vectors
    pub limit: Option<usize>,
}

/// Counters accumulated while reading, reported once at the end
#[derive(Debug, Default)]
struct ReadStats {
    duplicates: usize,
    lossy_words: usize,
}

impl ReadStats {
    fn report(&self) {
        if self.duplicates > 0 {
            tracing::warn!(
                duplicates = self.duplicates,
                "Duplicate words in word2vec input, kept the first vector of each"
            );
        }
        if self.lossy_words > 0 {
            tracing::warn!(
                words = self.lossy_words,
                "Words with invalid UTF-8 were decoded lossily"
            );
        }
    }
}

/// Read a word2vec file, transparently decompressing gzip
pub fn read_word2vec_file(
    path: &Path,
    format: VectorFormat,
    options: ReadOptions,
) -> Result<KeyedVectors, FormatError> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(1 << 20, file);

    let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    tracing::debug!(path = %path.display(), %format, gzip = is_gzip, "Reading word2vec file");

    if is_gzip {
        let decoder = BufReader::with_capacity(1 << 20, MultiGzDecoder::new(reader));
        read_word2vec(decoder, format, options)
    } else {
        read_word2vec(reader, format, options)
    }
}

/// Read word2vec data from an uncompressed stream
pub fn read_word2vec<R: BufRead>(
    reader: R,
    format: VectorFormat,
    options: ReadOptions,
) -> Result<KeyedVectors, FormatError> {
    match format {
        VectorFormat::Text => read_text(reader, options),
        VectorFormat::Binary => read_binary(reader, options),
    }
}

/// Largest dimensionality accepted from a header
const MAX_VECTOR_SIZE: usize = 1 << 16;

/// Floats reserved before the first row is read
const RESERVE_FLOATS: usize = 1 << 24;

/// Parse `<count> <dim>` if that is what the line holds
fn parse_header(fields: &[&str]) -> Option<(usize, usize)> {
    if fields.len() != 2 {
        return None;
    }
    let count = fields[0].parse().ok()?;
    let dim = fields[1].parse().ok()?;
    Some((count, dim))
}

/// Reject dimensionalities no real model has before sizing buffers from them
fn check_dim(dim: usize, header: &str) -> Result<usize, FormatError> {
    if dim == 0 || dim > MAX_VECTOR_SIZE {
        return Err(FormatError::InvalidHeader(header.to_string()));
    }
    Ok(dim)
}

/// Table sized from a header, with the up-front reservation capped by element count
fn table_for(expected: usize, dim: usize) -> KeyedVectors {
    KeyedVectors::with_capacity(dim, expected.min(RESERVE_FLOATS / dim))
}

fn decode_word(bytes: &[u8], stats: &mut ReadStats) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            stats.lossy_words += 1;
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

/// Read one line into `buf` (without the terminator). Returns false at EOF.
fn next_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> Result<bool, FormatError> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(false);
    }
    while matches!(buf.last(), Some(b'\n' | b'\r')) {
        buf.pop();
    }
    Ok(true)
}

fn push_row(
    kv: &mut KeyedVectors,
    fields: &[&str],
    line_no: usize,
    row: &mut Vec<f32>,
) -> Result<bool, FormatError> {
    let dim = kv.vector_size();
    if fields.len() != dim + 1 {
        return Err(FormatError::Parse {
            line: line_no,
            message: format!("expected {} values, found {}", dim, fields.len().saturating_sub(1)),
        });
    }

    row.clear();
    for field in &fields[1..] {
        let value: f32 = field.parse().map_err(|_| FormatError::Parse {
            line: line_no,
            message: format!("invalid number '{}'", field),
        })?;
        row.push(value);
    }

    Ok(kv.push(fields[0], row)?)
}

fn read_text<R: BufRead>(mut reader: R, options: ReadOptions) -> Result<KeyedVectors, FormatError> {
    let limit = options.limit.unwrap_or(usize::MAX);
    let mut stats = ReadStats::default();
    let mut buf = Vec::new();
    let mut row = Vec::new();

    // Skip leading blank lines to find the header (or first row)
    let mut line_no = 0;
    let first = loop {
        if !next_line(&mut reader, &mut buf)? {
            return Err(FormatError::Empty);
        }
        line_no += 1;
        let line = decode_word(&buf, &mut stats);
        if !line.trim().is_empty() {
            break line;
        }
    };

    let first_fields: Vec<&str> = first.split_whitespace().collect();
    let (expected, mut kv, mut rows) = match parse_header(&first_fields) {
        Some((count, dim)) => {
            let dim = check_dim(dim, &first)?;
            let expected = count.min(limit);
            (Some(expected), table_for(expected, dim), 0)
        }
        None => {
            if first_fields.len() < 2 {
                return Err(FormatError::InvalidHeader(first.clone()));
            }
            // Headerless (GloVe): the first line is already a vector
            let mut kv = KeyedVectors::new(first_fields.len() - 1);
            if limit == 0 {
                return Ok(kv);
            }
            push_row(&mut kv, &first_fields, line_no, &mut row)?;
            (None, kv, 1)
        }
    };

    let target = expected.unwrap_or(limit);
    while rows < target {
        if !next_line(&mut reader, &mut buf)? {
            break;
        }
        line_no += 1;
        let line = decode_word(&buf, &mut stats);
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }

        let fields: Vec<&str> = trimmed.split(' ').filter(|f| !f.is_empty()).collect();
        if !push_row(&mut kv, &fields, line_no, &mut row)? {
            stats.duplicates += 1;
        }
        rows += 1;
    }

    if let Some(expected) = expected {
        if rows < expected {
            return Err(FormatError::Truncated {
                expected,
                got: rows,
            });
        }
    }

    stats.report();
    Ok(kv)
}

/// Read exactly `buf.len()` bytes, mapping EOF to `Truncated`
fn read_entry_bytes<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    expected: usize,
    got: usize,
) -> Result<(), FormatError> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            FormatError::Truncated { expected, got }
        } else {
            FormatError::Io(e)
        }
    })
}

fn read_binary<R: BufRead>(mut reader: R, options: ReadOptions) -> Result<KeyedVectors, FormatError> {
    let mut stats = ReadStats::default();
    let mut buf = Vec::new();

    if !next_line(&mut reader, &mut buf)? {
        return Err(FormatError::Empty);
    }
    let header = decode_word(&buf, &mut stats);
    let fields: Vec<&str> = header.split_whitespace().collect();
    let (count, dim) = match parse_header(&fields) {
        Some((count, dim)) => (count, check_dim(dim, &header)?),
        None => return Err(FormatError::InvalidHeader(header.clone())),
    };

    let expected = count.min(options.limit.unwrap_or(usize::MAX));
    let mut kv = table_for(expected, dim);
    let mut raw = vec![0u8; dim * 4];
    let mut row = vec![0f32; dim];
    let mut word = Vec::new();

    for entry in 0..expected {
        // Word: bytes up to a space, ignoring newlines left over from the previous entry
        word.clear();
        loop {
            let mut byte = [0u8; 1];
            read_entry_bytes(&mut reader, &mut byte, expected, entry)?;
            match byte[0] {
                b' ' => break,
                b'\n' | b'\r' => {}
                b => word.push(b),
            }
        }
        if word.is_empty() {
            return Err(FormatError::Parse {
                line: entry + 2,
                message: "empty word".to_string(),
            });
        }

        read_entry_bytes(&mut reader, &mut raw, expected, entry)?;
        for (value, chunk) in row.iter_mut().zip(raw.chunks_exact(4)) {
            *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        let text = decode_word(&word, &mut stats);
        if !kv.push(text, &row)? {
            stats.duplicates += 1;
        }
    }

    stats.report();
    Ok(kv)
}

/// Write vectors in word2vec text format (header included)
pub fn write_word2vec_text<W: std::io::Write>(
    writer: &mut W,
    vectors: &KeyedVectors,
) -> std::io::Result<()> {
    writeln!(writer, "{} {}", vectors.len(), vectors.vector_size())?;
    for (word, vector) in vectors.iter() {
        write!(writer, "{}", word)?;
        for value in vector {
            write!(writer, " {}", value)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
