//! Native Cache Format
//!
//! Layout of a `<name>.model` file (all integers little-endian):
//!
//! ```text
//! "WVKV" | u32 version | u32 meta_len | meta JSON
//!        | u64 count | u64 dim
//!        | count x (u32 len | UTF-8 word)
//!        | count*dim x f32
//! ```
//!
//! Files are written to `<path>.part` and renamed into place, so a crash
//! never leaves a half-written model where the cache lookup would find it.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use super::FormatError;
use crate::embeddings::KeyedVectors;
use crate::model::ModelMetadata;

/// File magic
pub const MAGIC: &[u8; 4] = b"WVKV";

/// Current format version
pub const FORMAT_VERSION: u32 = 1;

/// Upper bound for a single word or the metadata block
const MAX_BLOCK_LEN: u32 = 16 * 1024 * 1024;

/// Floats decoded per read while loading the matrix
const MATRIX_CHUNK: usize = 64 * 1024;

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Save vectors and metadata to `path` atomically
pub fn write_native(
    path: &Path,
    vectors: &KeyedVectors,
    metadata: &ModelMetadata,
) -> Result<(), FormatError> {
    let tmp = part_path(path);
    let result = write_to(&tmp, vectors, metadata);
    if let Err(e) = result {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    std::fs::rename(&tmp, path)?;
    Ok(())
}

fn write_to(path: &Path, vectors: &KeyedVectors, metadata: &ModelMetadata) -> Result<(), FormatError> {
    let mut w = BufWriter::with_capacity(1 << 20, File::create(path)?);

    w.write_all(MAGIC)?;
    w.write_all(&FORMAT_VERSION.to_le_bytes())?;

    let meta = serde_json::to_vec(metadata)?;
    w.write_all(&(meta.len() as u32).to_le_bytes())?;
    w.write_all(&meta)?;

    w.write_all(&(vectors.len() as u64).to_le_bytes())?;
    w.write_all(&(vectors.vector_size() as u64).to_le_bytes())?;

    for word in vectors.words() {
        w.write_all(&(word.len() as u32).to_le_bytes())?;
        w.write_all(word.as_bytes())?;
    }

    for value in vectors.matrix() {
        w.write_all(&value.to_le_bytes())?;
    }

    let file = w.into_inner().map_err(|e| FormatError::Io(e.into_error()))?;
    file.sync_all()?;
    Ok(())
}

fn read_u32<R: Read>(r: &mut R) -> Result<u32, FormatError> {
    let mut buf = [0u8; 4];
    read_exact(r, &mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(r: &mut R) -> Result<u64, FormatError> {
    let mut buf = [0u8; 8];
    read_exact(r, &mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_exact<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<(), FormatError> {
    r.read_exact(buf).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            FormatError::Corrupt("unexpected end of file".to_string())
        } else {
            FormatError::Io(e)
        }
    })
}

fn read_block<R: Read>(r: &mut R, what: &str) -> Result<Vec<u8>, FormatError> {
    let len = read_u32(r)?;
    if len > MAX_BLOCK_LEN {
        return Err(FormatError::Corrupt(format!("{} length {} is too large", what, len)));
    }
    let mut buf = vec![0u8; len as usize];
    read_exact(r, &mut buf)?;
    Ok(buf)
}

fn read_preamble<R: Read>(r: &mut R) -> Result<ModelMetadata, FormatError> {
    let mut magic = [0u8; 4];
    read_exact(r, &mut magic).map_err(|_| FormatError::BadMagic)?;
    if &magic != MAGIC {
        return Err(FormatError::BadMagic);
    }

    let version = read_u32(r)?;
    if version != FORMAT_VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }

    let meta = read_block(r, "metadata")?;
    Ok(serde_json::from_slice(&meta)?)
}

/// Read only the metadata block of a cached model
pub fn read_native_metadata(path: &Path) -> Result<ModelMetadata, FormatError> {
    let mut r = BufReader::new(File::open(path)?);
    read_preamble(&mut r)
}

/// Load a cached model
pub fn read_native(path: &Path) -> Result<(ModelMetadata, KeyedVectors), FormatError> {
    let mut r = BufReader::with_capacity(1 << 20, File::open(path)?);
    let metadata = read_preamble(&mut r)?;

    let count = usize::try_from(read_u64(&mut r)?)
        .map_err(|_| FormatError::Corrupt("word count overflows usize".to_string()))?;
    let dim = usize::try_from(read_u64(&mut r)?)
        .map_err(|_| FormatError::Corrupt("dimension overflows usize".to_string()))?;
    let total = count
        .checked_mul(dim)
        .ok_or_else(|| FormatError::Corrupt(format!("{} x {} overflows", count, dim)))?;

    if count != metadata.vocab_size || dim != metadata.vector_size {
        return Err(FormatError::Corrupt(format!(
            "header says {}x{}, metadata says {}x{}",
            count, dim, metadata.vocab_size, metadata.vector_size
        )));
    }

    let mut vocab = Vec::with_capacity(count.min(MATRIX_CHUNK));
    for _ in 0..count {
        let bytes = read_block(&mut r, "word")?;
        let word = String::from_utf8(bytes)
            .map_err(|e| FormatError::Corrupt(format!("word is not UTF-8: {}", e)))?;
        vocab.push(word);
    }

    // Grows per chunk so a lying header cannot force one huge allocation
    let mut matrix = Vec::with_capacity(total.min(MATRIX_CHUNK));
    let mut raw = vec![0u8; MATRIX_CHUNK.min(total.max(1)) * 4];
    while matrix.len() < total {
        let n = (total - matrix.len()).min(MATRIX_CHUNK);
        let chunk = &mut raw[..n * 4];
        read_exact(&mut r, chunk)?;
        matrix.extend(
            chunk
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])),
        );
    }

    let vectors = KeyedVectors::from_parts(vocab, matrix, dim)?;
    Ok((metadata, vectors))
}

// ============================================================================
// TESTS
// ============================================================================
