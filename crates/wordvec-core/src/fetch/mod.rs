//! Fetch Module
//!
//! Everything that touches the network goes through the [`Fetcher`] trait so
//! the loader can be driven by the real HTTP client or by an in-memory fake.

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpFetcher;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Log download progress every this many bytes
pub const PROGRESS_INTERVAL: u64 = 64 * 1024 * 1024;

/// Fetch error types
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The server has no such resource (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),
    /// Any other non-success status
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },
    /// Connection, TLS, or protocol failure
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },
    /// Downloaded size differs from what the catalog promised
    #[error("Size mismatch: expected {expected} bytes, got {got}")]
    SizeMismatch { expected: u64, got: u64 },
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of remote bytes
pub trait Fetcher: Send + Sync {
    /// Stream the body at `url` into `writer`, returning the byte count
    fn fetch_to(&self, url: &str, writer: &mut dyn Write) -> Result<u64, FetchError>;

    /// Fetch a (small) text document
    fn fetch_string(&self, url: &str) -> Result<String, FetchError>;
}

/// Writer adapter that logs progress at a fixed byte interval
struct ProgressWriter<'a, W: Write> {
    inner: W,
    label: &'a str,
    written: u64,
    next_report: u64,
}

impl<'a, W: Write> ProgressWriter<'a, W> {
    fn new(inner: W, label: &'a str) -> Self {
        Self {
            inner,
            label,
            written: 0,
            next_report: PROGRESS_INTERVAL,
        }
    }
}

impl<W: Write> Write for ProgressWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        if self.written >= self.next_report {
            tracing::info!(
                archive = self.label,
                mib = self.written / (1024 * 1024),
                "Downloading..."
            );
            self.next_report += PROGRESS_INTERVAL;
        }
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Download `urls` in order, concatenated, into `dest`
///
/// Data is streamed into `<dest>.part` and only renamed to `dest` once every
/// part arrived (and matched `expected_size`, when given). On failure the
/// partial file is removed.
pub fn download_to_file(
    fetcher: &dyn Fetcher,
    urls: &[String],
    dest: &Path,
    expected_size: Option<u64>,
) -> Result<u64, FetchError> {
    let tmp = part_path(dest);
    match download_parts(fetcher, urls, &tmp, expected_size) {
        Ok(total) => {
            std::fs::rename(&tmp, dest)?;
            Ok(total)
        }
        Err(e) => {
            let _ = std::fs::remove_file(&tmp);
            Err(e)
        }
    }
}

fn download_parts(
    fetcher: &dyn Fetcher,
    urls: &[String],
    tmp: &Path,
    expected_size: Option<u64>,
) -> Result<u64, FetchError> {
    let label = tmp
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("download");
    let mut writer = ProgressWriter::new(BufWriter::with_capacity(1 << 20, File::create(tmp)?), label);

    let mut total = 0;
    for (i, url) in urls.iter().enumerate() {
        tracing::debug!(url = %url, part = i + 1, parts = urls.len(), "Fetching");
        total += fetcher.fetch_to(url, &mut writer)?;
    }
    writer.flush()?;

    if let Some(expected) = expected_size {
        if expected != total {
            return Err(FetchError::SizeMismatch {
                expected,
                got: total,
            });
        }
    }

    Ok(total)
}

// ============================================================================
// TESTS
// ============================================================================
