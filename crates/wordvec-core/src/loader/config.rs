//! Loader configuration
//!
//! Defaults match a plain `models/` directory next to the caller. Every field
//! can be overridden through `WORDVEC_*` environment variables.

use std::path::PathBuf;

use crate::catalog::{DEFAULT_DATA_BASE_URL, DEFAULT_INDEX_URL};

/// Base URL of the FastText Common Crawl vectors
pub const DEFAULT_FASTTEXT_BASE_URL: &str = "https://dl.fbaipublicfiles.com/fasttext/vectors-crawl";

/// Default cache directory, relative to the working directory
pub const DEFAULT_SAVE_DIR: &str = "models";

/// How and where models are fetched and cached
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    /// Directory holding `<name>.model` files and downloaded archives
    pub save_dir: PathBuf,
    /// gensim-data `list.json`
    pub index_url: String,
    /// gensim-data release asset base
    pub data_base_url: String,
    /// FastText Common Crawl base
    pub fasttext_base_url: String,
    /// Try `fasttext-<lang>` names against the FastText crawl vectors
    pub fasttext_fallback: bool,
    /// Never touch the network
    pub offline: bool,
    /// Keep raw `.gz` archives after conversion
    pub keep_archives: bool,
    /// Import at most this many vectors from an archive
    pub limit: Option<usize>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from(DEFAULT_SAVE_DIR),
            index_url: DEFAULT_INDEX_URL.to_string(),
            data_base_url: DEFAULT_DATA_BASE_URL.to_string(),
            fasttext_base_url: DEFAULT_FASTTEXT_BASE_URL.to_string(),
            fasttext_fallback: true,
            offline: false,
            keep_archives: true,
            limit: None,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl LoaderConfig {
    /// Defaults overridden by the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup(key)` for each `WORDVEC_*` key
    ///
    /// - `WORDVEC_MODELS_DIR`: cache directory
    /// - `WORDVEC_OFFLINE`: disable downloads
    /// - `WORDVEC_INDEX_URL`, `WORDVEC_DATA_URL`, `WORDVEC_FASTTEXT_URL`: mirrors
    /// - `WORDVEC_KEEP_ARCHIVES`: keep `.gz` files after conversion
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("WORDVEC_MODELS_DIR").filter(|s| !s.is_empty()) {
            config.save_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("WORDVEC_INDEX_URL").filter(|s| !s.is_empty()) {
            config.index_url = url;
        }
        if let Some(url) = lookup("WORDVEC_DATA_URL").filter(|s| !s.is_empty()) {
            config.data_base_url = url;
        }
        if let Some(url) = lookup("WORDVEC_FASTTEXT_URL").filter(|s| !s.is_empty()) {
            config.fasttext_base_url = url;
        }
        if let Some(value) = lookup("WORDVEC_OFFLINE") {
            match parse_bool(&value) {
                Some(b) => config.offline = b,
                None => tracing::warn!("Ignoring invalid WORDVEC_OFFLINE value: {}", value),
            }
        }
        if let Some(value) = lookup("WORDVEC_KEEP_ARCHIVES") {
            match parse_bool(&value) {
                Some(b) => config.keep_archives = b,
                None => tracing::warn!("Ignoring invalid WORDVEC_KEEP_ARCHIVES value: {}", value),
            }
        }

        config
    }

    /// Cache models in the platform cache directory instead of `./models`
    ///
    /// - Linux: ~/.cache/wordvec/models
    /// - macOS: ~/Library/Caches/dev.wordvec.wordvec/models
    /// - Windows: %LOCALAPPDATA%\wordvec\wordvec\cache\models
    pub fn platform() -> Self {
        Self {
            save_dir: platform_cache_dir(),
            ..Self::default()
        }
    }

    pub fn with_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_dir = dir.into();
        self
    }

    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn with_fasttext_fallback(mut self, enabled: bool) -> Self {
        self.fasttext_fallback = enabled;
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

fn platform_cache_dir() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("dev", "wordvec", "wordvec") {
        return proj_dirs.cache_dir().join("models");
    }

    // Fallback to home directory
    if let Some(base_dirs) = directories::BaseDirs::new() {
        return base_dirs.home_dir().join(".cache/wordvec/models");
    }

    PathBuf::from(DEFAULT_SAVE_DIR)
}
