//! Model Loader
//!
//! Resolution order for [`ModelLoader::load_or_download`]:
//!
//! 1. `<save_dir>/<name>.model` (the local cache)
//! 2. the gensim-data catalog (`<save_dir>/<name>.gz`, downloaded if missing)
//! 3. for `fasttext-<lang>`, the FastText Common Crawl vectors
//!    (`<save_dir>/cc.<lang>.300.vec.gz`, downloaded if missing)
//!
//! Whatever was fetched is converted once and saved back to the cache.

mod config;

pub use config::{DEFAULT_FASTTEXT_BASE_URL, DEFAULT_SAVE_DIR, LoaderConfig};

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::catalog::{Catalog, CatalogEntry, CatalogError};
use crate::embeddings::KeyedVectors;
use crate::fetch::{download_to_file, FetchError, Fetcher};
use crate::formats::{
    read_native, read_native_metadata, read_word2vec_file, write_native, FormatError, ReadOptions,
    VectorFormat,
};
use crate::model::{Model, ModelMetadata, ModelSource};

/// Cached copy of the catalog index, inside `save_dir`
pub const INDEX_FILE: &str = "gensim-data-index.json";

const MODEL_EXTENSION: &str = "model";

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Loader error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// Name cannot be used as a cache file name
    #[error("Invalid model name: {0:?}")]
    InvalidName(String),
    /// Neither the catalog nor FastText has this model
    #[error("Model '{0}' not found in the gensim-data catalog or FastText")]
    ModelNotFound(String),
    /// A download was needed but the loader is offline
    #[error("Offline mode: '{0}' is not cached and cannot be downloaded")]
    Offline(String),
    /// Reading or writing vector files failed
    #[error(transparent)]
    Format(#[from] FormatError),
    /// Download failed
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// Catalog index was unusable
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Loader result type
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Reject names that would escape or confuse the cache directory
fn validate_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0'])
        || name.contains("..");
    if bad {
        return Err(LoaderError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Language code of a `fasttext-<lang>` name
///
/// The code is the second dash-separated field, so `fasttext-pt-br` maps to `pt`.
pub fn fasttext_lang(name: &str) -> Option<&str> {
    let lang = name.strip_prefix("fasttext-")?.split('-').next()?;
    if !lang.is_empty() && lang.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(lang)
    } else {
        None
    }
}

/// File name of the FastText crawl archive for a language
pub fn fasttext_archive_name(lang: &str) -> String {
    format!("cc.{}.300.vec.gz", lang)
}

// ============================================================================
// LOADER
// ============================================================================

/// Fetches, converts, and caches embedding models
pub struct ModelLoader {
    config: LoaderConfig,
    fetcher: Box<dyn Fetcher>,
}

impl ModelLoader {
    /// Create a loader using `fetcher` for all network access
    pub fn new(config: LoaderConfig, fetcher: impl Fetcher + 'static) -> Self {
        Self {
            config,
            fetcher: Box::new(fetcher),
        }
    }

    /// Create a loader backed by the HTTP fetcher
    #[cfg(feature = "http")]
    pub fn with_http(config: LoaderConfig) -> Result<Self> {
        Ok(Self::new(config, crate::fetch::HttpFetcher::new()?))
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Path of the cached model file for `name`
    pub fn model_path(&self, name: &str) -> PathBuf {
        self.config
            .save_dir
            .join(format!("{}.{}", name, MODEL_EXTENSION))
    }

    /// Whether `name` is already in the local cache
    pub fn is_cached(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.model_path(name).is_file()
    }

    fn ensure_save_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config.save_dir)?;
        Ok(())
    }

    /// Return the model from the cache, downloading and caching it first if needed
    ///
    /// With `config.limit` set, only the first N vectors of a fresh download
    /// are kept, and that truncated model is what gets cached.
    pub fn load_or_download(&self, name: &str) -> Result<Model> {
        validate_name(name)?;
        self.ensure_save_dir()?;

        let model_path = self.model_path(name);
        if model_path.is_file() {
            info!(model = name, path = %model_path.display(), "Loading model from cache");
            let (metadata, vectors) = read_native(&model_path)?;
            return Ok(Model {
                metadata,
                vectors,
                from_cache: true,
            });
        }

        let catalog = self.catalog()?;
        if let Some(entry) = catalog.get(name) {
            return self.load_from_catalog(entry);
        }
        debug!(model = name, "Not in the gensim-data catalog");

        if self.config.fasttext_fallback {
            if let Some(lang) = fasttext_lang(name) {
                return self.load_from_fasttext(name, lang);
            }
        }

        Err(LoaderError::ModelNotFound(name.to_string()))
    }

    fn load_from_catalog(&self, entry: &CatalogEntry) -> Result<Model> {
        let name = entry.name.as_str();
        let archive = self.config.save_dir.join(format!("{}.gz", name));

        if archive.is_file() {
            info!(model = name, path = %archive.display(), "Using previously downloaded archive");
        } else {
            if self.config.offline {
                return Err(LoaderError::Offline(name.to_string()));
            }
            info!(model = name, "Downloading from gensim-data...");
            let urls = entry.urls(&self.config.data_base_url);
            let bytes = download_to_file(self.fetcher.as_ref(), &urls, &archive, entry.file_size)?;
            info!(model = name, bytes, "Download complete");
        }

        let vectors = self.read_archive(&archive, entry.format())?;
        self.save(name, ModelSource::Catalog, vectors, Some(&archive))
    }

    fn load_from_fasttext(&self, name: &str, lang: &str) -> Result<Model> {
        let archive = self.config.save_dir.join(fasttext_archive_name(lang));

        if archive.is_file() {
            info!(model = name, path = %archive.display(), "Using previously downloaded FastText archive");
        } else {
            if self.config.offline {
                return Err(LoaderError::Offline(name.to_string()));
            }
            let url = format!(
                "{}/{}",
                self.config.fasttext_base_url.trim_end_matches('/'),
                fasttext_archive_name(lang)
            );
            info!(model = name, lang, "Downloading FastText model...");
            match download_to_file(self.fetcher.as_ref(), &[url], &archive, None) {
                Ok(bytes) => info!(model = name, bytes, "Download complete"),
                // No crawl vectors for this language
                Err(FetchError::NotFound(_)) => {
                    return Err(LoaderError::ModelNotFound(name.to_string()));
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(model = name, "Loading FastText model...");
        let vectors = self.read_archive(&archive, VectorFormat::Text)?;
        self.save(
            name,
            ModelSource::FastTextCrawl {
                lang: lang.to_string(),
            },
            vectors,
            Some(&archive),
        )
    }

    fn read_archive(&self, path: &Path, format: VectorFormat) -> Result<KeyedVectors> {
        let options = ReadOptions {
            limit: self.config.limit,
        };
        Ok(read_word2vec_file(path, format, options)?)
    }

    fn save(
        &self,
        name: &str,
        source: ModelSource,
        vectors: KeyedVectors,
        archive: Option<&Path>,
    ) -> Result<Model> {
        let metadata = ModelMetadata::describe(name, source, &vectors);
        let model_path = self.model_path(name);
        write_native(&model_path, &vectors, &metadata)?;
        info!(
            model = name,
            path = %model_path.display(),
            words = metadata.vocab_size,
            dims = metadata.vector_size,
            "Saved model"
        );

        if let Some(archive) = archive {
            if !self.config.keep_archives {
                if let Err(e) = std::fs::remove_file(archive) {
                    warn!(path = %archive.display(), "Failed to remove archive: {}", e);
                }
            }
        }

        Ok(Model {
            metadata,
            vectors,
            from_cache: false,
        })
    }

    /// Convert a local word2vec file into cached model `name`
    ///
    /// Overwrites any cached model of the same name.
    pub fn import_file(&self, name: &str, path: &Path, format: VectorFormat) -> Result<Model> {
        validate_name(name)?;
        self.ensure_save_dir()?;

        info!(model = name, path = %path.display(), %format, "Importing word2vec file");
        let vectors = self.read_archive(path, format)?;
        let source = ModelSource::LocalFile {
            path: path.display().to_string(),
        };
        self.save(name, source, vectors, None)
    }

    /// Metadata of every model in the cache, sorted by name
    ///
    /// Unreadable files are skipped with a warning.
    pub fn cached_models(&self) -> Result<Vec<ModelMetadata>> {
        let dir = &self.config.save_dir;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut models = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(MODEL_EXTENSION) {
                continue;
            }
            match read_native_metadata(&path) {
                Ok(meta) => models.push(meta),
                Err(e) => warn!(path = %path.display(), "Skipping unreadable model file: {}", e),
            }
        }

        models.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(models)
    }

    /// Delete the cached model `name` and any archive it was built from
    ///
    /// Returns whether anything was removed.
    pub fn remove(&self, name: &str) -> Result<bool> {
        validate_name(name)?;

        let mut candidates = vec![
            self.model_path(name),
            self.config.save_dir.join(format!("{}.gz", name)),
        ];
        if let Some(lang) = fasttext_lang(name) {
            candidates.push(self.config.save_dir.join(fasttext_archive_name(lang)));
        }

        let mut removed = false;
        for path in candidates {
            if path.is_file() {
                std::fs::remove_file(&path)?;
                info!(path = %path.display(), "Removed");
                removed = true;
            }
        }
        Ok(removed)
    }

    /// The model catalog: cached index, else fetched index, else built-in list
    pub fn catalog(&self) -> Result<Catalog> {
        let index_path = self.config.save_dir.join(INDEX_FILE);
        if index_path.is_file() {
            let json = std::fs::read_to_string(&index_path)?;
            match Catalog::from_index_json(&json) {
                Ok(catalog) => return Ok(catalog),
                Err(e) => warn!(path = %index_path.display(), "Ignoring cached catalog index: {}", e),
            }
        }

        if self.config.offline {
            debug!("Offline: using built-in catalog");
            return Ok(Catalog::builtin());
        }

        match self.refresh_catalog() {
            Ok(catalog) => Ok(catalog),
            Err(e) => {
                warn!("Could not fetch catalog index, using built-in list: {}", e);
                Ok(Catalog::builtin())
            }
        }
    }

    /// Fetch the catalog index and cache it, replacing any cached copy
    pub fn refresh_catalog(&self) -> Result<Catalog> {
        if self.config.offline {
            return Err(LoaderError::Offline(INDEX_FILE.to_string()));
        }
        self.ensure_save_dir()?;

        let json = self.fetcher.fetch_string(&self.config.index_url)?;
        let catalog = Catalog::from_index_json(&json)?;
        std::fs::write(self.config.save_dir.join(INDEX_FILE), &json)?;
        info!(models = catalog.len(), "Catalog index updated");
        Ok(catalog)
    }
}

/// Load `model_name` from `save_dir`, downloading it if necessary
///
/// Uses the default configuration (FastText fallback on) over HTTP.
#[cfg(feature = "http")]
pub fn load_or_download_embedding(
    model_name: &str,
    save_dir: impl Into<PathBuf>,
) -> Result<KeyedVectors> {
    let config = LoaderConfig::default().with_save_dir(save_dir);
    let loader = ModelLoader::with_http(config)?;
    Ok(loader.load_or_download(model_name)?.vectors)
}

// ============================================================================
// TESTS
// ============================================================================
