//! wordvec CLI
//!
//! Command-line interface for fetching, caching, and querying pretrained
//! word embeddings.

use std::collections::HashSet;
use std::io;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use wordvec_core::{LoaderConfig, ModelLoader, OovPolicy, VectorFormat};

/// wordvec - pretrained word embeddings CLI
#[derive(Parser)]
#[command(name = "wordvec")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fetch, cache, and query pretrained word embeddings")]
#[command(long_about = "wordvec downloads word2vec, GloVe, and FastText models from the gensim-data catalog \
(or the FastText Common Crawl vectors), caches them locally, and looks up word vectors.\n\n\
Out-of-vocabulary words map to a zero vector.")]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalOpts {
    /// Model cache directory (default: $WORDVEC_MODELS_DIR or ./models)
    #[arg(long, global = true)]
    save_dir: Option<PathBuf>,

    /// Never download; only use cached models and archives
    #[arg(long, global = true)]
    offline: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a model, downloading and caching it first if needed
    Fetch {
        /// Model name (e.g. glove-wiki-gigaword-50, fasttext-it)
        model: String,
        /// Do not fall back to FastText Common Crawl vectors
        #[arg(long)]
        no_fasttext: bool,
        /// Keep only the first N vectors of a fresh download
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print word vectors (zeros for out-of-vocabulary words)
    Lookup {
        /// Model name
        model: String,
        /// Words to look up
        #[arg(required = true)]
        words: Vec<String>,
        /// Do not warn about out-of-vocabulary words
        #[arg(long, short)]
        quiet: bool,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
        /// Decimal places in text output
        #[arg(long, default_value = "4")]
        precision: usize,
    },

    /// Show the words closest to a word
    Similar {
        /// Model name
        model: String,
        /// Query word
        word: String,
        /// Number of neighbours
        #[arg(long, short = 'k', default_value = "10")]
        top_k: usize,
    },

    /// List models available in the catalog
    List {
        /// Re-download the catalog index
        #[arg(long)]
        refresh: bool,
    },

    /// List cached models
    Cached,

    /// Remove a cached model and its archives
    Remove {
        /// Model name
        model: String,
    },

    /// Import a local word2vec file into the cache
    Import {
        /// Name to cache the model under
        name: String,
        /// Path to a word2vec file (.txt, .vec, .bin, optionally .gz)
        path: PathBuf,
        /// File is in binary word2vec layout
        #[arg(long)]
        binary: bool,
        /// Keep only the first N vectors
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for vectors and JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let global = cli.global;
    match cli.command {
        Commands::Fetch {
            model,
            no_fasttext,
            limit,
        } => run_fetch(&global, &model, no_fasttext, limit),
        Commands::Lookup {
            model,
            words,
            quiet,
            json,
            precision,
        } => run_lookup(&global, &model, &words, quiet, json, precision),
        Commands::Similar { model, word, top_k } => run_similar(&global, &model, &word, top_k),
        Commands::List { refresh } => run_list(&global, refresh),
        Commands::Cached => run_cached(&global),
        Commands::Remove { model } => run_remove(&global, &model),
        Commands::Import {
            name,
            path,
            binary,
            limit,
        } => run_import(&global, &name, path, binary, limit),
    }
}

/// Environment config with command-line overrides applied
fn loader_config(global: &GlobalOpts) -> LoaderConfig {
    let mut config = LoaderConfig::from_env();
    if let Some(dir) = &global.save_dir {
        config.save_dir = dir.clone();
    }
    if global.offline {
        config.offline = true;
    }
    config
}

fn build_loader(config: LoaderConfig) -> anyhow::Result<ModelLoader> {
    Ok(ModelLoader::with_http(config)?)
}

/// Run fetch command
fn run_fetch(
    global: &GlobalOpts,
    model: &str,
    no_fasttext: bool,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let config = loader_config(global)
        .with_fasttext_fallback(!no_fasttext)
        .with_limit(limit);
    let loader = build_loader(config)?;
    let model = loader.load_or_download(model)?;

    println!("{}", "=== Model Ready ===".cyan().bold());
    println!("{}: {}", "Name".white().bold(), model.name());
    println!("{}: {}", "Source".white().bold(), model.metadata.source);
    println!("{}: {}", "Vocabulary".white().bold(), model.vectors.len());
    println!("{}: {}", "Dimensions".white().bold(), model.vectors.vector_size());
    println!(
        "{}: {}",
        "Cached At".white().bold(),
        loader.model_path(model.name()).display()
    );
    if model.from_cache {
        println!("{}", "(loaded from cache)".dimmed());
    }

    Ok(())
}

/// Run lookup command
fn run_lookup(
    global: &GlobalOpts,
    model: &str,
    words: &[String],
    quiet: bool,
    json: bool,
    precision: usize,
) -> anyhow::Result<()> {
    let loader = build_loader(loader_config(global))?;
    let model = loader.load_or_download(model)?;
    let policy = if quiet { OovPolicy::Silent } else { OovPolicy::Warn };

    if json {
        let rows: Vec<serde_json::Value> = words
            .iter()
            .map(|w| {
                serde_json::json!({
                    "word": w,
                    "inVocabulary": model.vectors.contains(w),
                    "vector": model.vectors.embedding_or_zero(w, policy),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for word in words {
        let vector = model.vectors.embedding_or_zero(word, policy);
        let label = if model.vectors.contains(word) {
            word.green().bold()
        } else {
            format!("{} (not in vocabulary)", word).yellow()
        };
        println!("{}", label);
        println!("{}", format_vector(&vector, precision));
    }

    Ok(())
}

/// Run similar command
fn run_similar(global: &GlobalOpts, model: &str, word: &str, top_k: usize) -> anyhow::Result<()> {
    let loader = build_loader(loader_config(global))?;
    let model = loader.load_or_download(model)?;

    if !model.vectors.contains(word) {
        println!(
            "{}",
            format!("'{}' is not in the vocabulary of {}", word, model.name()).yellow()
        );
        return Ok(());
    }

    println!(
        "{}",
        format!("=== Nearest to '{}' ({}) ===", word, model.name())
            .cyan()
            .bold()
    );
    for hit in model.vectors.most_similar(word, top_k) {
        print_score_bar(&hit.word, hit.score);
    }

    Ok(())
}

/// Run list command
fn run_list(global: &GlobalOpts, refresh: bool) -> anyhow::Result<()> {
    let loader = build_loader(loader_config(global))?;
    let catalog = if refresh {
        loader.refresh_catalog()?
    } else {
        loader.catalog()?
    };
    let cached: HashSet<String> = loader
        .cached_models()?
        .into_iter()
        .map(|m| m.name)
        .collect();

    println!("{}", "=== Available Models ===".cyan().bold());
    println!();

    for entry in catalog.entries() {
        let dims = entry
            .dimension()
            .map(|d| format!("{}d", d))
            .unwrap_or_else(|| "?".to_string());
        let records = entry
            .num_records
            .map(|n| format!("{} words", n))
            .unwrap_or_default();
        let marker = if cached.contains(&entry.name) {
            "[cached]".green().to_string()
        } else {
            String::new()
        };

        println!(
            "  {:40} {:>6} {:>16} {}",
            entry.name.white().bold(),
            dims,
            records,
            marker
        );
        if !entry.description.is_empty() {
            println!("    {}", truncate(&entry.description, 90).dimmed());
        }
    }

    println!();
    println!(
        "{}",
        "FastText Common Crawl models are also available as fasttext-<lang> (e.g. fasttext-it).".dimmed()
    );

    Ok(())
}

/// Run cached command
fn run_cached(global: &GlobalOpts) -> anyhow::Result<()> {
    let config = loader_config(global);
    let save_dir = config.save_dir.clone();
    let loader = build_loader(config)?;
    let models = loader.cached_models()?;

    println!(
        "{}",
        format!("=== Cached Models ({}) ===", save_dir.display()).cyan().bold()
    );

    if models.is_empty() {
        println!("{}", "No cached models.".dimmed());
        return Ok(());
    }

    for meta in models {
        println!(
            "  {:40} {:>9} x {:<4} {:28} {}",
            meta.name.white().bold(),
            meta.vocab_size,
            meta.vector_size,
            meta.source.to_string(),
            meta.saved_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        );
    }

    Ok(())
}

/// Run remove command
fn run_remove(global: &GlobalOpts, model: &str) -> anyhow::Result<()> {
    let loader = build_loader(loader_config(global))?;

    if loader.remove(model)? {
        println!("{} {}", "Removed".green().bold(), model);
    } else {
        println!("{}", format!("'{}' is not cached.", model).yellow());
    }

    Ok(())
}

/// Run import command
fn run_import(
    global: &GlobalOpts,
    name: &str,
    path: PathBuf,
    binary: bool,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let format = if binary {
        VectorFormat::Binary
    } else {
        VectorFormat::Text
    };
    let loader = build_loader(loader_config(global).with_limit(limit))?;
    let model = loader.import_file(name, &path, format)?;

    println!(
        "{} {} ({} words x {} dims)",
        "Imported".green().bold(),
        model.name(),
        model.vectors.len(),
        model.vectors.vector_size()
    );

    Ok(())
}

/// Render a vector as `[a, b, c]` with fixed precision
fn format_vector(vector: &[f32], precision: usize) -> String {
    let parts: Vec<String> = vector
        .iter()
        .map(|v| format!("{:.*}", precision, v))
        .collect();
    format!("[{}]", parts.join(", "))
}

/// Shorten `s` to at most `max` characters, adding an ellipsis
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// Print a similarity score bar
fn print_score_bar(label: &str, score: f32) {
    let bar_width: usize = 30;
    let filled = ((score.clamp(0.0, 1.0)) * bar_width as f32) as usize;
    let empty = bar_width.saturating_sub(filled);

    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(empty));
    let colored_bar = if score >= 0.7 {
        bar.green()
    } else if score >= 0.4 {
        bar.yellow()
    } else {
        bar.red()
    };

    println!("  {:20} [{:30}] {:>6.3}", label, colored_bar, score);
}
