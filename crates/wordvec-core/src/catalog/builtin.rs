//! Offline copy of the gensim-data model list

use std::collections::BTreeMap;

use super::CatalogEntry;

/// (name, records, dimension, description)
const MODELS: &[(&str, u64, u64, &str)] = &[
    (
        "conceptnet-numberbatch-17-06-300",
        1_917_247,
        300,
        "ConceptNet Numberbatch consists of state-of-the-art semantic vectors built from ConceptNet",
    ),
    (
        "fasttext-wiki-news-subwords-300",
        999_999,
        300,
        "1 million word vectors trained on Wikipedia 2017, UMBC webbase corpus and statmt.org news dataset",
    ),
    ("glove-twitter-25", 1_193_514, 25, "Pre-trained vectors based on 2B tweets, 27B tokens, 1.2M vocab, uncased"),
    ("glove-twitter-50", 1_193_514, 50, "Pre-trained vectors based on 2B tweets, 27B tokens, 1.2M vocab, uncased"),
    ("glove-twitter-100", 1_193_514, 100, "Pre-trained vectors based on 2B tweets, 27B tokens, 1.2M vocab, uncased"),
    ("glove-twitter-200", 1_193_514, 200, "Pre-trained vectors based on 2B tweets, 27B tokens, 1.2M vocab, uncased"),
    ("glove-wiki-gigaword-50", 400_000, 50, "Pre-trained vectors based on Wikipedia 2014 + Gigaword, 5.6B tokens, 400K vocab, uncased"),
    ("glove-wiki-gigaword-100", 400_000, 100, "Pre-trained vectors based on Wikipedia 2014 + Gigaword 5.6B tokens, 400K vocab, uncased"),
    ("glove-wiki-gigaword-200", 400_000, 200, "Pre-trained vectors based on Wikipedia 2014 + Gigaword, 5.6B tokens, 400K vocab, uncased"),
    ("glove-wiki-gigaword-300", 400_000, 300, "Pre-trained vectors based on Wikipedia 2014 + Gigaword, 5.6B tokens, 400K vocab, uncased"),
    (
        "word2vec-google-news-300",
        3_000_000,
        300,
        "Pre-trained vectors trained on a part of the Google News dataset (about 100 billion words)",
    ),
    (
        "word2vec-ruscorpora-300",
        184_973,
        300,
        "Word2vec Continuous Skipgram vectors trained on full Russian National Corpus (about 250M words)",
    ),
];

pub(super) fn entries() -> impl Iterator<Item = CatalogEntry> {
    MODELS.iter().map(|(name, records, dim, description)| {
        let mut parameters = BTreeMap::new();
        parameters.insert("dimension".to_string(), serde_json::Value::from(*dim));
        CatalogEntry {
            name: (*name).to_string(),
            num_records: Some(*records),
            // Sizes change between releases; only the fetched index is trusted for them
            file_size: None,
            parts: 1,
            description: (*description).to_string(),
            license: None,
            file_name: Some(format!("{}.gz", name)),
            parameters,
            read_more: Vec::new(),
        }
    })
}
