//! Test doubles and fixture data

mod fetcher;
mod fixtures;

pub use fetcher::MockFetcher;
pub use fixtures::{
    data_part_url, data_url, fasttext_url, gzip, index_json, split, FixtureBuilder, DATA_URL,
    FASTTEXT_URL, INDEX_URL,
};
