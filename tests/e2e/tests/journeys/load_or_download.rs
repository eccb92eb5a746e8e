//! Journey: cache check, then catalog download

use wordvec_core::{get_embedding, FetchError, LoaderError, ModelSource};
use wordvec_e2e_tests::mocks::{data_part_url, data_url, gzip, index_json, split, INDEX_URL};
use wordvec_e2e_tests::{FixtureBuilder, MockFetcher, TestCache};

#[test]
fn test_first_load_downloads_then_cache_serves() {
    let cache = TestCache::new();
    let fixture = FixtureBuilder::royalty_and_fruit();
    let fetcher = MockFetcher::new()
        .serve(INDEX_URL, index_json(&[("glove-tiny-4", 1, None)]))
        .serve(data_url("glove-tiny-4"), fixture.text_gz());
    let loader = cache.loader(fetcher.clone());

    let model = loader.load_or_download("glove-tiny-4").unwrap();
    assert!(!model.from_cache);
    assert_eq!(model.metadata.source, ModelSource::Catalog);
    assert_eq!(model.vectors.len(), fixture.len());
    assert_eq!(model.vectors.vector_size(), 4);
    assert!(cache.has_file("glove-tiny-4.model"));
    assert!(cache.has_file("glove-tiny-4.gz"));

    let requests = fetcher.request_count();
    let again = loader.load_or_download("glove-tiny-4").unwrap();
    assert!(again.from_cache);
    assert_eq!(again.vectors, model.vectors);
    assert_eq!(fetcher.request_count(), requests, "cache hit must not touch the network");
}

#[test]
fn test_lookup_on_downloaded_model() {
    let cache = TestCache::new();
    let fetcher = MockFetcher::new()
        .serve(INDEX_URL, index_json(&[("glove-tiny-4", 1, None)]))
        .serve(data_url("glove-tiny-4"), FixtureBuilder::royalty_and_fruit().text_gz());
    let model = cache.loader(fetcher).load_or_download("glove-tiny-4").unwrap();

    assert_eq!(get_embedding("apple", &model.vectors), vec![0.0, 0.1, 0.9, 0.1]);

    let oov = get_embedding("dragonfruit", &model.vectors);
    assert_eq!(oov, vec![0.0; 4]);
}

#[test]
fn test_binary_word2vec_model() {
    let cache = TestCache::new();
    let fixture = FixtureBuilder::new(2)
        .word("Paris", &[1.0, 0.5])
        .word("France", &[0.75, -0.25]);
    let fetcher = MockFetcher::new()
        .serve(INDEX_URL, index_json(&[("word2vec-tiny-2", 1, None)]))
        .serve(data_url("word2vec-tiny-2"), fixture.binary_gz());

    let model = cache
        .loader(fetcher)
        .load_or_download("word2vec-tiny-2")
        .unwrap();
    assert_eq!(model.vectors.get("France").unwrap(), &[0.75, -0.25]);
}

#[test]
fn test_multi_part_archive_is_reassembled() {
    let cache = TestCache::new();
    let archive = FixtureBuilder::royalty_and_fruit().text_gz();
    let parts = split(&archive, 3);
    assert_eq!(parts.len(), 3);

    let mut fetcher = MockFetcher::new().serve(
        INDEX_URL,
        index_json(&[("glove-split-4", 3, Some(archive.len() as u64))]),
    );
    for (i, part) in parts.into_iter().enumerate() {
        fetcher = fetcher.serve(data_part_url("glove-split-4", i as u32 + 1), part);
    }

    let model = cache
        .loader(fetcher.clone())
        .load_or_download("glove-split-4")
        .unwrap();
    assert_eq!(model.vectors.len(), 5);

    let requests = fetcher.requests();
    assert_eq!(requests[1], data_part_url("glove-split-4", 1));
    assert_eq!(requests[3], data_part_url("glove-split-4", 3));
}

#[test]
fn test_size_mismatch_leaves_cache_clean() {
    let cache = TestCache::new();
    let archive = FixtureBuilder::royalty_and_fruit().text_gz();
    let fetcher = MockFetcher::new()
        .serve(
            INDEX_URL,
            index_json(&[("glove-tiny-4", 1, Some(archive.len() as u64 + 1))]),
        )
        .serve(data_url("glove-tiny-4"), archive);

    let err = cache
        .loader(fetcher)
        .load_or_download("glove-tiny-4")
        .unwrap_err();
    assert!(matches!(
        err,
        LoaderError::Fetch(FetchError::SizeMismatch { .. })
    ));
    assert!(!cache.has_file("glove-tiny-4.gz"));
    assert!(!cache.has_file("glove-tiny-4.model"));
}

#[test]
fn test_server_error_propagates_without_fallback() {
    let cache = TestCache::new();
    let fetcher = MockFetcher::new()
        .serve(
            INDEX_URL,
            index_json(&[("fasttext-wiki-news-subwords-300", 1, None)]),
        )
        .fail(data_url("fasttext-wiki-news-subwords-300"), 503);

    let err = cache
        .loader(fetcher.clone())
        .load_or_download("fasttext-wiki-news-subwords-300")
        .unwrap_err();
    assert!(matches!(
        err,
        LoaderError::Fetch(FetchError::Status { status: 503, .. })
    ));
    // Catalog hit: the FastText crawl must not be tried
    assert!(fetcher.requests().iter().all(|u| !u.contains("vectors-crawl")));
}

#[test]
fn test_corrupt_archive_is_an_error() {
    let cache = TestCache::new();
    let fetcher = MockFetcher::new()
        .serve(INDEX_URL, index_json(&[("glove-bad-4", 1, None)]))
        .serve(data_url("glove-bad-4"), gzip(b"2 4\nking 1 2 3\n"));

    let err = cache
        .loader(fetcher)
        .load_or_download("glove-bad-4")
        .unwrap_err();
    assert!(matches!(err, LoaderError::Format(_)));
    assert!(!cache.has_file("glove-bad-4.model"));
}

#[test]
fn test_invalid_names_are_rejected_before_io() {
    let cache = TestCache::new();
    let fetcher = MockFetcher::new();
    let loader = cache.loader(fetcher.clone());

    for name in ["", "../escape", "nested/name", ".hidden"] {
        assert!(matches!(
            loader.load_or_download(name),
            Err(LoaderError::InvalidName(_))
        ));
    }
    assert_eq!(fetcher.request_count(), 0);
    assert!(cache.files().is_empty());
}
