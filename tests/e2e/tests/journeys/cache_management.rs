//! Journey: import, list, offline use, and removal of cached models

use wordvec_core::{LoaderError, ModelSource, VectorFormat};
use wordvec_e2e_tests::mocks::{data_url, index_json, INDEX_URL};
use wordvec_e2e_tests::{FixtureBuilder, MockFetcher, TestCache};

#[test]
fn test_import_headerless_glove_file() {
    let cache = TestCache::new();
    let input = cache.scratch().join("glove.6B.4d.txt");
    std::fs::write(&input, FixtureBuilder::royalty_and_fruit().headerless_text()).unwrap();

    let loader = cache.loader(MockFetcher::new());
    let model = loader.import_file("my-glove", &input, VectorFormat::Text).unwrap();

    assert_eq!(model.vectors.len(), 5);
    assert!(matches!(model.metadata.source, ModelSource::LocalFile { .. }));

    // Now it resolves from the cache without any network access
    let cached = loader.load_or_download("my-glove").unwrap();
    assert!(cached.from_cache);
    assert_eq!(cached.vectors, model.vectors);
}

#[test]
fn test_import_binary_file() {
    let cache = TestCache::new();
    let input = cache.scratch().join("vectors.bin");
    std::fs::write(&input, FixtureBuilder::royalty_and_fruit().binary()).unwrap();

    let model = cache
        .loader(MockFetcher::new())
        .import_file("my-w2v", &input, VectorFormat::Binary)
        .unwrap();
    assert_eq!(model.vectors.get("pear").unwrap(), &[0.05, 0.0, 0.85, 0.2]);
}

#[test]
fn test_cached_models_lists_metadata() {
    let cache = TestCache::new();
    let fetcher = MockFetcher::new()
        .serve(INDEX_URL, index_json(&[("glove-tiny-4", 1, None)]))
        .serve(data_url("glove-tiny-4"), FixtureBuilder::royalty_and_fruit().text_gz());
    let loader = cache.loader(fetcher);

    assert!(loader.cached_models().unwrap().is_empty());
    loader.load_or_download("glove-tiny-4").unwrap();

    let input = cache.scratch().join("a.txt");
    std::fs::write(&input, "1 4\nzebra 1 1 1 1\n").unwrap();
    loader.import_file("a-local", &input, VectorFormat::Text).unwrap();

    let listed = loader.cached_models().unwrap();
    let names: Vec<&str> = listed.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["a-local", "glove-tiny-4"]);
    assert_eq!(listed[1].vocab_size, 5);
    assert_eq!(listed[1].vector_size, 4);
}

#[test]
fn test_stray_files_do_not_break_listing() {
    let cache = TestCache::new();
    std::fs::create_dir_all(cache.save_dir()).unwrap();
    std::fs::write(cache.save_dir().join("junk.model"), b"garbage").unwrap();
    std::fs::write(cache.save_dir().join("notes.txt"), b"hello").unwrap();

    let listed = cache.loader(MockFetcher::new()).cached_models().unwrap();
    assert!(listed.is_empty());
}

#[test]
fn test_remove_deletes_model_and_archive() {
    let cache = TestCache::new();
    let fetcher = MockFetcher::new()
        .serve(INDEX_URL, index_json(&[("glove-tiny-4", 1, None)]))
        .serve(data_url("glove-tiny-4"), FixtureBuilder::royalty_and_fruit().text_gz());
    let loader = cache.loader(fetcher);
    loader.load_or_download("glove-tiny-4").unwrap();

    assert!(loader.remove("glove-tiny-4").unwrap());
    assert!(!cache.has_file("glove-tiny-4.model"));
    assert!(!cache.has_file("glove-tiny-4.gz"));
    assert!(!loader.is_cached("glove-tiny-4"));
    assert!(!loader.remove("glove-tiny-4").unwrap());
}

#[test]
fn test_offline_serves_cache_and_refuses_network() {
    let cache = TestCache::new();
    let online = MockFetcher::new()
        .serve(
            INDEX_URL,
            index_json(&[("glove-tiny-4", 1, None), ("glove-other-4", 1, None)]),
        )
        .serve(data_url("glove-tiny-4"), FixtureBuilder::royalty_and_fruit().text_gz());
    cache.loader(online).load_or_download("glove-tiny-4").unwrap();

    let offline_fetcher = MockFetcher::new();
    let offline = cache.loader_with(offline_fetcher.clone(), |c| c.with_offline(true));

    assert!(offline.load_or_download("glove-tiny-4").unwrap().from_cache);
    assert!(matches!(
        offline.load_or_download("glove-other-4"),
        Err(LoaderError::Offline(_))
    ));
    assert!(matches!(offline.refresh_catalog(), Err(LoaderError::Offline(_))));
    assert_eq!(offline_fetcher.request_count(), 0);
}

#[test]
fn test_archives_dropped_when_not_kept() {
    let cache = TestCache::new();
    let fetcher = MockFetcher::new()
        .serve(INDEX_URL, index_json(&[("glove-tiny-4", 1, None)]))
        .serve(data_url("glove-tiny-4"), FixtureBuilder::royalty_and_fruit().text_gz());
    let loader = cache.loader_with(fetcher, |mut c| {
        c.keep_archives = false;
        c
    });

    loader.load_or_download("glove-tiny-4").unwrap();
    assert_eq!(
        cache.files(),
        vec!["gensim-data-index.json".to_string(), "glove-tiny-4.model".to_string()]
    );
}

#[test]
fn test_limit_truncates_import() {
    let cache = TestCache::new();
    let fetcher = MockFetcher::new()
        .serve(INDEX_URL, index_json(&[("glove-tiny-4", 1, None)]))
        .serve(data_url("glove-tiny-4"), FixtureBuilder::royalty_and_fruit().text_gz());
    let loader = cache.loader_with(fetcher, |c| c.with_limit(Some(3)));

    let model = loader.load_or_download("glove-tiny-4").unwrap();
    assert_eq!(model.vectors.words(), &["king", "queen", "prince"]);
}
