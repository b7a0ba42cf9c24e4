//! Retrieval E2E tests.
//!
//! Exercise the full ingest → store → search → list → update path through
//! the retrieval service, against a real on-disk store and a deterministic
//! embedder.

use pretty_assertions::assert_eq;

use e2e_tests::{TableEmbedder, TestHarness};
use rag_embeddings::Embedding;
use rag_service::{similarity_from_distance, ServiceError};
use rag_types::DirectoryUpdate;
use rag_vector::{StoreConfig, VectorStore};

// ===== Ingest and listing =====

/// Every ingested filename is listed under the root directory.
#[tokio::test]
async fn test_ingested_files_listed_at_root() {
    let harness = TestHarness::new();
    harness
        .ingest(&[
            ("a.txt", "alpha"),
            ("b.md", "bravo bravo"),
            ("c.txt", "charlie"),
        ])
        .await;

    let files = harness.service.list_files().unwrap();
    let listed: Vec<(&str, &str)> = files
        .iter()
        .map(|f| (f.filename.as_str(), f.directory.as_str()))
        .collect();
    assert_eq!(listed, vec![("a.txt", "/"), ("b.md", "/"), ("c.txt", "/")]);

    let ids: Vec<&str> = files.iter().map(|f| f.doc_id.as_str()).collect();
    assert_eq!(ids, vec!["doc_0", "doc_1", "doc_2"]);
}

/// All texts of one ingest go to the provider in a single batch.
#[tokio::test]
async fn test_ingest_embeds_in_one_batch() {
    let harness = TestHarness::new();
    harness
        .ingest(&[("a.txt", "one"), ("b.txt", "two"), ("c.txt", "three")])
        .await;

    let calls = harness.embedder.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], vec!["one", "two", "three"]);
}

/// Re-ingesting a filename leaves exactly one document with that name.
#[tokio::test]
async fn test_reingest_keeps_single_document() {
    let harness = TestHarness::new();
    harness.ingest(&[("a.txt", "first"), ("b.txt", "other")]).await;
    harness.ingest(&[("a.txt", "second version")]).await;
    harness.ingest(&[("a.txt", "third version")]).await;

    let files = harness.service.list_files().unwrap();
    let named_a: Vec<_> = files.iter().filter(|f| f.filename == "a.txt").collect();
    assert_eq!(named_a.len(), 1);
    assert_eq!(files.len(), 2);

    let doc = harness.store.get(&named_a[0].doc_id).unwrap().unwrap();
    assert_eq!(doc.text, "third version");
}

/// Ids are never reused, even after replacements and deletions.
#[tokio::test]
async fn test_ids_never_reused() {
    let harness = TestHarness::new();
    let first = harness.ingest(&[("a.txt", "x")]).await;
    harness.service.remove_file("a.txt").unwrap();
    let second = harness.ingest(&[("a.txt", "x")]).await;

    assert_eq!(first, vec!["doc_0"]);
    assert_eq!(second, vec!["doc_1"]);
}

/// A provider failure during re-ingest leaves the earlier document in place.
#[tokio::test]
async fn test_failed_reingest_keeps_previous_version() {
    let harness = TestHarness::new();
    harness.ingest(&[("a.txt", "kept")]).await;

    harness.embedder.set_failing(true);
    let err = harness
        .service
        .ingest(vec!["lost".to_string()], vec!["a.txt".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Provider(_)));

    let files = harness.service.list_files().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(harness.store.get("doc_0").unwrap().unwrap().text, "kept");
}

// ===== Search =====

/// An exact vector match scores 1.0.
#[tokio::test]
async fn test_exact_match_scores_one() {
    let harness = TestHarness::with_embedder(TableEmbedder::new().with("hello world", &[0.3, 0.7]));
    harness.ingest(&[("a.txt", "hello world")]).await;

    let hits = harness.service.search("hello world", 5, 0.5).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].score, 1.0);
    assert_eq!(hits[0].filename, "a.txt");
    assert_eq!(hits[0].document, "hello world");
    assert_eq!(hits[0].rank, 1);
}

/// Best match at distance 0.5 (similarity 0.667) is below a 0.99 threshold.
#[tokio::test]
async fn test_threshold_filters_everything() {
    let embedder = TableEmbedder::new()
        .with("query", &[0.0, 0.0])
        .with("near", &[0.5, 0.5])
        .with("far", &[3.0, 3.0]);
    let harness = TestHarness::with_embedder(embedder);
    harness.ingest(&[("near.txt", "near"), ("far.txt", "far")]).await;

    let hits = harness.service.search("query", 5, 0.99).await.unwrap();
    assert!(hits.is_empty());

    let relaxed = harness.service.search("query", 5, 0.6).await.unwrap();
    assert_eq!(relaxed.len(), 1);
    assert_eq!(relaxed[0].filename, "near.txt");
    assert_eq!(relaxed[0].score, 0.6667);
}

/// The threshold is checked before rounding: a raw score of 0.49997
/// (distance 1.0001) is dropped at 0.5 even though it reports as 0.5.
#[tokio::test]
async fn test_threshold_uses_unrounded_score() {
    let embedder = TableEmbedder::new()
        .with("query", &[0.0, 0.0])
        .with("edge", &[1.0, 0.01]);
    let harness = TestHarness::with_embedder(embedder);
    harness.ingest(&[("edge.txt", "edge")]).await;

    let hits = harness.service.search("query", 5, 0.5).await.unwrap();
    assert!(hits.is_empty());

    let hits = harness.service.search("query", 5, 0.4999).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].filename, "edge.txt");
    assert_eq!(hits[0].score, 0.5);
}

/// No result ever falls below the threshold, and scores never increase.
#[tokio::test]
async fn test_results_respect_threshold_and_order() {
    let embedder = TableEmbedder::new()
        .with("probe", &[0.0, 0.0])
        .with("d0", &[0.0, 0.0])
        .with("d1", &[0.1, 0.0])
        .with("d2", &[0.5, 0.5])
        .with("d3", &[1.0, 0.0])
        .with("d4", &[1.0, 1.0])
        .with("d5", &[2.0, 0.0]);
    let harness = TestHarness::with_embedder(embedder);
    // inserted out of distance order
    harness
        .ingest(&[
            ("5.txt", "d5"),
            ("2.txt", "d2"),
            ("0.txt", "d0"),
            ("4.txt", "d4"),
            ("1.txt", "d1"),
            ("3.txt", "d3"),
        ])
        .await;

    for threshold in [0.0, 0.2, 0.4, 0.5, 0.9, 1.0] {
        let hits = harness.service.search("probe", 10, threshold).await.unwrap();
        assert!(hits.iter().all(|h| h.score >= threshold));
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
        let ranks: Vec<usize> = hits.iter().map(|h| h.rank).collect();
        assert_eq!(ranks, (1..=hits.len()).collect::<Vec<_>>());
    }

    let all = harness.service.search("probe", 10, 0.0).await.unwrap();
    let names: Vec<&str> = all.iter().map(|h| h.filename.as_str()).collect();
    assert_eq!(names, vec!["0.txt", "1.txt", "2.txt", "3.txt", "4.txt", "5.txt"]);
    let scores: Vec<f64> = all.iter().map(|h| h.score).collect();
    assert_eq!(scores, vec![1.0, 0.9901, 0.6667, 0.5, 0.3333, 0.2]);
}

/// `limit` caps the number of candidates.
#[tokio::test]
async fn test_limit_caps_results() {
    let harness = TestHarness::new();
    harness
        .ingest(&[("a", "x"), ("b", "xx"), ("c", "xxx"), ("d", "xxxx")])
        .await;

    let hits = harness.service.search("x", 2, 0.0).await.unwrap();
    let names: Vec<&str> = hits.iter().map(|h| h.filename.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
}

/// Searching an empty store is an empty result, not an error.
#[tokio::test]
async fn test_search_empty_store() {
    let harness = TestHarness::new();
    let hits = harness.service.search("anything", 5, 0.0).await.unwrap();
    assert!(hits.is_empty());
}

/// A store-level record without metadata is reported with defaults.
#[tokio::test]
async fn test_records_without_metadata_use_defaults() {
    let harness = TestHarness::with_embedder(TableEmbedder::new().with("legacy", &[1.0, 1.0]));
    harness
        .store
        .add(
            vec!["legacy".to_string()],
            None,
            Some(vec![Embedding::new(vec![1.0, 1.0])]),
            None,
        )
        .unwrap();

    let files = harness.service.list_files().unwrap();
    assert_eq!(files[0].filename, "(unknown)");
    assert_eq!(files[0].directory, "/");
    assert_eq!(files[0].created_at, "-");

    let hits = harness.service.search("legacy", 1, 0.5).await.unwrap();
    assert_eq!(hits[0].filename, "(unknown)");
    assert_eq!(hits[0].created_at, None);
}

// ===== Score transform =====

#[test]
fn test_transform_bounds_and_monotonicity() {
    assert_eq!(similarity_from_distance(0.0), 1.0);

    let mut previous = similarity_from_distance(0.0);
    let mut d = 0.001f32;
    while d < 1e5 {
        let s = similarity_from_distance(d);
        assert!(s > 0.0 && s <= 1.0);
        assert!(s < previous, "s({}) = {} not below {}", d, s, previous);
        previous = s;
        d *= 1.7;
    }
}

// ===== Directory updates =====

/// Moving doc_0 changes its directory only.
#[tokio::test]
async fn test_update_directory_changes_only_directory() {
    let harness = TestHarness::new();
    harness.ingest(&[("a.txt", "report body"), ("b.txt", "other")]).await;
    let before = harness.service.list_files().unwrap();
    let embedding_before = harness.store.get("doc_0").unwrap().unwrap().embedding;

    let report = harness
        .service
        .update_directories(&[DirectoryUpdate::new("doc_0", "/reports")])
        .unwrap();
    assert!(report.is_complete());

    let after = harness.service.list_files().unwrap();
    assert_eq!(after[0].doc_id, "doc_0");
    assert_eq!(after[0].directory, "/reports");
    assert_eq!(after[0].filename, before[0].filename);
    assert_eq!(after[0].created_at, before[0].created_at);
    assert_eq!(after[1], before[1]);

    let doc = harness.store.get("doc_0").unwrap().unwrap();
    assert_eq!(doc.text, "report body");
    assert_eq!(doc.embedding, embedding_before);

    // still searchable with the same vector
    let hits = harness.service.search("report body", 1, 0.99).await.unwrap();
    assert_eq!(hits[0].filename, "a.txt");
}

/// Failing entries are reported; the rest of the batch is applied.
#[tokio::test]
async fn test_update_directories_partial_failure() {
    let harness = TestHarness::new();
    harness.ingest(&[("a.txt", "a"), ("b.txt", "b")]).await;

    let report = harness
        .service
        .update_directories(&[
            DirectoryUpdate::new("doc_0", "/x"),
            DirectoryUpdate::new("doc_42", "/y"),
            DirectoryUpdate::new("doc_1", "/z"),
        ])
        .unwrap();

    assert_eq!(report.updated, vec!["doc_0", "doc_1"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].doc_id, "doc_42");

    let dirs: Vec<String> = harness
        .service
        .list_files()
        .unwrap()
        .into_iter()
        .map(|f| f.directory)
        .collect();
    assert_eq!(dirs, vec!["/x", "/z"]);
}

// ===== Persistence =====

/// Documents, metadata and the index survive reopening the store.
#[tokio::test]
async fn test_store_survives_reopen() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("chroma");

    {
        let store = VectorStore::open(StoreConfig::new(&path)).unwrap();
        let mut metadata = rag_types::Metadata::new();
        metadata.insert("filename".to_string(), "a.txt".into());
        store
            .add(
                vec!["persisted".to_string()],
                Some(vec![metadata]),
                Some(vec![Embedding::new(vec![1.0, 2.0])]),
                None,
            )
            .unwrap();
    }

    let store = VectorStore::open(StoreConfig::new(&path)).unwrap();
    assert_eq!(store.count().unwrap(), 1);
    let hits = store.query(&Embedding::new(vec![1.0, 2.0]), 1).unwrap();
    assert_eq!(hits[0].text, "persisted");
    assert_eq!(hits[0].distance, 0.0);
}
