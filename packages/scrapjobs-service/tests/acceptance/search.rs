use std::{sync::Arc, time::Duration};

use super::{MemoryStore, job, service_with, tags, test_config};
use scrapjobs_service::{Error, ScrapjobsService, SearchRequest, TAGS_ONLY_RANK};
use scrapjobs_storage::models::SearchRow;

fn catalog() -> MemoryStore {
	MemoryStore::with_jobs(vec![
		job("https://jobs.test/1", "Backend engineer", "Rust and Postgres services", &[
			"remote", "rust",
		]),
		job("https://jobs.test/2", "Frontend engineer", "TypeScript dashboards", &["remote"]),
		job("https://jobs.test/3", "Platform engineer", "Rust tooling for Kubernetes", &[
			"rust", "onsite",
		]),
	])
}

#[tokio::test]
async fn blank_or_absent_query_returns_nothing_without_touching_storage() {
	let store = Arc::new(catalog());
	let service = service_with(store.clone());

	for req in [SearchRequest::default(), SearchRequest::new(""), SearchRequest::new("   \t ")] {
		let results = service.search(req).await.expect("Failed to run search.");

		assert!(results.is_empty());
	}

	assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn tags_only_query_returns_jobs_carrying_every_tag() {
	let store = Arc::new(catalog());
	let service = service_with(store.clone());
	let results = service
		.search(SearchRequest::new("#rust #remote"))
		.await
		.expect("Failed to run search.");

	assert_eq!(results.len(), 1);
	assert_eq!(results[0].url, "https://jobs.test/1");
	assert_eq!(results[0].rank, TAGS_ONLY_RANK);
	assert_eq!(results[0].headline, "");
	assert!(results[0].tags.is_superset(&tags(&["rust", "remote"])));
	assert_eq!(store.calls(), 1);
}

#[tokio::test]
async fn terms_only_query_orders_by_rank() {
	let service = service_with(Arc::new(catalog()));
	let results = service
		.search(SearchRequest::new("rust kubernetes"))
		.await
		.expect("Failed to run search.");
	let urls = results.iter().map(|result| result.url.as_str()).collect::<Vec<_>>();

	assert_eq!(urls, vec!["https://jobs.test/3", "https://jobs.test/1"]);
	assert!(results[0].rank > results[1].rank);
	assert!(!results[0].headline.is_empty());
}

#[tokio::test]
async fn terms_and_tags_query_filters_text_matches_by_tag() {
	let service = service_with(Arc::new(catalog()));
	let results =
		service.search(SearchRequest::new("rust #remote")).await.expect("Failed to run search.");

	assert_eq!(results.len(), 1);
	assert_eq!(results[0].url, "https://jobs.test/1");
	assert!(results[0].tags.contains("remote"));
}

#[tokio::test]
async fn low_ranked_rows_are_cut_and_results_capped() {
	let store = MemoryStore::new();
	let mut rows = (0..150)
		.map(|i| SearchRow {
			title: format!("Job {i}"),
			tags: vec!["remote".to_string()],
			url: format!("https://jobs.test/{i}"),
			rank: if i % 3 == 0 { 0.0005 } else { 0.5 },
			headline: String::new(),
		})
		.collect::<Vec<_>>();

	rows.push(SearchRow {
		title: "Best".to_string(),
		tags: Vec::new(),
		url: "https://jobs.test/best".to_string(),
		rank: 0.9,
		headline: String::new(),
	});

	*store.canned.lock().expect("Failed to lock canned rows.") = Some(rows);

	let service = service_with(Arc::new(store));
	let results = service.search(SearchRequest::new("rust")).await.expect("Failed to run search.");

	assert_eq!(results.len(), 100);
	assert_eq!(results[0].url, "https://jobs.test/best");
	assert!(results.iter().all(|result| result.rank > 0.001));
	assert!(results.windows(2).all(|pair| pair[0].rank >= pair[1].rank));
}

#[tokio::test]
async fn storage_failure_surfaces_as_storage_error() {
	let store = MemoryStore { fail_after_writes: Some(0), ..Default::default() };
	let service = service_with(Arc::new(store));
	let err =
		service.search(SearchRequest::new("rust")).await.expect_err("Expected storage failure.");

	assert!(matches!(err, Error::Storage { .. }), "Unexpected error: {err:?}");
	assert!(err.is_store_failure());
}

#[tokio::test]
async fn slow_storage_times_out() {
	let mut cfg = test_config();

	cfg.storage.postgres.query_timeout_ms = 20;

	let store = MemoryStore { delay: Some(Duration::from_millis(500)), ..catalog() };
	let service = ScrapjobsService::with_store(cfg, Arc::new(store));
	let err =
		service.search(SearchRequest::new("#rust")).await.expect_err("Expected a timeout.");

	assert!(
		matches!(err, Error::Timeout { operation: "search_tags", timeout_ms: 20 }),
		"Unexpected error: {err:?}"
	);
}

#[tokio::test]
async fn handle_decodes_payload_before_searching() {
	let store = Arc::new(catalog());
	let service = service_with(store.clone());
	let results = service.handle(r##"{"query":"#onsite"}"##).await.expect("Failed to handle.");

	assert_eq!(results.len(), 1);
	assert_eq!(results[0].url, "https://jobs.test/3");

	let err = service.handle("[1, 2").await.expect_err("Expected a decode failure.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
	assert!(!err.is_store_failure());
	assert_eq!(store.calls(), 1);
}
