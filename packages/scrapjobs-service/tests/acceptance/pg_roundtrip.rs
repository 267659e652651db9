use scrapjobs_service::{
	BatchSource, IngestOptions, ScrapjobsService, SearchRequest, SourceBatch,
};
use scrapjobs_storage::db::Db;
use scrapjobs_testkit::TestDatabase;

use super::{job, tags, test_config};

struct Listings;

impl BatchSource for Listings {
	fn describe(&self) -> String {
		"listings".to_string()
	}

	fn read(&self) -> scrapjobs_service::Result<SourceBatch> {
		Ok(SourceBatch {
			records: vec![
				job("https://jobs.test/1", "Backend engineer", "Rust services on Postgres", &[
					"remote",
				]),
				job("https://jobs.test/2", "Analyst", "Spreadsheets and reporting", &["onsite"]),
			],
			skipped: Vec::new(),
		})
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SCRAPJOBS_PG_DSN to run."]
async fn ingested_jobs_are_searchable() {
	let Some(base_dsn) = scrapjobs_testkit::env_dsn() else {
		eprintln!("Skipping ingested_jobs_are_searchable; set SCRAPJOBS_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let mut cfg = test_config();

	cfg.storage.postgres.dsn = test_db.dsn().to_string();

	let db = Db::connect(&cfg.storage.postgres).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let service = ScrapjobsService::new(cfg, db);
	let options = IngestOptions { dry_run: false, ..Default::default() };
	let first = service.ingest(&Listings, options).await.expect("Failed to ingest.");
	let second = service.ingest(&Listings, options).await.expect("Failed to re-ingest.");

	assert_eq!((first.inserted, first.updated), (2, 0));
	assert_eq!((second.inserted, second.updated), (0, 2));

	let by_text =
		service.search(SearchRequest::new("rust")).await.expect("Failed to search by text.");

	assert_eq!(by_text.len(), 1);
	assert_eq!(by_text[0].url, "https://jobs.test/1");
	assert!(by_text[0].rank > 0.001);
	assert!(by_text[0].headline.contains("<b>"));

	let by_tag =
		service.search(SearchRequest::new("#onsite")).await.expect("Failed to search by tag.");

	assert_eq!(by_tag.len(), 1);
	assert_eq!(by_tag[0].tags, tags(&["onsite"]));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
