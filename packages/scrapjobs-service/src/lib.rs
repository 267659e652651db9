pub mod ingest;
pub mod live;
pub mod search;
pub mod source;

mod error;

pub use error::{Error, Result};
pub use ingest::{IngestOptions, IngestionFailure, IngestionReport};
pub use live::{ChannelError, ChannelState, ChannelSummary, CloseReason, QueryChannel};
pub use search::{ResultRecord, SearchRequest, TAGS_ONLY_RANK};
pub use source::{BatchSource, DirectorySource, PayloadSource, SkippedRecord, SourceBatch};

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use scrapjobs_config::Config;
use scrapjobs_domain::JobRecord;
use scrapjobs_storage::{
	db::Db,
	models::{JobRow, JobWrite, SearchRow},
	queries,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type StoreResult<T> = scrapjobs_storage::Result<T>;

/// Storage capability consumed by search and ingestion. Implementations must be safe to
/// share between concurrent requests.
pub trait JobStore
where
	Self: Send + Sync,
{
	/// Jobs whose tag set contains every tag in `tags`.
	fn search_tags<'a>(
		&'a self,
		tags: &'a [String],
		limit: u32,
	) -> BoxFuture<'a, StoreResult<Vec<SearchRow>>>;

	/// Jobs whose description matches `text`, ranked and highlighted by the store.
	fn search_terms<'a>(
		&'a self,
		text: &'a str,
		min_rank: f32,
		limit: u32,
	) -> BoxFuture<'a, StoreResult<Vec<SearchRow>>>;

	fn search_terms_and_tags<'a>(
		&'a self,
		text: &'a str,
		tags: &'a [String],
		min_rank: f32,
		limit: u32,
	) -> BoxFuture<'a, StoreResult<Vec<SearchRow>>>;

	/// False until the schema has been bootstrapped.
	fn jobs_table_exists(&self) -> BoxFuture<'_, StoreResult<bool>>;

	fn find_job<'a>(&'a self, url: &'a str) -> BoxFuture<'a, StoreResult<Option<JobRecord>>>;

	/// Returns false when a job with the same url already exists.
	fn insert_job<'a>(&'a self, job: &'a JobRecord) -> BoxFuture<'a, StoreResult<bool>>;

	/// Returns false when no job has the url.
	fn update_job<'a>(&'a self, job: &'a JobRecord) -> BoxFuture<'a, StoreResult<bool>>;

	fn count_jobs(&self) -> BoxFuture<'_, StoreResult<u64>>;

	fn count_tagged<'a>(&'a self, tag: &'a str) -> BoxFuture<'a, StoreResult<u64>>;

	fn truncate_jobs(&self) -> BoxFuture<'_, StoreResult<u64>>;

	fn strip_tag<'a>(&'a self, tag: &'a str) -> BoxFuture<'a, StoreResult<u64>>;
}

/// [`JobStore`] backed by the Postgres `jobs` table.
pub struct PgJobStore {
	db: Db,
}
impl PgJobStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}
}

impl JobStore for PgJobStore {
	fn search_tags<'a>(
		&'a self,
		tags: &'a [String],
		limit: u32,
	) -> BoxFuture<'a, StoreResult<Vec<SearchRow>>> {
		Box::pin(queries::search_tags(&self.db, tags, i64::from(limit)))
	}

	fn search_terms<'a>(
		&'a self,
		text: &'a str,
		min_rank: f32,
		limit: u32,
	) -> BoxFuture<'a, StoreResult<Vec<SearchRow>>> {
		Box::pin(queries::search_terms(&self.db, text, min_rank, i64::from(limit)))
	}

	fn search_terms_and_tags<'a>(
		&'a self,
		text: &'a str,
		tags: &'a [String],
		min_rank: f32,
		limit: u32,
	) -> BoxFuture<'a, StoreResult<Vec<SearchRow>>> {
		Box::pin(queries::search_terms_and_tags(&self.db, text, tags, min_rank, i64::from(limit)))
	}

	fn jobs_table_exists(&self) -> BoxFuture<'_, StoreResult<bool>> {
		Box::pin(queries::jobs_table_exists(&self.db))
	}

	fn find_job<'a>(&'a self, url: &'a str) -> BoxFuture<'a, StoreResult<Option<JobRecord>>> {
		Box::pin(async move { Ok(queries::find_job(&self.db, url).await?.map(job_from_row)) })
	}

	fn insert_job<'a>(&'a self, job: &'a JobRecord) -> BoxFuture<'a, StoreResult<bool>> {
		Box::pin(async move {
			let tags = job.tags.iter().cloned().collect::<Vec<_>>();

			queries::insert_job(&self.db, job_write(job, &tags)).await
		})
	}

	fn update_job<'a>(&'a self, job: &'a JobRecord) -> BoxFuture<'a, StoreResult<bool>> {
		Box::pin(async move {
			let tags = job.tags.iter().cloned().collect::<Vec<_>>();

			queries::update_job(&self.db, job_write(job, &tags)).await
		})
	}

	fn count_jobs(&self) -> BoxFuture<'_, StoreResult<u64>> {
		Box::pin(queries::count_jobs(&self.db))
	}

	fn count_tagged<'a>(&'a self, tag: &'a str) -> BoxFuture<'a, StoreResult<u64>> {
		Box::pin(queries::count_tagged(&self.db, tag))
	}

	fn truncate_jobs(&self) -> BoxFuture<'_, StoreResult<u64>> {
		Box::pin(queries::truncate_jobs(&self.db))
	}

	fn strip_tag<'a>(&'a self, tag: &'a str) -> BoxFuture<'a, StoreResult<u64>> {
		Box::pin(queries::strip_tag(&self.db, tag))
	}
}

pub struct ScrapjobsService {
	pub cfg: Config,
	pub store: Arc<dyn JobStore>,
}
impl ScrapjobsService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, store: Arc::new(PgJobStore::new(db)) }
	}

	pub fn with_store(cfg: Config, store: Arc<dyn JobStore>) -> Self {
		Self { cfg, store }
	}

	/// Awaits one storage call under the configured query timeout.
	pub(crate) async fn call_store<T>(
		&self,
		operation: &'static str,
		call: BoxFuture<'_, StoreResult<T>>,
	) -> Result<T> {
		let timeout_ms = self.cfg.storage.postgres.query_timeout_ms;

		match tokio::time::timeout(Duration::from_millis(timeout_ms), call).await {
			Ok(Ok(value)) => Ok(value),
			Ok(Err(err)) => {
				tracing::error!(error = %err, operation, "Storage call failed.");

				Err(err.into())
			},
			Err(_) => {
				tracing::error!(operation, timeout_ms, "Storage call timed out.");

				Err(Error::Timeout { operation, timeout_ms })
			},
		}
	}
}

fn job_write<'a>(job: &'a JobRecord, tags: &'a [String]) -> JobWrite<'a> {
	JobWrite {
		url: job.url.as_str(),
		title: job.title.as_str(),
		descrip: job.descrip.as_str(),
		tags,
		metadata: &job.metadata,
	}
}

fn job_from_row(row: JobRow) -> JobRecord {
	JobRecord {
		title: row.title,
		descrip: row.descrip,
		url: row.url,
		tags: row.tags.into_iter().collect(),
		metadata: row.metadata.0,
	}
}
