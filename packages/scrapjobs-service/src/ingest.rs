use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{BatchSource, Error, Result, ScrapjobsService};
use scrapjobs_domain::{JobRecord, mark_fresh, strip_fresh};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOptions {
	/// Delete every stored job before loading.
	pub truncate: bool,
	/// Remove the freshness tag from every stored job before loading.
	pub strip_freshness_tag: bool,
	/// Decide and log everything, write nothing.
	pub dry_run: bool,
}
impl Default for IngestOptions {
	fn default() -> Self {
		Self { truncate: false, strip_freshness_tag: false, dry_run: true }
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
	pub dry_run: bool,
	pub truncated: u64,
	pub freshness_stripped: u64,
	pub inserted: u64,
	pub updated: u64,
	pub skipped_unreadable: u64,
	pub would_truncate: u64,
	pub would_strip: u64,
	pub would_insert: u64,
	pub would_update: u64,
}

/// A run stopped by a fatal error, with the work completed before it.
#[derive(Debug, thiserror::Error)]
#[error("Ingestion aborted: {error}")]
pub struct IngestionFailure {
	pub report: IngestionReport,
	#[source]
	pub error: Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Upsert {
	Insert,
	Update,
}

impl ScrapjobsService {
	pub async fn ingest(
		&self,
		source: &dyn BatchSource,
		options: IngestOptions,
	) -> Result<IngestionReport, IngestionFailure> {
		let mut report = IngestionReport { dry_run: options.dry_run, ..Default::default() };

		tracing::info!(
			source = %source.describe(),
			truncate = options.truncate,
			strip_freshness_tag = options.strip_freshness_tag,
			dry_run = options.dry_run,
			"Starting ingestion."
		);

		match self.run_ingestion(source, options, &mut report).await {
			Ok(()) => {
				tracing::info!(?report, "Ingestion finished.");

				Ok(report)
			},
			Err(error) => {
				tracing::error!(error = %error, ?report, "Ingestion aborted.");

				Err(IngestionFailure { report, error })
			},
		}
	}

	async fn run_ingestion(
		&self,
		source: &dyn BatchSource,
		options: IngestOptions,
		report: &mut IngestionReport,
	) -> Result<()> {
		let freshness_tag = self.cfg.ingestion.freshness_tag.as_str();
		// A dry run decides against the store a real run would see at that point, which holds
		// no jobs after a truncate or before the schema exists.
		let mut assume_empty = false;

		if options.dry_run
			&& !self.call_store("jobs_table_exists", self.store.jobs_table_exists()).await?
		{
			tracing::info!("Dry run: jobs table does not exist yet, treating the store as empty.");

			assume_empty = true;
		}
		if options.truncate {
			if options.dry_run {
				if !assume_empty {
					report.would_truncate =
						self.call_store("count_jobs", self.store.count_jobs()).await?;
				}

				tracing::info!(jobs = report.would_truncate, "Dry run: would truncate jobs.");

				assume_empty = true;
			} else {
				report.truncated =
					self.call_store("truncate_jobs", self.store.truncate_jobs()).await?;

				tracing::info!(jobs = report.truncated, "Truncated jobs.");
			}
		}
		if options.strip_freshness_tag {
			if options.dry_run {
				if !assume_empty {
					report.would_strip = self
						.call_store("count_tagged", self.store.count_tagged(freshness_tag))
						.await?;
				}

				tracing::info!(
					jobs = report.would_strip,
					tag = freshness_tag,
					"Dry run: would strip freshness tag."
				);
			} else {
				report.freshness_stripped =
					self.call_store("strip_tag", self.store.strip_tag(freshness_tag)).await?;

				tracing::info!(
					jobs = report.freshness_stripped,
					tag = freshness_tag,
					"Stripped freshness tag."
				);
			}
		}

		let batch = source.read()?;

		for skipped in &batch.skipped {
			tracing::warn!(
				origin = %skipped.origin,
				reason = %skipped.reason,
				"Skipping unreadable source record."
			);
		}

		report.skipped_unreadable += batch.skipped.len() as u64;

		// Urls a dry run has already decided to insert, so repeats within one batch are
		// reported as updates just like a real run would perform them.
		let mut simulated = HashSet::new();

		for mut record in batch.records {
			if let Some(defect) = record.defect() {
				tracing::warn!(
					url = %record.url,
					reason = defect,
					"Skipping unreadable source record."
				);

				report.skipped_unreadable += 1;

				continue;
			}

			mark_fresh(&mut record.tags, freshness_tag);

			if options.dry_run {
				let exists = simulated.contains(&record.url)
					|| (!assume_empty
						&& self
							.call_store("find_job", self.store.find_job(&record.url))
							.await?
							.is_some());

				if exists {
					report.would_update += 1;

					tracing::info!(url = %record.url, "Dry run: would update job.");
				} else {
					report.would_insert += 1;

					tracing::info!(url = %record.url, "Dry run: would insert job.");

					simulated.insert(record.url.clone());
				}

				continue;
			}

			match self.upsert(record, freshness_tag).await? {
				Some(Upsert::Insert) => report.inserted += 1,
				Some(Upsert::Update) => report.updated += 1,
				None => {},
			}
		}

		Ok(())
	}

	/// Inserts a fresh record or replaces an existing one. Replacements lose the freshness
	/// tag: only records first seen in this run count as new.
	async fn upsert(&self, mut record: JobRecord, freshness_tag: &str) -> Result<Option<Upsert>> {
		let existing = self.call_store("find_job", self.store.find_job(&record.url)).await?;

		if existing.is_none() {
			if self.call_store("insert_job", self.store.insert_job(&record)).await? {
				tracing::info!(url = %record.url, title = %record.title, "Inserted job.");

				return Ok(Some(Upsert::Insert));
			}

			// Another writer inserted the url after the lookup; replace its row instead.
		}

		record.tags = strip_fresh(&record.tags, freshness_tag);

		if self.call_store("update_job", self.store.update_job(&record)).await? {
			tracing::info!(url = %record.url, title = %record.title, "Updated job.");

			return Ok(Some(Upsert::Update));
		}

		tracing::warn!(url = %record.url, "Job disappeared before it could be updated.");

		Ok(None)
	}
}
