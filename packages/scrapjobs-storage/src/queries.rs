use sqlx::types::Json;

use crate::{
	Result,
	db::Db,
	models::{JobRow, JobWrite, SearchRow},
};

pub async fn search_tags(db: &Db, tags: &[String], limit: i64) -> Result<Vec<SearchRow>> {
	let rows = sqlx::query_as::<_, SearchRow>(
		"\
SELECT
	title,
	tags,
	url,
	1::real AS rank,
	'' AS headline
FROM jobs
WHERE $1::text[] <@ tags
ORDER BY rank DESC
LIMIT $2",
	)
	.bind(tags)
	.bind(limit)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn search_terms(
	db: &Db,
	text: &str,
	min_rank: f32,
	limit: i64,
) -> Result<Vec<SearchRow>> {
	let rows = sqlx::query_as::<_, SearchRow>(
		"\
SELECT
	title,
	tags,
	url,
	ts_rank_cd(descrip_fts, query) AS rank,
	ts_headline('english', descrip, query) AS headline
FROM jobs,
	websearch_to_tsquery('english', $1) query
WHERE descrip_fts @@ query
	AND ts_rank_cd(descrip_fts, query) > $2
ORDER BY rank DESC
LIMIT $3",
	)
	.bind(text)
	.bind(min_rank)
	.bind(limit)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn search_terms_and_tags(
	db: &Db,
	text: &str,
	tags: &[String],
	min_rank: f32,
	limit: i64,
) -> Result<Vec<SearchRow>> {
	let rows = sqlx::query_as::<_, SearchRow>(
		"\
SELECT
	title,
	tags,
	url,
	ts_rank_cd(descrip_fts, query) AS rank,
	ts_headline('english', descrip, query) AS headline
FROM jobs,
	websearch_to_tsquery('english', $1) query
WHERE descrip_fts @@ query
	AND ts_rank_cd(descrip_fts, query) > $2
	AND $3::text[] <@ tags
ORDER BY rank DESC
LIMIT $4",
	)
	.bind(text)
	.bind(min_rank)
	.bind(tags)
	.bind(limit)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn jobs_table_exists(db: &Db) -> Result<bool> {
	let exists: bool = sqlx::query_scalar("SELECT to_regclass('jobs') IS NOT NULL")
		.fetch_one(&db.pool)
		.await?;

	Ok(exists)
}

pub async fn find_job(db: &Db, url: &str) -> Result<Option<JobRow>> {
	let row = sqlx::query_as::<_, JobRow>(
		"\
SELECT url, title, descrip, tags, metadata, created_at, updated_at
FROM jobs
WHERE url = $1",
	)
	.bind(url)
	.fetch_optional(&db.pool)
	.await?;

	Ok(row)
}

pub async fn list_jobs(db: &Db) -> Result<Vec<JobRow>> {
	let rows = sqlx::query_as::<_, JobRow>(
		"\
SELECT url, title, descrip, tags, metadata, created_at, updated_at
FROM jobs
ORDER BY url",
	)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

/// Inserts a new job. Returns false when a job with the same url already exists.
pub async fn insert_job(db: &Db, job: JobWrite<'_>) -> Result<bool> {
	let result = sqlx::query(
		"\
INSERT INTO jobs (url, title, descrip, tags, metadata)
VALUES ($1, $2, $3, $4, $5)
ON CONFLICT (url) DO NOTHING",
	)
	.bind(job.url)
	.bind(job.title)
	.bind(job.descrip)
	.bind(job.tags)
	.bind(Json(job.metadata))
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected() == 1)
}

/// Replaces every mutable column of an existing job. Returns false when no job has the url.
pub async fn update_job(db: &Db, job: JobWrite<'_>) -> Result<bool> {
	let result = sqlx::query(
		"\
UPDATE jobs
SET
	title = $2,
	descrip = $3,
	tags = $4,
	metadata = $5,
	updated_at = now()
WHERE url = $1",
	)
	.bind(job.url)
	.bind(job.title)
	.bind(job.descrip)
	.bind(job.tags)
	.bind(Json(job.metadata))
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected() == 1)
}

pub async fn count_jobs(db: &Db) -> Result<u64> {
	let count: i64 = sqlx::query_scalar("SELECT count(*) FROM jobs").fetch_one(&db.pool).await?;

	Ok(count.max(0) as u64)
}

pub async fn count_tagged(db: &Db, tag: &str) -> Result<u64> {
	let count: i64 = sqlx::query_scalar("SELECT count(*) FROM jobs WHERE $1 = ANY(tags)")
		.bind(tag)
		.fetch_one(&db.pool)
		.await?;

	Ok(count.max(0) as u64)
}

/// Removes every job and returns how many there were.
pub async fn truncate_jobs(db: &Db) -> Result<u64> {
	let mut tx = db.pool.begin().await?;
	let count: i64 = sqlx::query_scalar("SELECT count(*) FROM jobs").fetch_one(&mut *tx).await?;

	sqlx::query("TRUNCATE jobs").execute(&mut *tx).await?;

	tx.commit().await?;

	Ok(count.max(0) as u64)
}

/// Removes `tag` from every job carrying it and returns the number of jobs touched.
pub async fn strip_tag(db: &Db, tag: &str) -> Result<u64> {
	if tag.is_empty() {
		return Err(crate::Error::InvalidArgument("tag must be non-empty.".to_string()));
	}

	let result = sqlx::query(
		"\
UPDATE jobs
SET tags = array_remove(tags, $1)
WHERE $1 = ANY(tags)",
	)
	.bind(tag)
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected())
}
