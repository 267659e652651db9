use std::collections::BTreeMap;

use sqlx::types::Json;
use time::OffsetDateTime;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JobRow {
	pub url: String,
	pub title: String,
	pub descrip: String,
	pub tags: Vec<String>,
	pub metadata: Json<BTreeMap<String, String>>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

/// One ranked match as returned by the search queries.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SearchRow {
	pub title: String,
	pub tags: Vec<String>,
	pub url: String,
	pub rank: f32,
	pub headline: String,
}

/// Column values written by insert and update.
#[derive(Debug, Clone, Copy)]
pub struct JobWrite<'a> {
	pub url: &'a str,
	pub title: &'a str,
	pub descrip: &'a str,
	pub tags: &'a [String],
	pub metadata: &'a BTreeMap<String, String>,
}
