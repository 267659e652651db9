use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, ScrapjobsService};
use scrapjobs_domain::{RankingMode, SearchQuery, plan};
use scrapjobs_storage::models::SearchRow;

/// Rank given to every tag-only match; there is no text relevance to order by.
pub const TAGS_ONLY_RANK: f32 = 1.0;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchRequest {
	#[serde(default)]
	pub query: Option<String>,
}
impl SearchRequest {
	pub fn new(query: impl Into<String>) -> Self {
		Self { query: Some(query.into()) }
	}

	/// Decodes a `{ "query": "..." }` payload.
	pub fn decode(payload: &str) -> Result<Self> {
		serde_json::from_str(payload).map_err(|err| Error::InvalidRequest {
			message: format!("Search payload is not valid JSON: {err}."),
		})
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultRecord {
	pub title: String,
	pub tags: BTreeSet<String>,
	pub url: String,
	pub rank: f32,
	pub headline: String,
}

impl ScrapjobsService {
	/// One-shot search over an encoded request payload.
	pub async fn handle(&self, payload: &str) -> Result<Vec<ResultRecord>> {
		let req = SearchRequest::decode(payload)?;

		self.search(req).await
	}

	/// Plans the raw query and runs it. An absent or blank query yields no results.
	pub async fn search(&self, req: SearchRequest) -> Result<Vec<ResultRecord>> {
		let (query, mode) = plan(req.query.as_deref().unwrap_or_default());

		self.search_planned(&query, mode).await
	}

	pub async fn search_planned(
		&self,
		query: &SearchQuery,
		mode: RankingMode,
	) -> Result<Vec<ResultRecord>> {
		let limit = self.cfg.search.max_results;
		let min_rank = self.cfg.search.min_rank;

		tracing::debug!(
			mode = mode.as_str(),
			terms = query.terms.len(),
			tags = query.tags.len(),
			"Running search."
		);

		let rows = match mode {
			RankingMode::None => return Ok(Vec::new()),
			RankingMode::TagsOnly => {
				let tags = query.tag_list();

				self.call_store("search_tags", self.store.search_tags(&tags, limit)).await?
			},
			RankingMode::TermsOnly => {
				let text = query.text();

				self.call_store("search_terms", self.store.search_terms(&text, min_rank, limit))
					.await?
			},
			RankingMode::TermsAndTags => {
				let text = query.text();
				let tags = query.tag_list();

				self.call_store(
					"search_terms_and_tags",
					self.store.search_terms_and_tags(&text, &tags, min_rank, limit),
				)
				.await?
			},
		};

		Ok(shape_results(rows, mode, min_rank, limit as usize))
	}
}

/// Normalizes store rows into results ordered by rank, cut off at `min_rank` for text
/// modes and capped at `limit`.
pub(crate) fn shape_results(
	rows: Vec<SearchRow>,
	mode: RankingMode,
	min_rank: f32,
	limit: usize,
) -> Vec<ResultRecord> {
	let mut results = rows
		.into_iter()
		.map(|row| match mode {
			RankingMode::TagsOnly => ResultRecord {
				title: row.title,
				tags: row.tags.into_iter().collect(),
				url: row.url,
				rank: TAGS_ONLY_RANK,
				headline: String::new(),
			},
			_ => ResultRecord {
				title: row.title,
				tags: row.tags.into_iter().collect(),
				url: row.url,
				rank: row.rank,
				headline: row.headline,
			},
		})
		.filter(|result| !mode.uses_text_rank() || result.rank > min_rank)
		.collect::<Vec<_>>();

	// Stable, so ties keep the order the store produced.
	results.sort_by(|a, b| b.rank.total_cmp(&a.rank));
	results.truncate(limit);

	results
}
