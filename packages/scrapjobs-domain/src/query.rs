use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Tokens starting with this character are tag filters rather than search terms.
pub const TAG_PREFIX: char = '#';

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
	pub terms: Vec<String>,
	pub tags: BTreeSet<String>,
}
impl SearchQuery {
	pub fn is_empty(&self) -> bool {
		self.terms.is_empty() && self.tags.is_empty()
	}

	/// Terms joined back into the free-text form handed to the text ranker.
	pub fn text(&self) -> String {
		self.terms.join(" ")
	}

	pub fn tag_list(&self) -> Vec<String> {
		self.tags.iter().cloned().collect()
	}

	pub fn mode(&self) -> RankingMode {
		RankingMode::select(!self.terms.is_empty(), !self.tags.is_empty())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
	/// Nothing to match; storage is never consulted.
	None,
	TagsOnly,
	TermsOnly,
	TermsAndTags,
}
impl RankingMode {
	pub fn select(has_terms: bool, has_tags: bool) -> Self {
		match (has_terms, has_tags) {
			(false, false) => Self::None,
			(false, true) => Self::TagsOnly,
			(true, false) => Self::TermsOnly,
			(true, true) => Self::TermsAndTags,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::TagsOnly => "tags_only",
			Self::TermsOnly => "terms_only",
			Self::TermsAndTags => "terms_and_tags",
		}
	}

	pub fn uses_text_rank(self) -> bool {
		matches!(self, Self::TermsOnly | Self::TermsAndTags)
	}
}

/// Splits a raw query on whitespace into search terms and `#tag` filters and picks the
/// ranking mode for the result. Never fails; an empty or blank input plans to
/// [`RankingMode::None`].
pub fn plan(raw: &str) -> (SearchQuery, RankingMode) {
	let mut query = SearchQuery::default();

	for token in raw.split_whitespace() {
		match token.strip_prefix(TAG_PREFIX) {
			Some(tag) => {
				query.tags.insert(tag.to_string());
			},
			None => query.terms.push(token.to_string()),
		}
	}

	let mode = query.mode();

	(query, mode)
}
