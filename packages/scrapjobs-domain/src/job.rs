use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// One job listing as produced by the scrapers. `url` is the natural key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
	pub title: String,
	pub descrip: String,
	pub url: String,
	#[serde(default)]
	pub tags: BTreeSet<String>,
	#[serde(default)]
	pub metadata: BTreeMap<String, String>,
}
impl JobRecord {
	/// Reason the record cannot be stored, if any.
	pub fn defect(&self) -> Option<&'static str> {
		if self.url.trim().is_empty() {
			return Some("url is empty");
		}
		if self.title.trim().is_empty() {
			return Some("title is empty");
		}

		None
	}
}

/// Adds the freshness tag. Returns false when it was already present.
pub fn mark_fresh(tags: &mut BTreeSet<String>, freshness_tag: &str) -> bool {
	tags.insert(freshness_tag.to_string())
}

/// Copy of `tags` without the freshness tag.
pub fn strip_fresh(tags: &BTreeSet<String>, freshness_tag: &str) -> BTreeSet<String> {
	tags.iter().filter(|tag| tag.as_str() != freshness_tag).cloned().collect()
}
