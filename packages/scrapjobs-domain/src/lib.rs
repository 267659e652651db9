pub mod job;
pub mod query;

pub use job::{JobRecord, mark_fresh, strip_fresh};
pub use query::{RankingMode, SearchQuery, TAG_PREFIX, plan};
