use serde::Deserialize;

pub const DEFAULT_MAX_RESULTS: u32 = 100;
pub const DEFAULT_MIN_RANK: f32 = 0.001;
pub const DEFAULT_FRESHNESS_TAG: &str = "new";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub ingestion: Ingestion,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
	/// Upper bound for a single storage call before it is reported as a timeout.
	#[serde(default = "default_query_timeout_ms")]
	pub query_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	/// Maximum number of results returned for one query.
	pub max_results: u32,
	/// Term matches scoring at or below this value are discarded.
	pub min_rank: f32,
}
impl Default for Search {
	fn default() -> Self {
		Self { max_results: DEFAULT_MAX_RESULTS, min_rank: DEFAULT_MIN_RANK }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Ingestion {
	pub freshness_tag: String,
}
impl Default for Ingestion {
	fn default() -> Self {
		Self { freshness_tag: DEFAULT_FRESHNESS_TAG.to_string() }
	}
}

fn default_query_timeout_ms() -> u64 {
	5_000
}
