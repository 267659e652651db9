mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, DEFAULT_FRESHNESS_TAG, DEFAULT_MAX_RESULTS, DEFAULT_MIN_RANK, Ingestion, Postgres,
	Search, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.postgres.query_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.query_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_results == 0 {
		return Err(Error::Validation {
			message: "search.max_results must be greater than zero.".to_string(),
		});
	}
	if !cfg.search.min_rank.is_finite() {
		return Err(Error::Validation {
			message: "search.min_rank must be a finite number.".to_string(),
		});
	}
	if cfg.search.min_rank < 0.0 {
		return Err(Error::Validation {
			message: "search.min_rank must be zero or greater.".to_string(),
		});
	}

	let tag = cfg.ingestion.freshness_tag.as_str();

	if tag.is_empty() {
		return Err(Error::Validation {
			message: "ingestion.freshness_tag must be non-empty.".to_string(),
		});
	}
	if tag.starts_with('#') || tag.chars().any(char::is_whitespace) {
		return Err(Error::Validation {
			message: "ingestion.freshness_tag must not start with '#' or contain whitespace."
				.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.http_bind = cfg.service.http_bind.trim().to_string();
	cfg.storage.postgres.dsn = cfg.storage.postgres.dsn.trim().to_string();
	cfg.ingestion.freshness_tag = cfg.ingestion.freshness_tag.trim().to_string();
}
