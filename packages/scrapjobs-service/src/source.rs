use std::{
	fs,
	path::{Path, PathBuf},
};

use serde_json::Value;

use crate::{Error, Result};
use scrapjobs_domain::JobRecord;

/// Where an ingestion run reads its job records from.
pub trait BatchSource
where
	Self: Send + Sync,
{
	fn describe(&self) -> String;

	/// Reads every record. Unreadable individual records land in
	/// [`SourceBatch::skipped`]; an error means the source as a whole is unusable.
	fn read(&self) -> Result<SourceBatch>;
}

#[derive(Debug, Default)]
pub struct SourceBatch {
	pub records: Vec<JobRecord>,
	pub skipped: Vec<SkippedRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedRecord {
	pub origin: String,
	pub reason: String,
}

/// A directory holding one JSON-encoded record per `*.json` file.
#[derive(Clone, Debug)]
pub struct DirectorySource {
	dir: PathBuf,
}
impl DirectorySource {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}
}

impl BatchSource for DirectorySource {
	fn describe(&self) -> String {
		format!("directory {}", self.dir.display())
	}

	fn read(&self) -> Result<SourceBatch> {
		let entries = fs::read_dir(&self.dir).map_err(|err| Error::Source {
			message: format!("Failed to read directory {}: {err}.", self.dir.display()),
		})?;
		let mut paths = Vec::new();

		for entry in entries {
			let entry = entry.map_err(|err| Error::Source {
				message: format!("Failed to list directory {}: {err}.", self.dir.display()),
			})?;
			let path = entry.path();

			if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
				paths.push(path);
			}
		}

		paths.sort();

		let mut batch = SourceBatch::default();

		for path in paths {
			match read_record_file(&path) {
				Ok(record) => batch.records.push(record),
				Err(reason) => batch
					.skipped
					.push(SkippedRecord { origin: path.display().to_string(), reason }),
			}
		}

		Ok(batch)
	}
}

/// A single JSON array holding either record objects or paths of per-record files.
/// Relative paths resolve against `base_dir`.
#[derive(Clone, Debug)]
pub struct PayloadSource {
	payload: Vec<u8>,
	base_dir: PathBuf,
}
impl PayloadSource {
	pub fn new(payload: Vec<u8>, base_dir: impl Into<PathBuf>) -> Self {
		Self { payload, base_dir: base_dir.into() }
	}
}

impl BatchSource for PayloadSource {
	fn describe(&self) -> String {
		format!("payload of {} bytes", self.payload.len())
	}

	fn read(&self) -> Result<SourceBatch> {
		let items: Vec<Value> = serde_json::from_slice(&self.payload).map_err(|err| {
			Error::Source { message: format!("Batch payload must be a JSON array: {err}.") }
		})?;
		let mut batch = SourceBatch::default();

		for (index, item) in items.into_iter().enumerate() {
			let decoded = match item {
				Value::String(path) => {
					let path = self.base_dir.join(path);

					read_record_file(&path).map_err(|reason| (path.display().to_string(), reason))
				},
				Value::Object(_) => serde_json::from_value::<JobRecord>(item)
					.map_err(|err| (format!("payload[{index}]"), err.to_string())),
				other => Err((
					format!("payload[{index}]"),
					format!("expected a record object or a file path, found {other}"),
				)),
			};

			match decoded {
				Ok(record) => batch.records.push(record),
				Err((origin, reason)) => batch.skipped.push(SkippedRecord { origin, reason }),
			}
		}

		Ok(batch)
	}
}

fn read_record_file(path: &Path) -> Result<JobRecord, String> {
	let bytes = fs::read(path).map_err(|err| err.to_string())?;

	serde_json::from_slice(&bytes).map_err(|err| err.to_string())
}
