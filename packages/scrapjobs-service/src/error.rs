pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Storage call {operation} timed out after {timeout_ms} ms.")]
	Timeout { operation: &'static str, timeout_ms: u64 },
	#[error("Source error: {message}")]
	Source { message: String },
}
impl Error {
	/// True for failures of the backing store, including timeouts.
	pub fn is_store_failure(&self) -> bool {
		matches!(self, Self::Storage { .. } | Self::Timeout { .. })
	}
}

impl From<scrapjobs_storage::Error> for Error {
	fn from(err: scrapjobs_storage::Error) -> Self {
		match err {
			scrapjobs_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			scrapjobs_storage::Error::InvalidArgument(message) => Self::Storage { message },
		}
	}
}
