pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Index error: {message}")]
	Index { message: String },
}
impl From<fibby_storage::Error> for Error {
	fn from(err: fibby_storage::Error) -> Self {
		match err {
			fibby_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			fibby_storage::Error::InvalidRow(message) => Self::Storage { message },
			fibby_storage::Error::Qdrant(inner) => Self::Index { message: inner.to_string() },
			fibby_storage::Error::InvalidArgument(message) => Self::Index { message },
		}
	}
}

impl From<fibby_providers::Error> for Error {
	fn from(err: fibby_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
