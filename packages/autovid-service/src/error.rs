pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Forbidden: {message}")]
	Forbidden { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Conflict: {message}")]
	Conflict { message: String },
	#[error("Configuration error: {message}")]
	Config { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<autovid_storage::Error> for Error {
	fn from(err: autovid_storage::Error) -> Self {
		match err {
			autovid_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			autovid_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
		}
	}
}

impl From<autovid_providers::Error> for Error {
	fn from(err: autovid_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
