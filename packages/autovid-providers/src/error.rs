pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error("{endpoint} returned HTTP {status}.")]
	Status { endpoint: &'static str, status: reqwest::StatusCode },
	#[error("{message}")]
	InvalidRequest { message: String },
}
