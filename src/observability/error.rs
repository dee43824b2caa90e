//! Failure taxonomy for dependency-model requests.

use thiserror::Error;

/// Why a dependency-model fetch did not produce a graph.
///
/// Every variant surfaces to the user as the same "failed to load" notification;
/// the distinction only matters for logs.
#[derive(Debug, Error)]
pub enum FetchError {
	/// The request never produced a response (network failure, CORS, aborted body read).
	#[error("request failed: {0}")]
	Transport(String),
	/// The API answered with a non-success status.
	#[error("observability API responded with HTTP {0}")]
	Status(u16),
	/// The body was not a dependency model.
	#[error("malformed dependency model: {0}")]
	Payload(#[from] serde_json::Error),
	/// The configured base URL cannot carry a path.
	#[error("cannot build a request path on {0}")]
	BaseUrl(String),
}
