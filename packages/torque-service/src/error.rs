use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Remote collaborator a call was made to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remote {
	Graph,
	Embedding,
	Completion,
}
impl Remote {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Graph => "graph store",
			Self::Embedding => "embedding service",
			Self::Completion => "completion service",
		}
	}
}

impl fmt::Display for Remote {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("The {remote} is unavailable: {message}")]
	Unavailable { remote: Remote, message: String },
	#[error("The {remote} rejected the request: {message}")]
	Rejected { remote: Remote, message: String },
	#[error("The {remote} returned no usable result.")]
	Empty { remote: Remote },
	#[error("Graph query rejected: {message}")]
	Query { message: String },
	#[error("The {remote} did not answer within {timeout_ms} ms.")]
	Timeout { remote: Remote, timeout_ms: u64 },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
}
impl Error {
	/// Only unreachable or slow remotes are worth another attempt.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
	}

	pub fn from_provider(remote: Remote, err: torque_providers::Error) -> Self {
		use torque_providers::Error as ProviderError;

		if err.is_transient() {
			return Self::Unavailable { remote, message: err.to_string() };
		}

		match err {
			ProviderError::InvalidResponse { .. } => Self::Empty { remote },
			ProviderError::InvalidConfig { message } => Self::InvalidRequest { message },
			other => Self::Rejected { remote, message: other.to_string() },
		}
	}
}

impl From<torque_storage::Error> for Error {
	fn from(err: torque_storage::Error) -> Self {
		if err.is_statement_error() {
			return Self::Query { message: err.to_string() };
		}
		if err.is_transient() {
			return Self::Unavailable { remote: Remote::Graph, message: err.to_string() };
		}

		match err {
			torque_storage::Error::InvalidResponse(_) => Self::Empty { remote: Remote::Graph },
			other => Self::Rejected { remote: Remote::Graph, message: other.to_string() },
		}
	}
}
