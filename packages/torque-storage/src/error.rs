#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error("Graph query {query} failed with {code}: {message}")]
	Query { query: &'static str, code: String, message: String },
	#[error("Invalid graph response: {0}")]
	InvalidResponse(String),
}
impl Error {
	/// The store understood the request and rejected the statement itself.
	pub fn is_statement_error(&self) -> bool {
		match self {
			Self::Query { code, .. } =>
				code.starts_with("Neo.ClientError.") && !code.starts_with("Neo.ClientError.Security."),
			_ => false,
		}
	}

	pub fn is_transient(&self) -> bool {
		match self {
			Self::Reqwest(err) =>
				err.is_connect()
					|| err.is_timeout()
					|| err.is_request()
					|| err.status().is_some_and(|status| status.is_server_error()),
			Self::Query { code, .. } => code.starts_with("Neo.TransientError."),
			_ => false,
		}
	}
}
