use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use torque_service::{AdvisorReply, Error};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
	/// Omit to start a new conversation.
	#[serde(default)]
	pub conversation_id: Option<Uuid>,
	pub query: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
	pub conversation_id: Uuid,
	#[serde(flatten)]
	pub reply: AdvisorReply,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
	pub conversation_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
	pub conversation_id: Uuid,
	pub cleared: bool,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: &'static str,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code, message: message.into(), fields }
	}
}

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		let message = err.to_string();

		match err {
			Error::InvalidRequest { .. } => Self::new(
				StatusCode::BAD_REQUEST,
				"INVALID_REQUEST",
				message,
				Some(vec!["$.query".to_string()]),
			),
			Error::Timeout { .. } =>
				Self::new(StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT", message, None),
			Error::Unavailable { .. } =>
				Self::new(StatusCode::SERVICE_UNAVAILABLE, "UPSTREAM_UNAVAILABLE", message, None),
			Error::Rejected { .. } | Error::Empty { .. } =>
				Self::new(StatusCode::BAD_GATEWAY, "UPSTREAM_FAILED", message, None),
			Error::Query { .. } =>
				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "GRAPH_QUERY_FAILED", message, None),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody {
			error_code: self.error_code.to_string(),
			message: self.message,
			fields: self.fields,
		};

		(self.status, Json(body)).into_response()
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/advisor/ask", post(ask))
		.route("/v1/advisor/reset", post(reset))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn ask(
	State(state): State<AppState>,
	Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
	// Reject before a conversation is allocated for the request.
	if payload.query.trim().is_empty() {
		return Err(Error::InvalidRequest { message: "query must be non-empty.".to_string() }.into());
	}

	let conversation_id = payload.conversation_id.unwrap_or_else(Uuid::new_v4);
	let conversation = state.conversation(conversation_id);
	let mut conversation = conversation.lock().await;
	let reply = state.service.ask(&mut conversation, &payload.query).await?;

	tracing::debug!(%conversation_id, turns = conversation.len(), "Advisor turn served.");

	Ok(Json(AskResponse { conversation_id, reply }))
}

async fn reset(
	State(state): State<AppState>,
	Json(payload): Json<ResetRequest>,
) -> Json<ResetResponse> {
	let cleared = state.reset(payload.conversation_id);

	Json(ResetResponse { conversation_id: payload.conversation_id, cleared })
}
