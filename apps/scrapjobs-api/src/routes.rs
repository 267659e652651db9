use axum::{
	Json, Router,
	extract::{State, WebSocketUpgrade},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use crate::{live::WsChannel, state::AppState};
use scrapjobs_service::{Error, ResultRecord};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/ping", get(ping))
		.route("/jobs", post(search_jobs))
		.route("/ws/server", get(live_search))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn ping() -> &'static str {
	"pong"
}

async fn search_jobs(
	State(state): State<AppState>,
	body: String,
) -> Result<Json<Vec<ResultRecord>>, ApiError> {
	let results = state.service.handle(&body).await?;

	Ok(Json(results))
}

async fn live_search(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
	ws.on_upgrade(move |socket| async move {
		let mut channel = WsChannel::new(socket);
		let summary = state.service.serve_channel(&mut channel).await;

		if summary.reason.is_failure() {
			tracing::warn!(
				queries_served = summary.queries_served,
				reason = ?summary.reason,
				"Live search channel ended with a failure."
			);
		}

		channel.close().await;
	})
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } | Error::Source { message } =>
				ApiError::new(StatusCode::BAD_REQUEST, "invalid_request", message),
			Error::Storage { message } =>
				ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "storage_error", message),
			err @ Error::Timeout { .. } =>
				ApiError::new(StatusCode::GATEWAY_TIMEOUT, "storage_timeout", err.to_string()),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
