use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::{HeaderMap, StatusCode, header},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use autovid_service::{Error, ListingRequest, ListingResponse, RefreshRequest, RefreshResponse};

use crate::state::AppState;

pub const HEADER_OPERATOR_ID: &str = "x-operator-id";

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
	pub limit: Option<u32>,
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
			Error::InvalidRequest { message } =>
				ApiError::new(StatusCode::BAD_REQUEST, "invalid_request", message),
			Error::Forbidden { message } => ApiError::new(StatusCode::FORBIDDEN, "forbidden", message),
			Error::NotFound { message } => ApiError::new(StatusCode::NOT_FOUND, "not_found", message),
			Error::Conflict { message } => ApiError::new(StatusCode::CONFLICT, "conflict", message),
			err @ (Error::Config { .. } | Error::Provider { .. } | Error::Storage { .. }) => {
				tracing::error!(error = %err, "Request failed.");

				ApiError::new(
					StatusCode::INTERNAL_SERVER_ERROR,
					"internal_error",
					"Internal error.",
				)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/autos/{id_auto}/videos", get(list_videos))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/autos/{id_auto}/videos/refresh", post(refresh_videos))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn list_videos(
	State(state): State<AppState>,
	Path(id_auto): Path<i64>,
	Query(query): Query<ListQuery>,
) -> Result<Json<ListingResponse>, ApiError> {
	let response = state.service.list_videos(ListingRequest { id_auto, limit: query.limit }).await?;

	Ok(Json(response))
}

async fn refresh_videos(
	State(state): State<AppState>,
	Path(id_auto): Path<i64>,
	headers: HeaderMap,
) -> Result<Json<RefreshResponse>, ApiError> {
	let is_admin = match (state.admin_token(), bearer_token(&headers)) {
		(Some(expected), Some(provided)) => expected == provided,
		_ => false,
	};
	let operator_id = header_value(&headers, HEADER_OPERATOR_ID);

	if !is_admin && operator_id.is_none() {
		return Err(ApiError::new(
			StatusCode::FORBIDDEN,
			"forbidden",
			"Refresh requires the admin token or an operator identity.",
		));
	}

	let req = RefreshRequest { id_auto, is_admin, operator_id };
	let response = state.service.refresh_auto(req, OffsetDateTime::now_utc()).await?;

	Ok(Json(response))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
	let raw = header_value(headers, header::AUTHORIZATION.as_str())?;
	let token = raw.strip_prefix("Bearer ")?.trim();

	if token.is_empty() { None } else { Some(token.to_string()) }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
	let raw = headers.get(name)?.to_str().ok()?.trim();

	if raw.is_empty() { None } else { Some(raw.to_string()) }
}

#[cfg(test)]
mod tests {
	use axum::http::HeaderValue;

	use super::*;

	#[test]
	fn bearer_token_requires_the_scheme() {
		let mut headers = HeaderMap::new();

		headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer  secret "));

		assert_eq!(bearer_token(&headers).as_deref(), Some("secret"));

		headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic secret"));

		assert!(bearer_token(&headers).is_none());

		headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));

		assert!(bearer_token(&headers).is_none());
	}

	#[test]
	fn blank_operator_header_counts_as_missing() {
		let mut headers = HeaderMap::new();

		headers.insert(HEADER_OPERATOR_ID, HeaderValue::from_static("  "));

		assert!(header_value(&headers, HEADER_OPERATOR_ID).is_none());
	}
}
