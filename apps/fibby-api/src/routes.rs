use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use fibby_domain::retrieval::RetrievalResult;
use fibby_service::{DEFAULT_MAX_CHUNKS, Error as ServiceError, RefreshReport, Status};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/retrieval/refresh", post(refresh))
		.route("/v1/retrieval/refresh_all", post(refresh_all))
		.route("/v1/retrieval/context", post(context))
		.route("/v1/retrieval/search", post(search))
		.route("/v1/retrieval/status", get(status))
		.route("/v1/retrieval/report", get(report))
		.with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
	pub owner: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
	pub owner: String,
	pub refreshed: bool,
	pub update_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
	pub accepted: bool,
}

#[derive(Debug, Deserialize)]
pub struct ContextRequest {
	pub owner: String,
	pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ContextResponse {
	pub context: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
	pub owner: String,
	pub question: String,
	pub max_chunks: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchItem {
	pub id: String,
	pub text: String,
	pub chunk_type: String,
	pub distance: f32,
	pub query: String,
}
impl From<RetrievalResult> for SearchItem {
	fn from(result: RetrievalResult) -> Self {
		Self {
			id: result.id,
			text: result.text,
			chunk_type: result.metadata.chunk_type,
			distance: result.distance,
			query: result.query,
		}
	}
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
	pub items: Vec<SearchItem>,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn refresh(
	State(state): State<AppState>,
	Json(payload): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
	let update_token = state.service.refresh(&payload.owner).await?;

	Ok(Json(RefreshResponse {
		owner: payload.owner,
		refreshed: update_token.is_some(),
		update_token,
	}))
}

async fn refresh_all(State(state): State<AppState>) -> (StatusCode, Json<AcceptedResponse>) {
	let Some(permit) = state.service.try_begin_refresh_all() else {
		return (StatusCode::CONFLICT, Json(AcceptedResponse { accepted: false }));
	};
	let service = state.service.clone();

	tokio::spawn(async move {
		service.refresh_all_with(permit).await;
	});

	(StatusCode::ACCEPTED, Json(AcceptedResponse { accepted: true }))
}

async fn context(
	State(state): State<AppState>,
	Json(payload): Json<ContextRequest>,
) -> Result<Json<ContextResponse>, ApiError> {
	let context = state.service.get_context(&payload.owner, &payload.question).await?;

	Ok(Json(ContextResponse { context }))
}

async fn search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let max_chunks = payload.max_chunks.unwrap_or(DEFAULT_MAX_CHUNKS);
	let results = state.service.retrieve(&payload.owner, &payload.question, max_chunks).await?;

	Ok(Json(SearchResponse { items: results.into_iter().map(SearchItem::from).collect() }))
}

async fn status(State(state): State<AppState>) -> Json<Status> {
	Json(state.service.status().await)
}

async fn report(State(state): State<AppState>) -> Json<RefreshReport> {
	Json(state.service.report().await)
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
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let message = err.to_string();

		match err {
			ServiceError::InvalidRequest { .. } =>
				Self::new(StatusCode::BAD_REQUEST, "invalid_request", message, None),
			ServiceError::Provider { .. } =>
				Self::new(StatusCode::BAD_GATEWAY, "provider_error", message, None),
			ServiceError::Storage { .. } =>
				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", message, None),
			ServiceError::Index { .. } =>
				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "index_error", message, None),
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}
