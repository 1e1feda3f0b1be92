use std::{sync::Arc, time::Duration};

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt;

use fibby_api::{routes, state::AppState};
use fibby_providers::EmbeddingBackend;
use fibby_service::{RetrievalService, ServiceSettings};
use fibby_testkit::{
	fakes::{InMemoryIndex, StaticSnapshots, keyword_backend},
	fixtures::savings_goals_snapshot,
};

const DIM: usize = 32;

fn state_with(backend: EmbeddingBackend) -> AppState {
	let service = RetrievalService::new(
		backend,
		Arc::new(InMemoryIndex::new("fibby_http")),
		Arc::new(StaticSnapshots::new([savings_goals_snapshot("u1")])),
		ServiceSettings { refresh_all_delay: Duration::ZERO },
	);

	AppState::from_service(service)
}

fn app_with(backend: EmbeddingBackend) -> Router {
	routes::router(state_with(backend))
}

fn app() -> Router {
	app_with(keyword_backend(DIM))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
	let request = Request::builder()
		.method(method)
		.uri(uri)
		.header("content-type", "application/json")
		.body(body.map(|value| Body::from(value.to_string())).unwrap_or_else(Body::empty))
		.expect("Failed to build request.");
	let response = app.clone().oneshot(request).await.expect("Failed to call router.");
	let status = response.status();
	let bytes =
		body::to_bytes(response.into_body(), usize::MAX).await.expect("Failed to read body.");
	let json = if bytes.is_empty() {
		Value::Null
	} else {
		serde_json::from_slice(&bytes).expect("Response must be JSON.")
	};

	(status, json)
}

#[tokio::test]
async fn health_is_ok() {
	let (status, _) = call(&app(), "GET", "/health", None).await;

	assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn refresh_then_context_and_search() {
	let app = app();
	let (status, body) =
		call(&app, "POST", "/v1/retrieval/refresh", Some(serde_json::json!({ "owner": "u1" })))
			.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["refreshed"], true);
	assert!(body["update_token"].as_str().is_some_and(|token| token.starts_with("gen_u1_")));

	let (status, body) = call(
		&app,
		"POST",
		"/v1/retrieval/context",
		Some(serde_json::json!({ "owner": "u1", "question": "How are my savings goals?" })),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert!(body["context"].as_str().is_some_and(|context| context.contains("FINANCIAL GOALS:")));

	let (status, body) = call(
		&app,
		"POST",
		"/v1/retrieval/search",
		Some(serde_json::json!({ "owner": "u1", "question": "goals", "max_chunks": 2 })),
	)
	.await;
	let items = body["items"].as_array().expect("items must be an array.");

	assert_eq!(status, StatusCode::OK);
	assert_eq!(items.len(), 2);
	assert!(items.iter().all(|item| item["id"].as_str().is_some_and(|id| id.starts_with("u1_"))));

	let (_, status_body) = call(&app, "GET", "/v1/retrieval/status", None).await;

	assert_eq!(status_body["retrieval_enabled"], true);
	assert_eq!(status_body["total_tracked_owners"], 1);
	assert_eq!(status_body["total_indexed_documents"], 4);

	let (_, report) = call(&app, "GET", "/v1/retrieval/report", None).await;

	assert_eq!(report["collection"], "fibby_http");
	assert_eq!(report["generations"][0][0], "u1");
}

#[tokio::test]
async fn blank_owner_is_a_bad_request() {
	let (status, body) =
		call(&app(), "POST", "/v1/retrieval/refresh", Some(serde_json::json!({ "owner": " " })))
			.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error_code"], "invalid_request");
}

#[tokio::test]
async fn null_backend_reports_disabled_retrieval() {
	let app = app_with(EmbeddingBackend::null(DIM));
	let (_, body) =
		call(&app, "POST", "/v1/retrieval/refresh", Some(serde_json::json!({ "owner": "u1" })))
			.await;

	assert_eq!(body["refreshed"], false);
	assert_eq!(body["update_token"], Value::Null);

	let (_, status) = call(&app, "GET", "/v1/retrieval/status", None).await;

	assert_eq!(status["retrieval_enabled"], false);
	assert_eq!(status["backend"], "null");
}

#[tokio::test]
async fn refresh_all_is_accepted() {
	let (status, body) = call(&app(), "POST", "/v1/retrieval/refresh_all", None).await;

	assert_eq!(status, StatusCode::ACCEPTED);
	assert_eq!(body["accepted"], true);
}

#[tokio::test]
async fn overlapping_refresh_all_is_rejected() {
	let state = state_with(keyword_backend(DIM));
	let app = routes::router(state.clone());
	let running = state.service.try_begin_refresh_all().expect("Slot must start free.");
	let (status, body) = call(&app, "POST", "/v1/retrieval/refresh_all", None).await;

	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(body["accepted"], false);

	drop(running);

	let (status, body) = call(&app, "POST", "/v1/retrieval/refresh_all", None).await;

	assert_eq!(status, StatusCode::ACCEPTED);
	assert_eq!(body["accepted"], true);
}
