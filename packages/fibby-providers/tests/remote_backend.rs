use std::net::SocketAddr;

use axum::{Json, Router, routing::post};
use serde_json::{Map, Value};
use tokio::net::TcpListener;

use fibby_config::{EmbeddingProviderConfig, EmbeddingProviders};
use fibby_providers::{BackendKind, select_backend};

async fn spawn_embedding_server(width: usize) -> SocketAddr {
	let app = Router::new().route(
		"/v1/embeddings",
		post(move |Json(body): Json<Value>| async move {
			let inputs = body["input"].as_array().cloned().unwrap_or_default();
			let data: Vec<Value> = inputs
				.iter()
				.enumerate()
				.map(|(index, _)| {
					serde_json::json!({ "index": index, "embedding": vec![0.25_f32; width] })
				})
				.collect();

			Json(serde_json::json!({ "data": data }))
		}),
	);
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind listener.");
	let addr = listener.local_addr().expect("Listener has no address.");

	tokio::spawn(async move {
		axum::serve(listener, app).await.expect("Embedding server failed.");
	});

	addr
}

fn providers(addr: SocketAddr, dimensions: u32) -> EmbeddingProviders {
	EmbeddingProviders {
		order: vec!["local".to_string(), "remote".to_string()],
		local: None,
		remote: Some(EmbeddingProviderConfig {
			provider_id: "test".to_string(),
			api_base: format!("http://{addr}"),
			api_key: "test-key".to_string(),
			path: "/v1/embeddings".to_string(),
			model: "test-embedding".to_string(),
			dimensions,
			timeout_ms: 5_000,
			default_headers: Map::new(),
		}),
	}
}

#[tokio::test]
async fn remote_backend_selected_after_local_is_missing() {
	let addr = spawn_embedding_server(4).await;
	let backend = select_backend(&providers(addr, 4), 4).await;

	assert_eq!(backend.kind(), BackendKind::Remote);
	assert!(backend.retrieval_enabled());

	let vectors =
		backend.encode(&["one".to_string(), "two".to_string()]).await.expect("Encoding failed.");

	assert_eq!(vectors.len(), 2);
	assert!(vectors.iter().all(|vector| vector.len() == 4));
}

#[tokio::test]
async fn remote_backend_with_wrong_width_falls_back_to_null() {
	let addr = spawn_embedding_server(3).await;
	let backend = select_backend(&providers(addr, 4), 4).await;

	assert_eq!(backend.kind(), BackendKind::Null);
}

#[tokio::test]
async fn unreachable_remote_falls_back_to_null() {
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind listener.");
	let addr = listener.local_addr().expect("Listener has no address.");

	drop(listener);

	let backend = select_backend(&providers(addr, 4), 4).await;

	assert_eq!(backend.kind(), BackendKind::Null);
}
