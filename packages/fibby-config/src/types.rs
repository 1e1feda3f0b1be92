use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub retrieval: Retrieval,
	#[serde(default)]
	pub worker: Worker,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub qdrant: Qdrant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviders,
}

/// Embedding backend candidates, tried in `order`. A process whose candidates all fail runs
/// with the null backend and retrieval disabled.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviders {
	#[serde(default = "default_embedding_order")]
	pub order: Vec<String>,
	pub local: Option<LocalEmbeddingConfig>,
	pub remote: Option<EmbeddingProviderConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalEmbeddingConfig {
	pub model: String,
	pub cache_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Retrieval {
	/// Pause between owners during a bulk refresh.
	#[serde(default = "default_refresh_all_delay_ms")]
	pub refresh_all_delay_ms: u64,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self { refresh_all_delay_ms: default_refresh_all_delay_ms() }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Worker {
	#[serde(default = "default_interval_seconds")]
	pub interval_seconds: u64,
}
impl Default for Worker {
	fn default() -> Self {
		Self { interval_seconds: default_interval_seconds() }
	}
}

fn default_embedding_order() -> Vec<String> {
	vec!["local".to_string(), "remote".to_string()]
}

fn default_refresh_all_delay_ms() -> u64 {
	500
}

fn default_interval_seconds() -> u64 {
	3_600
}
