//! Ordered embedding backend selection.

use std::{fmt, sync::Arc};

use crate::{
	EmbeddingProvider, Error, Result, embedding::RemoteEmbedder, local::LocalEmbedder,
	null::NullEmbedder,
};
use fibby_config::{
	EMBEDDING_CANDIDATE_LOCAL, EMBEDDING_CANDIDATE_REMOTE, EmbeddingProviderConfig,
	EmbeddingProviders, LocalEmbeddingConfig,
};

const SMOKE_TEST_TEXT: &str = "embedding backend smoke test";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
	Local,
	Remote,
	Null,
}
impl BackendKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Local => "local",
			Self::Remote => "remote",
			Self::Null => "null",
		}
	}
}
impl fmt::Display for BackendKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The process-wide text encoder. Chosen once at startup and shared by every consumer.
#[derive(Clone)]
pub struct EmbeddingBackend {
	kind: BackendKind,
	provider: Arc<dyn EmbeddingProvider>,
	dimensions: usize,
}
impl EmbeddingBackend {
	pub fn new(kind: BackendKind, provider: Arc<dyn EmbeddingProvider>, dimensions: usize) -> Self {
		Self { kind, provider, dimensions }
	}

	pub fn null(dimensions: usize) -> Self {
		Self::new(BackendKind::Null, Arc::new(NullEmbedder::new(dimensions)), dimensions)
	}

	pub fn kind(&self) -> BackendKind {
		self.kind
	}

	pub fn retrieval_enabled(&self) -> bool {
		self.kind != BackendKind::Null
	}

	pub fn dimensions(&self) -> usize {
		self.dimensions
	}

	pub fn model(&self) -> &str {
		self.provider.model()
	}

	/// Encodes `texts` into one vector each, rejecting any output of the wrong shape.
	pub async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
		let vectors = self.provider.embed(texts).await?;

		if vectors.len() != texts.len() {
			return Err(Error::InvalidResponse {
				message: format!(
					"Embedding backend returned {} vectors for {} texts.",
					vectors.len(),
					texts.len()
				),
			});
		}
		if let Some(bad) = vectors.iter().find(|vector| vector.len() != self.dimensions) {
			return Err(Error::InvalidResponse {
				message: format!(
					"Embedding backend returned a {}-dimensional vector; expected {}.",
					bad.len(),
					self.dimensions
				),
			});
		}

		Ok(vectors)
	}
}
impl fmt::Debug for EmbeddingBackend {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EmbeddingBackend")
			.field("kind", &self.kind)
			.field("model", &self.model())
			.field("dimensions", &self.dimensions)
			.finish()
	}
}

/// Tries each configured candidate in order and returns the first one that works. Falls back
/// to the null backend, so startup never fails here.
pub async fn select_backend(cfg: &EmbeddingProviders, vector_dim: u32) -> EmbeddingBackend {
	let dimensions = vector_dim as usize;

	for candidate in &cfg.order {
		let attempt = match candidate.as_str() {
			EMBEDDING_CANDIDATE_LOCAL => match cfg.local.as_ref() {
				Some(local) => try_local(local, dimensions).await,
				None => Err(not_configured(candidate)),
			},
			EMBEDDING_CANDIDATE_REMOTE => match cfg.remote.as_ref() {
				Some(remote) => try_remote(remote, dimensions).await,
				None => Err(not_configured(candidate)),
			},
			other => Err(Error::InvalidConfig {
				message: format!("Unknown embedding candidate {other:?}."),
			}),
		};

		match attempt {
			Ok(backend) => {
				tracing::info!(
					backend = %backend.kind(),
					model = backend.model(),
					dimensions,
					"Embedding backend selected."
				);

				return backend;
			},
			Err(err) => {
				tracing::warn!(candidate = candidate.as_str(), error = %err, "Embedding backend unavailable.");
			},
		}
	}

	tracing::warn!("No embedding backend available. Retrieval is disabled.");

	EmbeddingBackend::null(dimensions)
}

async fn try_local(cfg: &LocalEmbeddingConfig, dimensions: usize) -> Result<EmbeddingBackend> {
	let cfg = cfg.clone();
	let embedder = tokio::task::spawn_blocking(move || LocalEmbedder::load(&cfg))
		.await
		.map_err(|err| Error::LocalModel { message: err.to_string() })??;

	if embedder.dimensions() != dimensions {
		return Err(dimension_mismatch(embedder.dimensions(), dimensions));
	}

	Ok(EmbeddingBackend::new(BackendKind::Local, Arc::new(embedder), dimensions))
}

async fn try_remote(cfg: &EmbeddingProviderConfig, dimensions: usize) -> Result<EmbeddingBackend> {
	let embedder = RemoteEmbedder::new(cfg.clone())?;
	let probe = embedder.embed(&[SMOKE_TEST_TEXT.to_string()]).await?;
	let width = probe.first().map(Vec::len).unwrap_or_default();

	if width != dimensions {
		return Err(dimension_mismatch(width, dimensions));
	}

	Ok(EmbeddingBackend::new(BackendKind::Remote, Arc::new(embedder), dimensions))
}

fn not_configured(candidate: &str) -> Error {
	Error::Unavailable { message: format!("Embedding candidate {candidate:?} is not configured.") }
}

fn dimension_mismatch(actual: usize, expected: usize) -> Error {
	Error::InvalidConfig {
		message: format!("Embedding width {actual} does not match vector_dim {expected}."),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn empty_order_selects_null() {
		let cfg = EmbeddingProviders { order: Vec::new(), local: None, remote: None };
		let backend = select_backend(&cfg, 8).await;

		assert_eq!(backend.kind(), BackendKind::Null);
		assert!(!backend.retrieval_enabled());
		assert_eq!(backend.dimensions(), 8);
	}

	#[tokio::test]
	async fn unconfigured_candidates_fall_through_to_null() {
		let cfg = EmbeddingProviders {
			order: vec!["local".to_string(), "remote".to_string()],
			local: None,
			remote: None,
		};

		assert_eq!(select_backend(&cfg, 4).await.kind(), BackendKind::Null);
	}

	#[tokio::test]
	async fn null_backend_encodes_zero_vectors() {
		let backend = EmbeddingBackend::null(3);
		let vectors = backend
			.encode(&["a".to_string(), "b".to_string()])
			.await
			.expect("Null encoding must succeed.");

		assert_eq!(vectors, vec![vec![0.0; 3], vec![0.0; 3]]);
	}

	#[tokio::test]
	async fn encode_rejects_wrong_width() {
		let backend = EmbeddingBackend::new(BackendKind::Local, Arc::new(NullEmbedder::new(2)), 3);

		assert!(matches!(
			backend.encode(&["a".to_string()]).await,
			Err(Error::InvalidResponse { .. })
		));
	}
}
