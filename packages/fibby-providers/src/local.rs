//! In-process sentence embedding model.
//!
//! Built with the `local-embedding` feature the model is loaded through `fastembed` and runs on
//! the blocking pool. Without it, loading always reports the backend as unavailable so selection
//! moves on to the next candidate.

#[cfg(feature = "local-embedding")]
use std::sync::{Arc, Mutex};

use crate::{BoxFuture, EmbeddingProvider, Error, Result};
use fibby_config::LocalEmbeddingConfig;

pub struct LocalEmbedder {
	#[cfg(feature = "local-embedding")]
	model: Arc<Mutex<fastembed::TextEmbedding>>,
	model_name: String,
	dimensions: usize,
}
impl LocalEmbedder {
	/// Loads the model once and probes its output width. Blocking; may download model files.
	#[cfg(feature = "local-embedding")]
	pub fn load(cfg: &LocalEmbeddingConfig) -> Result<Self> {
		let mut init = fastembed::InitOptions::new(resolve_model(&cfg.model)?);

		if let Some(dir) = cfg.cache_dir.as_ref() {
			init = init.with_cache_dir(std::path::PathBuf::from(dir));
		}

		let mut model = fastembed::TextEmbedding::try_new(init)
			.map_err(|err| Error::LocalModel { message: err.to_string() })?;
		let probe = model
			.embed(vec!["dimension probe".to_string()], None)
			.map_err(|err| Error::LocalModel { message: err.to_string() })?;
		let dimensions = probe.first().map(Vec::len).ok_or_else(|| Error::LocalModel {
			message: "Dimension probe returned no vector.".to_string(),
		})?;

		Ok(Self { model: Arc::new(Mutex::new(model)), model_name: cfg.model.clone(), dimensions })
	}

	#[cfg(not(feature = "local-embedding"))]
	pub fn load(cfg: &LocalEmbeddingConfig) -> Result<Self> {
		Err(Error::Unavailable {
			message: format!(
				"Local embedding model {:?} requested but this build lacks the local-embedding feature.",
				cfg.model
			),
		})
	}

	pub fn dimensions(&self) -> usize {
		self.dimensions
	}
}
impl EmbeddingProvider for LocalEmbedder {
	#[cfg(feature = "local-embedding")]
	fn embed<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		let model = self.model.clone();
		let texts = texts.to_vec();

		Box::pin(async move {
			tokio::task::spawn_blocking(move || {
				let mut guard = model.lock().map_err(|_| Error::LocalModel {
					message: "Local embedding model lock is poisoned.".to_string(),
				})?;

				guard.embed(texts, None).map_err(|err| Error::LocalModel { message: err.to_string() })
			})
			.await
			.map_err(|err| Error::LocalModel { message: err.to_string() })?
		})
	}

	#[cfg(not(feature = "local-embedding"))]
	fn embed<'a>(&'a self, _texts: &'a [String]) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			Err(Error::Unavailable { message: format!("Model {} is not loaded.", self.model_name) })
		})
	}

	fn model(&self) -> &str {
		&self.model_name
	}
}

#[cfg(feature = "local-embedding")]
fn resolve_model(name: &str) -> Result<fastembed::EmbeddingModel> {
	use fastembed::EmbeddingModel;

	match name.trim().to_ascii_lowercase().as_str() {
		"all-minilm-l6-v2" | "sentence-transformers/all-minilm-l6-v2" =>
			Ok(EmbeddingModel::AllMiniLML6V2),
		"bge-small-en-v1.5" | "baai/bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
		"bge-base-en-v1.5" | "baai/bge-base-en-v1.5" => Ok(EmbeddingModel::BGEBaseENV15),
		other => Err(Error::InvalidConfig { message: format!("Unknown local embedding model {other:?}.") }),
	}
}

#[cfg(all(test, not(feature = "local-embedding")))]
mod tests {
	use super::*;

	#[test]
	fn load_without_feature_is_unavailable() {
		let cfg = LocalEmbeddingConfig { model: "all-MiniLM-L6-v2".to_string(), cache_dir: None };

		assert!(matches!(LocalEmbedder::load(&cfg), Err(Error::Unavailable { .. })));
	}
}
