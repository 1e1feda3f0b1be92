mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, EmbeddingProviders, LocalEmbeddingConfig, Postgres,
	Providers, Qdrant, Retrieval, Service, Storage, Worker,
};

use std::{collections::HashSet, fs, path::Path};

pub const EMBEDDING_CANDIDATE_LOCAL: &str = "local";
pub const EMBEDDING_CANDIDATE_REMOTE: &str = "remote";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.vector_dim == 0 {
		return Err(Error::Validation {
			message: "storage.qdrant.vector_dim must be greater than zero.".to_string(),
		});
	}

	let mut seen = HashSet::new();

	for candidate in &cfg.providers.embedding.order {
		if !matches!(candidate.as_str(), EMBEDDING_CANDIDATE_LOCAL | EMBEDDING_CANDIDATE_REMOTE) {
			return Err(Error::Validation {
				message: format!(
					"providers.embedding.order entry {candidate:?} must be one of local or remote."
				),
			});
		}
		if !seen.insert(candidate.as_str()) {
			return Err(Error::Validation {
				message: format!("providers.embedding.order lists {candidate:?} more than once."),
			});
		}
	}

	if let Some(local) = cfg.providers.embedding.local.as_ref()
		&& local.model.trim().is_empty()
	{
		return Err(Error::Validation {
			message: "providers.embedding.local.model must be non-empty.".to_string(),
		});
	}
	if let Some(remote) = cfg.providers.embedding.remote.as_ref() {
		if remote.api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: "providers.embedding.remote.api_key must be non-empty.".to_string(),
			});
		}
		if remote.dimensions != cfg.storage.qdrant.vector_dim {
			return Err(Error::Validation {
				message:
					"providers.embedding.remote.dimensions must match storage.qdrant.vector_dim."
						.to_string(),
			});
		}
		if remote.timeout_ms == 0 {
			return Err(Error::Validation {
				message: "providers.embedding.remote.timeout_ms must be greater than zero."
					.to_string(),
			});
		}
	}
	if cfg.worker.interval_seconds == 0 {
		return Err(Error::Validation {
			message: "worker.interval_seconds must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for candidate in &mut cfg.providers.embedding.order {
		*candidate = candidate.trim().to_ascii_lowercase();
	}

	if let Some(local) = cfg.providers.embedding.local.as_mut()
		&& local.cache_dir.as_deref().map(|dir| dir.trim().is_empty()).unwrap_or(false)
	{
		local.cache_dir = None;
	}
}
