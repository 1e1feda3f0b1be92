pub mod refresh;
pub mod retrieve;
pub mod status;

mod error;

pub use error::{Error, Result};
pub use refresh::generate_update_token;
pub use status::{RefreshReport, Status};

use std::{
	collections::HashMap,
	sync::{Arc, RwLock},
	time::Duration,
};

use tokio::sync::{Mutex, OwnedMutexGuard};

use fibby_config::Config;
use fibby_providers::EmbeddingBackend;
use fibby_storage::{SnapshotSource, VectorIndex, db::Db, qdrant::QdrantStore};

/// Neighbors requested from the index for each expanded query.
pub const NEIGHBORS_PER_QUERY: usize = 3;
/// Result cap used when building a prompt context.
pub const DEFAULT_MAX_CHUNKS: usize = 15;

#[derive(Clone, Debug)]
pub struct ServiceSettings {
	/// Pause between owners in [`RetrievalService::refresh_all`].
	pub refresh_all_delay: Duration,
}
impl ServiceSettings {
	pub fn from_config(cfg: &Config) -> Self {
		Self { refresh_all_delay: Duration::from_millis(cfg.retrieval.refresh_all_delay_ms) }
	}
}
impl Default for ServiceSettings {
	fn default() -> Self {
		Self { refresh_all_delay: Duration::from_millis(500) }
	}
}

/// Held for the length of one bulk refresh. At most one exists per service.
pub struct BulkRefreshPermit {
	_guard: OwnedMutexGuard<()>,
}

/// Keeps each owner's indexed chunks in step with their financial records and answers
/// questions with the most relevant ones.
pub struct RetrievalService {
	backend: EmbeddingBackend,
	index: Arc<dyn VectorIndex>,
	source: Arc<dyn SnapshotSource>,
	settings: ServiceSettings,
	generations: RwLock<HashMap<String, String>>,
	bulk_refresh: Arc<Mutex<()>>,
}
impl RetrievalService {
	pub fn new(
		backend: EmbeddingBackend,
		index: Arc<dyn VectorIndex>,
		source: Arc<dyn SnapshotSource>,
		settings: ServiceSettings,
	) -> Self {
		Self {
			backend,
			index,
			source,
			settings,
			generations: RwLock::new(HashMap::new()),
			bulk_refresh: Arc::new(Mutex::new(())),
		}
	}

	/// Connects to Postgres and Qdrant, bootstraps both, and selects the embedding backend.
	pub async fn connect(cfg: &Config) -> Result<Self> {
		let db = Db::connect(&cfg.storage.postgres).await?;

		db.ensure_schema().await?;

		let qdrant = QdrantStore::new(&cfg.storage.qdrant)?;

		qdrant.ensure_collection().await?;

		let backend =
			fibby_providers::select_backend(&cfg.providers.embedding, cfg.storage.qdrant.vector_dim)
				.await;

		Ok(Self::new(backend, Arc::new(qdrant), Arc::new(db), ServiceSettings::from_config(cfg)))
	}

	pub fn backend(&self) -> &EmbeddingBackend {
		&self.backend
	}

	pub fn retrieval_enabled(&self) -> bool {
		self.backend.retrieval_enabled()
	}

	/// Claims the bulk-refresh slot, or `None` while another bulk refresh holds it.
	pub fn try_begin_refresh_all(&self) -> Option<BulkRefreshPermit> {
		let guard = self.bulk_refresh.clone().try_lock_owned().ok()?;

		Some(BulkRefreshPermit { _guard: guard })
	}

	/// Token of the owner's last successful refresh in this process.
	pub fn update_token(&self, owner: &str) -> Option<String> {
		self.generations.read().unwrap_or_else(|err| err.into_inner()).get(owner).cloned()
	}

	fn record_generation(&self, owner: &str, token: &str) {
		self.generations
			.write()
			.unwrap_or_else(|err| err.into_inner())
			.insert(owner.to_string(), token.to_string());
	}

	fn generations_snapshot(&self) -> HashMap<String, String> {
		self.generations.read().unwrap_or_else(|err| err.into_inner()).clone()
	}
}

pub(crate) fn validate_owner(owner: &str) -> Result<&str> {
	let owner = owner.trim();

	if owner.is_empty() {
		return Err(Error::InvalidRequest { message: "owner must be non-empty.".to_string() });
	}

	Ok(owner)
}
