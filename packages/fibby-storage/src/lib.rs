pub mod db;
pub mod models;
pub mod qdrant;
pub mod queries;
pub mod schema;

mod error;

pub use error::Error;

use std::{future::Future, pin::Pin};

use fibby_domain::{retrieval::ChunkMetadata, snapshot::FinancialSnapshot};

pub type Result<T, E = Error> = std::result::Result<T, E>;
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub const OWNER_KEY: &str = "owner";

/// Exact match on one metadata field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFilter {
	pub key: String,
	pub value: String,
}
impl MetadataFilter {
	pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
		Self { key: key.into(), value: value.into() }
	}

	pub fn owner(owner: impl Into<String>) -> Self {
		Self::new(OWNER_KEY, owner)
	}

	pub fn matches(&self, metadata: &ChunkMetadata) -> bool {
		let field = match self.key.as_str() {
			OWNER_KEY => metadata.owner.as_str(),
			"chunk_type" => metadata.chunk_type.as_str(),
			"update_token" => metadata.update_token.as_str(),
			"timestamp" => metadata.timestamp.as_str(),
			_ => return false,
		};

		field == self.value
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRecord {
	pub id: String,
	pub vector: Vec<f32>,
	pub text: String,
	pub metadata: ChunkMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
	pub id: String,
	pub text: String,
	pub metadata: ChunkMetadata,
	/// Lower is closer.
	pub distance: f32,
}

/// Persistent nearest-neighbor store keyed by `(owner, chunk id)`.
///
/// Writing a key that already exists replaces the stored record. Equal chunk ids under different
/// owners are distinct records.
pub trait VectorIndex
where
	Self: Send + Sync,
{
	fn upsert<'a>(&'a self, records: &'a [EmbeddingRecord]) -> BoxFuture<'a, Result<()>>;

	/// Removes the owner's records with these chunk ids.
	fn delete<'a>(&'a self, owner: &'a str, ids: &'a [String]) -> BoxFuture<'a, Result<()>>;

	fn ids_matching<'a>(&'a self, filter: &'a MetadataFilter)
	-> BoxFuture<'a, Result<Vec<String>>>;

	/// Up to `k` nearest records passing `filter`, closest first.
	fn query<'a>(
		&'a self,
		vector: &'a [f32],
		k: usize,
		filter: &'a MetadataFilter,
	) -> BoxFuture<'a, Result<Vec<IndexHit>>>;

	fn count(&self) -> BoxFuture<'_, Result<u64>>;

	fn name(&self) -> &str;
}

/// Reads the financial records chunking is built from.
pub trait SnapshotSource
where
	Self: Send + Sync,
{
	fn fetch<'a>(&'a self, owner: &'a str) -> BoxFuture<'a, Result<FinancialSnapshot>>;

	fn owners(&self) -> BoxFuture<'_, Result<Vec<String>>>;
}
