use serde::{Deserialize, Serialize};

/// Metadata stored next to every embedded chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
	pub owner: String,
	/// Raw chunk type tag. Kept as a string so rows written by other versions still format.
	pub chunk_type: String,
	pub update_token: String,
	/// RFC 3339 time the source snapshot was fetched.
	pub timestamp: String,
}

/// One ranked hit. Built per question and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
	pub id: String,
	pub text: String,
	pub metadata: ChunkMetadata,
	/// Lower is more relevant.
	pub distance: f32,
	/// Expanded query that first surfaced this chunk.
	pub query: String,
}
