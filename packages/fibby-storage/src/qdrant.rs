pub const DENSE_VECTOR_NAME: &str = "dense";

use std::collections::HashMap;

use qdrant_client::{
	client::Payload,
	qdrant::{
		Condition, CountPointsBuilder, CreateCollectionBuilder, CreateFieldIndexCollectionBuilder,
		DeletePointsBuilder, Distance, FieldType, Filter, PointId, PointStruct, PointsIdsList,
		Query, QueryPointsBuilder, ScoredPoint, ScrollPointsBuilder, UpsertPointsBuilder, Value,
		Vector, VectorParamsBuilder, VectorsConfigBuilder, value::Kind,
	},
};
use uuid::Uuid;

use crate::{
	BoxFuture, EmbeddingRecord, Error, IndexHit, MetadataFilter, OWNER_KEY, Result, VectorIndex,
};
use fibby_domain::retrieval::ChunkMetadata;

const SCROLL_PAGE_SIZE: u32 = 256;

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &fibby_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	/// Creates the collection and its owner index when missing. Existing collections are left as is.
	pub async fn ensure_collection(&self) -> Result<()> {
		if self.client.collection_exists(self.collection.clone()).await? {
			return Ok(());
		}

		let mut vectors_config = VectorsConfigBuilder::default();

		vectors_config.add_named_vector_params(
			DENSE_VECTOR_NAME,
			VectorParamsBuilder::new(self.vector_dim.into(), Distance::Cosine),
		);

		self.client
			.create_collection(
				CreateCollectionBuilder::new(self.collection.clone()).vectors_config(vectors_config),
			)
			.await?;
		self.client
			.create_field_index(
				CreateFieldIndexCollectionBuilder::new(
					self.collection.clone(),
					OWNER_KEY,
					FieldType::Keyword,
				)
				.wait(true),
			)
			.await?;

		tracing::info!(collection = %self.collection, dim = self.vector_dim, "Qdrant collection created.");

		Ok(())
	}

	async fn upsert_records(&self, records: &[EmbeddingRecord]) -> Result<()> {
		if records.is_empty() {
			return Ok(());
		}

		let mut points = Vec::with_capacity(records.len());

		for record in records {
			if record.vector.len() != self.vector_dim as usize {
				return Err(Error::InvalidArgument(format!(
					"Vector for {} has {} dimensions; collection expects {}.",
					record.id,
					record.vector.len(),
					self.vector_dim
				)));
			}

			let mut payload = Payload::new();

			payload.insert("chunk_id", record.id.clone());
			payload.insert(OWNER_KEY, record.metadata.owner.clone());
			payload.insert("chunk_type", record.metadata.chunk_type.clone());
			payload.insert("text", record.text.clone());
			payload.insert("update_token", record.metadata.update_token.clone());
			payload.insert("timestamp", record.metadata.timestamp.clone());

			let mut vectors = HashMap::new();

			vectors.insert(DENSE_VECTOR_NAME.to_string(), Vector::from(record.vector.clone()));
			points.push(PointStruct::new(point_id(&record.metadata.owner, &record.id).to_string(), vectors, payload));
		}

		self.client
			.upsert_points(UpsertPointsBuilder::new(self.collection.clone(), points).wait(true))
			.await?;

		Ok(())
	}

	async fn delete_records(&self, owner: &str, ids: &[String]) -> Result<()> {
		if ids.is_empty() {
			return Ok(());
		}

		let ids = ids.iter().map(|id| PointId::from(point_id(owner, id).to_string())).collect();
		let delete = DeletePointsBuilder::new(self.collection.clone())
			.points(PointsIdsList { ids })
			.wait(true);

		self.client.delete_points(delete).await?;

		Ok(())
	}

	async fn scroll_ids(&self, filter: &MetadataFilter) -> Result<Vec<String>> {
		let mut ids = Vec::new();
		let mut offset: Option<PointId> = None;

		loop {
			let mut scroll = ScrollPointsBuilder::new(self.collection.clone())
				.filter(to_filter(filter))
				.limit(SCROLL_PAGE_SIZE)
				.with_payload(true)
				.with_vectors(false);

			if let Some(offset) = offset.take() {
				scroll = scroll.offset(offset);
			}

			let response = self.client.scroll(scroll).await?;

			for point in &response.result {
				match payload_string(&point.payload, "chunk_id") {
					Some(id) => ids.push(id),
					None => tracing::warn!(collection = %self.collection, "Point missing chunk_id."),
				}
			}

			match response.next_page_offset {
				Some(next) => offset = Some(next),
				None => break,
			}
		}

		Ok(ids)
	}

	async fn nearest(
		&self,
		vector: &[f32],
		k: usize,
		filter: &MetadataFilter,
	) -> Result<Vec<IndexHit>> {
		if k == 0 {
			return Ok(Vec::new());
		}

		let search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector.to_vec()))
			.using(DENSE_VECTOR_NAME)
			.filter(to_filter(filter))
			.limit(k as u64)
			.with_payload(true);
		let response = self.client.query(search).await?;

		Ok(response.result.iter().filter_map(scored_point_to_hit).collect())
	}

	async fn count_points(&self) -> Result<u64> {
		let response = self
			.client
			.count(CountPointsBuilder::new(self.collection.clone()).exact(true))
			.await?;

		Ok(response.result.map(|result| result.count).unwrap_or_default())
	}
}
impl VectorIndex for QdrantStore {
	fn upsert<'a>(&'a self, records: &'a [EmbeddingRecord]) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.upsert_records(records))
	}

	fn delete<'a>(&'a self, owner: &'a str, ids: &'a [String]) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.delete_records(owner, ids))
	}

	fn ids_matching<'a>(
		&'a self,
		filter: &'a MetadataFilter,
	) -> BoxFuture<'a, Result<Vec<String>>> {
		Box::pin(self.scroll_ids(filter))
	}

	fn query<'a>(
		&'a self,
		vector: &'a [f32],
		k: usize,
		filter: &'a MetadataFilter,
	) -> BoxFuture<'a, Result<Vec<IndexHit>>> {
		Box::pin(self.nearest(vector, k, filter))
	}

	fn count(&self) -> BoxFuture<'_, Result<u64>> {
		Box::pin(self.count_points())
	}

	fn name(&self) -> &str {
		&self.collection
	}
}

/// Qdrant only accepts integers and UUIDs as point ids, so chunk ids map to a stable UUIDv5.
/// Owner and chunk id are joined with a NUL so `("a_b", "c")` and `("a", "b_c")` never collide.
pub fn point_id(owner: &str, chunk_id: &str) -> Uuid {
	Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{owner}\u{0}{chunk_id}").as_bytes())
}

fn to_filter(filter: &MetadataFilter) -> Filter {
	Filter::must([Condition::matches(filter.key.clone(), filter.value.clone())])
}

fn scored_point_to_hit(point: &ScoredPoint) -> Option<IndexHit> {
	let Some(id) = payload_string(&point.payload, "chunk_id") else {
		tracing::warn!("Scored point missing chunk_id.");

		return None;
	};
	let metadata = ChunkMetadata {
		owner: payload_string(&point.payload, OWNER_KEY).unwrap_or_default(),
		chunk_type: payload_string(&point.payload, "chunk_type").unwrap_or_default(),
		update_token: payload_string(&point.payload, "update_token").unwrap_or_default(),
		timestamp: payload_string(&point.payload, "timestamp").unwrap_or_default(),
	};

	Some(IndexHit {
		id,
		text: payload_string(&point.payload, "text").unwrap_or_default(),
		metadata,
		distance: 1.0 - point.score,
	})
}

fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.to_string()),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn string_value(text: &str) -> Value {
		Value { kind: Some(Kind::StringValue(text.to_string())) }
	}

	#[test]
	fn point_ids_are_stable_per_chunk() {
		assert_eq!(point_id("u1", "u1_goal_g1"), point_id("u1", "u1_goal_g1"));
		assert_ne!(point_id("u1", "u1_goal_g1"), point_id("u2", "u2_goal_g1"));
	}

	#[test]
	fn point_ids_are_scoped_by_owner() {
		// `alice` with goal id `account` renders the same chunk id as `alice_goal`'s account.
		assert_ne!(
			point_id("alice", "alice_goal_account"),
			point_id("alice_goal", "alice_goal_account")
		);
	}

	#[test]
	fn scored_point_distance_is_one_minus_score() {
		let mut payload = HashMap::new();

		payload.insert("chunk_id".to_string(), string_value("u1_account"));
		payload.insert("owner".to_string(), string_value("u1"));
		payload.insert("chunk_type".to_string(), string_value("account"));
		payload.insert("text".to_string(), string_value("Account balance: ₹10.00."));

		let point = ScoredPoint { payload, score: 0.75, ..Default::default() };
		let hit = scored_point_to_hit(&point).expect("Hit must convert.");

		assert_eq!(hit.id, "u1_account");
		assert_eq!(hit.metadata.owner, "u1");
		assert!((hit.distance - 0.25).abs() < 1e-6);
	}

	#[test]
	fn scored_point_without_chunk_id_is_skipped() {
		let point = ScoredPoint { score: 0.9, ..Default::default() };

		assert!(scored_point_to_hit(&point).is_none());
	}
}
