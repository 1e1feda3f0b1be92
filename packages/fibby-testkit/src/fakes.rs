//! In-process stand-ins for the vector store, the snapshot store and the embedding model.

use std::{
	cmp::Ordering,
	collections::{BTreeMap, BTreeSet, HashMap},
	sync::{
		Arc, Mutex,
		atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering},
	},
};

use time::OffsetDateTime;

use fibby_domain::snapshot::FinancialSnapshot;
use fibby_providers::{BackendKind, EmbeddingBackend, EmbeddingProvider};
use fibby_storage::{
	BoxFuture, EmbeddingRecord, Error as StorageError, IndexHit, MetadataFilter, SnapshotSource,
	VectorIndex,
};

type RecordKey = (String, String);

/// Vector index held in memory, keyed by `(owner, chunk id)` like the Qdrant store. Reports cosine
/// distance, ties broken by chunk id.
pub struct InMemoryIndex {
	name: String,
	records: Mutex<BTreeMap<RecordKey, EmbeddingRecord>>,
	fail_upsert: AtomicBool,
	fail_delete: AtomicBool,
	fail_ids: AtomicBool,
	failing_queries: AtomicUsize,
}
impl InMemoryIndex {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			records: Mutex::new(BTreeMap::new()),
			fail_upsert: AtomicBool::new(false),
			fail_delete: AtomicBool::new(false),
			fail_ids: AtomicBool::new(false),
			failing_queries: AtomicUsize::new(0),
		}
	}

	pub fn fail_upsert(&self, fail: bool) {
		self.fail_upsert.store(fail, AtomicOrdering::SeqCst);
	}

	pub fn fail_delete(&self, fail: bool) {
		self.fail_delete.store(fail, AtomicOrdering::SeqCst);
	}

	pub fn fail_ids(&self, fail: bool) {
		self.fail_ids.store(fail, AtomicOrdering::SeqCst);
	}

	/// The next `count` calls to `query` fail.
	pub fn fail_next_queries(&self, count: usize) {
		self.failing_queries.store(count, AtomicOrdering::SeqCst);
	}

	pub fn insert(&self, record: EmbeddingRecord) {
		self.lock().insert(key(&record), record);
	}

	pub fn len(&self) -> usize {
		self.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.lock().is_empty()
	}

	pub fn ids_for(&self, owner: &str) -> BTreeSet<String> {
		self.lock()
			.values()
			.filter(|record| record.metadata.owner == owner)
			.map(|record| record.id.clone())
			.collect()
	}

	pub fn records_for(&self, owner: &str) -> Vec<EmbeddingRecord> {
		self.lock().values().filter(|record| record.metadata.owner == owner).cloned().collect()
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<RecordKey, EmbeddingRecord>> {
		self.records.lock().unwrap_or_else(|err| err.into_inner())
	}

	fn injected(flag: &AtomicBool, what: &str) -> Result<(), StorageError> {
		if flag.load(AtomicOrdering::SeqCst) {
			return Err(StorageError::InvalidArgument(format!("Injected {what} failure.")));
		}

		Ok(())
	}

	fn take_query_failure(&self) -> bool {
		self.failing_queries
			.fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |left| left.checked_sub(1))
			.is_ok()
	}
}
impl VectorIndex for InMemoryIndex {
	fn upsert<'a>(
		&'a self,
		records: &'a [EmbeddingRecord],
	) -> BoxFuture<'a, Result<(), StorageError>> {
		Box::pin(async move {
			Self::injected(&self.fail_upsert, "upsert")?;

			let mut stored = self.lock();

			for record in records {
				stored.insert(key(record), record.clone());
			}

			Ok(())
		})
	}

	fn delete<'a>(
		&'a self,
		owner: &'a str,
		ids: &'a [String],
	) -> BoxFuture<'a, Result<(), StorageError>> {
		Box::pin(async move {
			Self::injected(&self.fail_delete, "delete")?;

			let mut stored = self.lock();

			for id in ids {
				stored.remove(&(owner.to_string(), id.clone()));
			}

			Ok(())
		})
	}

	fn ids_matching<'a>(
		&'a self,
		filter: &'a MetadataFilter,
	) -> BoxFuture<'a, Result<Vec<String>, StorageError>> {
		Box::pin(async move {
			Self::injected(&self.fail_ids, "ids")?;

			Ok(self
				.lock()
				.values()
				.filter(|record| filter.matches(&record.metadata))
				.map(|record| record.id.clone())
				.collect())
		})
	}

	fn query<'a>(
		&'a self,
		vector: &'a [f32],
		k: usize,
		filter: &'a MetadataFilter,
	) -> BoxFuture<'a, Result<Vec<IndexHit>, StorageError>> {
		Box::pin(async move {
			if self.take_query_failure() {
				return Err(StorageError::InvalidArgument("Injected query failure.".to_string()));
			}

			let mut hits: Vec<IndexHit> = self
				.lock()
				.values()
				.filter(|record| filter.matches(&record.metadata))
				.map(|record| IndexHit {
					id: record.id.clone(),
					text: record.text.clone(),
					metadata: record.metadata.clone(),
					distance: cosine_distance(vector, &record.vector),
				})
				.collect();

			hits.sort_by(|a, b| {
				a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal).then(a.id.cmp(&b.id))
			});
			hits.truncate(k);

			Ok(hits)
		})
	}

	fn count(&self) -> BoxFuture<'_, Result<u64, StorageError>> {
		Box::pin(async move { Ok(self.len() as u64) })
	}

	fn name(&self) -> &str {
		&self.name
	}
}

fn key(record: &EmbeddingRecord) -> RecordKey {
	(record.metadata.owner.clone(), record.id.clone())
}

pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
	let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
	let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
	let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

	if norm_a == 0.0 || norm_b == 0.0 {
		return 1.0;
	}

	1.0 - dot / (norm_a * norm_b)
}

/// Snapshot store backed by a map. Unknown owners read as empty snapshots.
#[derive(Default)]
pub struct StaticSnapshots {
	snapshots: Mutex<HashMap<String, FinancialSnapshot>>,
	fail_fetch: AtomicBool,
	fetches: AtomicUsize,
}
impl StaticSnapshots {
	pub fn new(snapshots: impl IntoIterator<Item = FinancialSnapshot>) -> Self {
		let source = Self::default();

		for snapshot in snapshots {
			source.put(snapshot);
		}

		source
	}

	/// Adds or replaces the owner's snapshot.
	pub fn put(&self, snapshot: FinancialSnapshot) {
		self.lock().insert(snapshot.owner.clone(), snapshot);
	}

	pub fn fail_fetch(&self, fail: bool) {
		self.fail_fetch.store(fail, AtomicOrdering::SeqCst);
	}

	pub fn fetches(&self) -> usize {
		self.fetches.load(AtomicOrdering::SeqCst)
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, FinancialSnapshot>> {
		self.snapshots.lock().unwrap_or_else(|err| err.into_inner())
	}
}
impl SnapshotSource for StaticSnapshots {
	fn fetch<'a>(
		&'a self,
		owner: &'a str,
	) -> BoxFuture<'a, Result<FinancialSnapshot, StorageError>> {
		Box::pin(async move {
			self.fetches.fetch_add(1, AtomicOrdering::SeqCst);

			if self.fail_fetch.load(AtomicOrdering::SeqCst) {
				return Err(StorageError::InvalidArgument("Injected fetch failure.".to_string()));
			}

			Ok(self
				.lock()
				.get(owner)
				.cloned()
				.unwrap_or_else(|| FinancialSnapshot::empty(owner, OffsetDateTime::now_utc())))
		})
	}

	fn owners(&self) -> BoxFuture<'_, Result<Vec<String>, StorageError>> {
		Box::pin(async move {
			let mut owners: Vec<String> = self.lock().keys().cloned().collect();

			owners.sort();

			Ok(owners)
		})
	}
}

/// Deterministic bag-of-words embedding. Each lowercase token is hashed into one dimension, so
/// texts sharing words land close together.
pub struct KeywordEmbedding {
	dimensions: usize,
	fail_on: Option<String>,
	calls: AtomicUsize,
}
impl KeywordEmbedding {
	pub fn new(dimensions: usize) -> Self {
		Self { dimensions, fail_on: None, calls: AtomicUsize::new(0) }
	}

	/// Fails any batch containing a text with `marker` in it.
	pub fn failing_on(dimensions: usize, marker: impl Into<String>) -> Self {
		Self { dimensions, fail_on: Some(marker.into()), calls: AtomicUsize::new(0) }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(AtomicOrdering::SeqCst)
	}

	pub fn vector(&self, text: &str) -> Vec<f32> {
		let mut vector = vec![0.0; self.dimensions];

		if self.dimensions == 0 {
			return vector;
		}

		// Keeps empty texts off the zero vector.
		vector[0] = 0.01;

		for token in text
			.split(|c: char| !c.is_alphanumeric())
			.filter(|token| !token.is_empty())
			.map(str::to_lowercase)
		{
			vector[bucket(&token, self.dimensions)] += 1.0;
		}

		vector
	}
}
impl EmbeddingProvider for KeywordEmbedding {
	fn embed<'a>(
		&'a self,
		texts: &'a [String],
	) -> fibby_providers::BoxFuture<'a, fibby_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			self.calls.fetch_add(1, AtomicOrdering::SeqCst);

			if let Some(marker) = self.fail_on.as_deref()
				&& texts.iter().any(|text| text.contains(marker))
			{
				return Err(fibby_providers::Error::Unavailable {
					message: format!("Injected embedding failure on {marker:?}."),
				});
			}

			Ok(texts.iter().map(|text| self.vector(text)).collect())
		})
	}

	fn model(&self) -> &str {
		"keyword-test"
	}
}

/// Enabled backend over [`KeywordEmbedding`].
pub fn keyword_backend(dimensions: usize) -> EmbeddingBackend {
	EmbeddingBackend::new(
		BackendKind::Local,
		Arc::new(KeywordEmbedding::new(dimensions)),
		dimensions,
	)
}

/// Enabled backend that fails whenever `marker` appears in the batch.
pub fn failing_backend(dimensions: usize, marker: &str) -> EmbeddingBackend {
	EmbeddingBackend::new(
		BackendKind::Remote,
		Arc::new(KeywordEmbedding::failing_on(dimensions, marker)),
		dimensions,
	)
}

fn bucket(token: &str, dimensions: usize) -> usize {
	// FNV-1a keeps buckets stable across runs and platforms.
	let mut hash: u64 = 0xcbf2_9ce4_8422_2325;

	for byte in token.bytes() {
		hash ^= u64::from(byte);
		hash = hash.wrapping_mul(0x0100_0000_01b3);
	}

	(hash % dimensions as u64) as usize
}
