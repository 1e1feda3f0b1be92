use std::collections::HashSet;

use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

use crate::{BulkRefreshPermit, Error, Result, RetrievalService, validate_owner};
use fibby_domain::retrieval::ChunkMetadata;
use fibby_storage::{EmbeddingRecord, MetadataFilter};

/// `gen_<owner>_<unix-millis>_<8 hex>`. The random suffix keeps tokens unique within one
/// millisecond.
pub fn generate_update_token(owner: &str, now: OffsetDateTime) -> String {
	let millis = now.unix_timestamp_nanos() / 1_000_000;
	let suffix = Uuid::new_v4().simple().to_string();

	format!("gen_{owner}_{millis}_{}", &suffix[..8])
}

impl RetrievalService {
	/// Rebuilds the owner's indexed chunks from their current records.
	///
	/// Returns the new generation's token, or `None` when nothing was written: retrieval is
	/// disabled, the owner has no data, or a step failed (logged). `Err` only signals an invalid
	/// request.
	pub async fn refresh(&self, owner: &str) -> Result<Option<String>> {
		let owner = validate_owner(owner)?;

		if !self.backend.retrieval_enabled() {
			tracing::debug!(owner, "Retrieval disabled. Skipping refresh.");

			return Ok(None);
		}

		match self.replace_generation(owner).await {
			Ok(Some(token)) => {
				self.record_generation(owner, &token);

				Ok(Some(token))
			},
			Ok(None) => Ok(None),
			Err(err) => {
				tracing::error!(owner, error = %err, "Refresh failed.");

				Ok(None)
			},
		}
	}

	/// Refreshes every known owner one at a time, pausing between owners.
	///
	/// Skipped with a warning while another bulk refresh is running.
	pub async fn refresh_all(&self) {
		let Some(permit) = self.try_begin_refresh_all() else {
			tracing::warn!("Bulk refresh already running. Skipping.");

			return;
		};

		self.refresh_all_with(permit).await;
	}

	/// Runs a bulk refresh under a permit from [`RetrievalService::try_begin_refresh_all`]. The slot
	/// is released when this returns or is dropped.
	pub async fn refresh_all_with(&self, permit: BulkRefreshPermit) {
		let _permit = permit;

		if !self.backend.retrieval_enabled() {
			tracing::info!("Retrieval disabled. Skipping bulk refresh.");

			return;
		}

		let owners = match self.source.owners().await {
			Ok(owners) => owners,
			Err(err) => {
				tracing::error!(error = %err, "Failed to list owners for bulk refresh.");

				return;
			},
		};
		let mut refreshed = 0_usize;

		for (idx, owner) in owners.iter().enumerate() {
			if idx > 0 && !self.settings.refresh_all_delay.is_zero() {
				tokio::time::sleep(self.settings.refresh_all_delay).await;
			}

			match self.refresh(owner).await {
				Ok(Some(_)) => refreshed += 1,
				Ok(None) => {},
				Err(err) => tracing::warn!(owner = owner.as_str(), error = %err, "Skipping owner."),
			}
		}

		tracing::info!(owners = owners.len(), refreshed, "Bulk refresh finished.");
	}

	async fn replace_generation(&self, owner: &str) -> Result<Option<String>> {
		let snapshot = self.source.fetch(owner).await?;
		let chunks = fibby_chunking::build_chunks(&snapshot);

		if chunks.is_empty() {
			tracing::info!(owner, "No financial data to index.");

			return Ok(None);
		}

		let token = generate_update_token(owner, OffsetDateTime::now_utc());
		let timestamp = snapshot.fetched_at.format(&Rfc3339).map_err(|err| {
			Error::Storage { message: format!("Failed to format snapshot time: {err}.") }
		})?;
		let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
		// Encode before touching the index so a backend failure leaves the old generation intact.
		let vectors = self.backend.encode(&texts).await?;
		let records: Vec<EmbeddingRecord> = chunks
			.into_iter()
			.zip(vectors)
			.map(|(chunk, vector)| EmbeddingRecord {
				metadata: ChunkMetadata {
					owner: chunk.owner,
					chunk_type: chunk.chunk_type.as_tag(),
					update_token: token.clone(),
					timestamp: timestamp.clone(),
				},
				id: chunk.id,
				vector,
				text: chunk.text,
			})
			.collect();

		self.index.upsert(&records).await?;

		let fresh: HashSet<&str> = records.iter().map(|record| record.id.as_str()).collect();
		let stale: Vec<String> = self
			.index
			.ids_matching(&MetadataFilter::owner(owner))
			.await?
			.into_iter()
			.filter(|id| !fresh.contains(id.as_str()))
			.collect();

		self.index.delete(owner, &stale).await?;

		tracing::info!(
			owner,
			update_token = %token,
			chunks = records.len(),
			removed = stale.len(),
			"Owner refreshed."
		);

		Ok(Some(token))
	}
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	#[test]
	fn token_carries_owner_and_millis() {
		let token = generate_update_token("u1", datetime!(2026-03-01 00:00:00.250 UTC));
		let millis = datetime!(2026-03-01 00:00:00.250 UTC).unix_timestamp_nanos() / 1_000_000;

		assert!(token.starts_with(&format!("gen_u1_{millis}_")));
		assert_eq!(token.rsplit('_').next().map(str::len), Some(8));
	}

	#[test]
	fn tokens_are_unique_within_one_instant() {
		let now = datetime!(2026-03-01 00:00 UTC);

		assert_ne!(generate_update_token("u1", now), generate_update_token("u1", now));
	}
}
