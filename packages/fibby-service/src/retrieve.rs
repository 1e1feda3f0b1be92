use std::{cmp::Ordering, collections::HashSet};

use crate::{DEFAULT_MAX_CHUNKS, Error, NEIGHBORS_PER_QUERY, Result, RetrievalService, validate_owner};
use fibby_domain::{
	context::{self, NO_CONTEXT},
	expansion,
	retrieval::RetrievalResult,
};
use fibby_storage::{IndexHit, MetadataFilter};

impl RetrievalService {
	/// Expands `question`, searches the owner's chunks once per expanded query and returns the
	/// closest distinct chunks, at most `max_chunks`, closest first.
	///
	/// A failing sub-query is skipped. If every sub-query fails the result is empty.
	pub async fn retrieve(
		&self,
		owner: &str,
		question: &str,
		max_chunks: usize,
	) -> Result<Vec<RetrievalResult>> {
		let owner = validate_owner(owner)?;

		if max_chunks == 0 {
			return Err(Error::InvalidRequest {
				message: "max_chunks must be greater than zero.".to_string(),
			});
		}
		if !self.backend.retrieval_enabled() {
			return Ok(Vec::new());
		}

		let queries = expansion::expand(question);
		let filter = MetadataFilter::owner(owner);
		let mut seen = HashSet::new();
		let mut results = Vec::new();
		let mut failed = 0_usize;

		for query in &queries {
			let hits = match self.search(query, &filter).await {
				Ok(hits) => hits,
				Err(err) => {
					failed += 1;

					tracing::warn!(owner, query = query.as_str(), error = %err, "Sub-query search failed.");

					continue;
				},
			};

			for hit in hits {
				if hit.metadata.owner != owner {
					tracing::warn!(owner, chunk_id = %hit.id, "Dropping hit owned by another user.");

					continue;
				}
				if !seen.insert(hit.id.clone()) {
					continue;
				}

				results.push(RetrievalResult {
					id: hit.id,
					text: hit.text,
					metadata: hit.metadata,
					distance: hit.distance,
					query: query.clone(),
				});
			}
		}

		if failed == queries.len() {
			tracing::error!(owner, queries = queries.len(), "Every sub-query search failed.");
		}

		// Stable, so equal distances keep encounter order.
		results.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
		results.truncate(max_chunks);

		Ok(results)
	}

	/// Context block for the chat prompt. Falls back to a fixed sentence when nothing relevant is
	/// found or retrieval is disabled.
	pub async fn get_context(&self, owner: &str, question: &str) -> Result<String> {
		let owner = validate_owner(owner)?;

		if !self.backend.retrieval_enabled() {
			return Ok(NO_CONTEXT.to_string());
		}

		let results = self.retrieve(owner, question, DEFAULT_MAX_CHUNKS).await?;

		Ok(context::format_context(&results))
	}

	async fn search(&self, query: &str, filter: &MetadataFilter) -> Result<Vec<IndexHit>> {
		let vector = self
			.backend
			.encode(&[query.to_string()])
			.await?
			.pop()
			.ok_or_else(|| Error::Provider { message: "Query encoding returned no vector.".to_string() })?;

		Ok(self.index.query(&vector, NEIGHBORS_PER_QUERY, filter).await?)
	}
}
