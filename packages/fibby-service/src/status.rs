use std::fmt;

use serde::Serialize;

use crate::RetrievalService;

#[derive(Clone, Debug, Serialize)]
pub struct Status {
	pub retrieval_enabled: bool,
	pub backend: String,
	pub model: String,
	pub total_tracked_owners: usize,
	pub total_indexed_documents: u64,
}

/// Owners refreshed by this process and the token of their current generation.
#[derive(Clone, Debug, Serialize)]
pub struct RefreshReport {
	pub collection: String,
	pub backend: String,
	pub model: String,
	pub total_indexed_documents: u64,
	/// `(owner, update_token)` sorted by owner.
	pub generations: Vec<(String, String)>,
}
impl fmt::Display for RefreshReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "Collection: {}", self.collection)?;
		writeln!(f, "Backend: {} ({})", self.backend, self.model)?;
		writeln!(f, "Indexed documents: {}", self.total_indexed_documents)?;

		if self.generations.is_empty() {
			return writeln!(f, "No owners refreshed yet.");
		}

		let width = self.generations.iter().map(|(owner, _)| owner.len()).max().unwrap_or(0).max(5);

		writeln!(f, "{:<width$}  update_token", "owner")?;

		for (owner, token) in &self.generations {
			writeln!(f, "{owner:<width$}  {token}")?;
		}

		Ok(())
	}
}

impl RetrievalService {
	pub async fn status(&self) -> Status {
		Status {
			retrieval_enabled: self.backend.retrieval_enabled(),
			backend: self.backend.kind().to_string(),
			model: self.backend.model().to_string(),
			total_tracked_owners: self.generations_snapshot().len(),
			total_indexed_documents: self.indexed_documents().await,
		}
	}

	pub async fn report(&self) -> RefreshReport {
		let mut generations: Vec<(String, String)> = self.generations_snapshot().into_iter().collect();

		generations.sort();

		RefreshReport {
			collection: self.index.name().to_string(),
			backend: self.backend.kind().to_string(),
			model: self.backend.model().to_string(),
			total_indexed_documents: self.indexed_documents().await,
			generations,
		}
	}

	async fn indexed_documents(&self) -> u64 {
		match self.index.count().await {
			Ok(count) => count,
			Err(err) => {
				tracing::warn!(error = %err, "Failed to count indexed documents.");

				0
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn report_renders_one_row_per_owner() {
		let report = RefreshReport {
			collection: "fibby_chunks".to_string(),
			backend: "local".to_string(),
			model: "all-minilm-l6-v2".to_string(),
			total_indexed_documents: 7,
			generations: vec![
				("u1".to_string(), "gen_u1_1_abcdef01".to_string()),
				("u2".to_string(), "gen_u2_2_abcdef02".to_string()),
			],
		};
		let rendered = report.to_string();

		assert!(rendered.contains("Indexed documents: 7"));
		assert!(rendered.contains("u1     gen_u1_1_abcdef01"));
		assert_eq!(rendered.lines().count(), 6);
	}

	#[test]
	fn empty_report_says_so() {
		let report = RefreshReport {
			collection: "c".to_string(),
			backend: "null".to_string(),
			model: "null".to_string(),
			total_indexed_documents: 0,
			generations: Vec::new(),
		};

		assert!(report.to_string().ends_with("No owners refreshed yet.\n"));
	}
}
