use fibby_domain::{
	chunk::ChunkType,
	context::{self, ContextSection},
	expansion,
	retrieval::{ChunkMetadata, RetrievalResult},
	snapshot::{FinancialSnapshot, TransactionType},
};

#[test]
fn snapshot_tolerates_missing_sections() {
	let json = serde_json::json!({
		"owner": "u1",
		"profile": null,
		"account": { "bank_name": "HDFC", "account_type": "Savings", "balance": 24540.0 },
		"transactions": [{
			"description": "Groceries",
			"amount": 820.5,
			"transaction_type": "debit",
			"category": "Food",
			"merchant": null,
			"date": null
		}],
		"fetched_at": "2026-10-19T08:00:00Z"
	});
	let snapshot: FinancialSnapshot =
		serde_json::from_value(json).expect("Snapshot must deserialize.");

	assert!(snapshot.profile.is_none());
	assert!(snapshot.goals.is_empty());
	assert!(snapshot.insights.is_empty());
	assert_eq!(snapshot.transactions[0].transaction_type, TransactionType::Expense);
}

#[test]
fn chunk_type_serializes_as_tag() {
	let value = serde_json::to_value(ChunkType::Investment("ppf".to_string()))
		.expect("Chunk type must serialize.");

	assert_eq!(value, serde_json::json!("investment_ppf"));

	let parsed: ChunkType =
		serde_json::from_value(serde_json::json!("mutual_funds")).expect("Tag must parse.");

	assert_eq!(parsed, ChunkType::MutualFunds);
	assert!(serde_json::from_value::<ChunkType>(serde_json::json!("budget_plan")).is_err());
}

#[test]
fn every_builder_tag_maps_to_a_rendered_section() {
	for tag in [
		"profile",
		"account",
		"transactions_summary",
		"transaction",
		"goal",
		"investments_holdings",
		"stock",
		"mutual_funds",
		"mutual_fund",
		"other_investments",
		"investment_crypto",
		"insight",
	] {
		let section = ContextSection::for_chunk_type(tag);

		assert!(ContextSection::RENDER_ORDER.contains(&section), "{tag} maps to {section:?}");
	}
}

#[test]
fn expanded_queries_format_end_to_end() {
	let queries = expansion::expand("How much did I spend on food?");
	let results = queries
		.iter()
		.enumerate()
		.map(|(idx, query)| RetrievalResult {
			id: format!("u1_txn_{idx}"),
			text: format!("Transaction {idx}"),
			metadata: ChunkMetadata {
				owner: "u1".to_string(),
				chunk_type: "transaction".to_string(),
				update_token: "gen".to_string(),
				timestamp: "2026-10-19T08:00:00Z".to_string(),
			},
			distance: idx as f32,
			query: query.clone(),
		})
		.collect::<Vec<_>>();
	let rendered = context::format_context(&results);

	assert!(rendered.contains("RECENT TRANSACTIONS:"));
	assert_eq!(rendered.lines().filter(|line| line.starts_with("- ")).count(), results.len());
}
