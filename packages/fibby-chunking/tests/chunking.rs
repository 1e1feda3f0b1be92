use std::collections::HashSet;

use fibby_chunking::{MAX_TRANSACTION_CHUNKS, build_chunks};
use fibby_domain::{
	chunk::ChunkType,
	snapshot::{FinancialSnapshot, MutualFund, Sip},
};
use fibby_testkit::fixtures::{self, FETCHED_AT, savings_goals_snapshot};

/// The shared full snapshot with enough transactions to hit both caps and a paused SIP.
fn full_snapshot(owner: &str) -> FinancialSnapshot {
	let mut snapshot = fixtures::full_snapshot(owner);

	snapshot.transactions = (0..40)
		.map(|idx| {
			fixtures::expense(
				&format!("Payment {idx}"),
				100.0 + idx as f64,
				&format!("Category {}", idx % 12),
				(idx % 28 + 1) as u8,
			)
		})
		.collect();
	snapshot.mutual_funds.push(MutualFund {
		folio: "F-2".to_string(),
		fund: "Debt Fund".to_string(),
		units: 50.0,
		average_nav: 20.0,
		last_nav: 19.0,
		sip: Some(Sip { active: false, monthly_amount: 1_000.0, day_of_month: None }),
	});

	snapshot
}

#[test]
fn rebuilding_unchanged_snapshot_yields_identical_ids() {
	let snapshot = full_snapshot("u1");
	let first = build_chunks(&snapshot).into_iter().map(|chunk| chunk.id).collect::<HashSet<_>>();
	let second = build_chunks(&snapshot).into_iter().map(|chunk| chunk.id).collect::<HashSet<_>>();

	assert_eq!(first, second);
}

#[test]
fn chunk_ids_are_unique_and_owned() {
	let chunks = build_chunks(&full_snapshot("u1"));
	let ids = chunks.iter().map(|chunk| chunk.id.as_str()).collect::<HashSet<_>>();

	assert_eq!(ids.len(), chunks.len());
	assert!(chunks.iter().all(|chunk| chunk.owner == "u1" && chunk.id.starts_with("u1_")));
}

#[test]
fn full_snapshot_produces_expected_chunk_counts() {
	let chunks = build_chunks(&full_snapshot("u1"));
	let count = |chunk_type: ChunkType| chunks.iter().filter(|chunk| chunk.chunk_type == chunk_type).count();

	assert_eq!(count(ChunkType::Profile), 1);
	assert_eq!(count(ChunkType::Account), 1);
	assert_eq!(count(ChunkType::TransactionsSummary), 1);
	assert_eq!(count(ChunkType::Transaction), MAX_TRANSACTION_CHUNKS);
	assert_eq!(count(ChunkType::Goal), 1);
	assert_eq!(count(ChunkType::InvestmentsHoldings), 1);
	assert_eq!(count(ChunkType::Stock), 1);
	assert_eq!(count(ChunkType::MutualFunds), 1);
	assert_eq!(count(ChunkType::MutualFund), 2);
	assert_eq!(count(ChunkType::OtherInvestments), 1);
	assert_eq!(count(ChunkType::Investment("fd".to_string())), 1);
	assert_eq!(count(ChunkType::Insight), 1);
}

#[test]
fn transaction_chunks_cover_most_recent_rows_only() {
	let chunks = build_chunks(&full_snapshot("u1"));
	let txn_ids = chunks
		.iter()
		.filter(|chunk| chunk.chunk_type == ChunkType::Transaction)
		.map(|chunk| chunk.id.clone())
		.collect::<Vec<_>>();

	assert_eq!(txn_ids.first().map(String::as_str), Some("u1_txn_0"));
	assert_eq!(txn_ids.last().map(String::as_str), Some("u1_txn_29"));
}

#[test]
fn summaries_render_aggregates() {
	let chunks = build_chunks(&full_snapshot("u1"));
	let text_of = |id: &str| {
		chunks
			.iter()
			.find(|chunk| chunk.id == id)
			.map(|chunk| chunk.text.clone())
			.unwrap_or_else(|| panic!("Missing chunk {id}."))
	};

	let summary = text_of("u1_transactions_summary");

	assert!(summary.starts_with("Transaction history: 40 recent transactions."));
	assert_eq!(summary.matches("Category ").count(), 10, "Categories are capped at ten.");

	let holdings = text_of("u1_investments_holdings");

	assert!(holdings.contains("Current value: ₹15000.00"));
	assert!(holdings.contains("Invested: ₹14000.00"));
	assert!(holdings.contains("P&L: ₹1000.00"));

	let funds = text_of("u1_mutual_funds");

	assert!(funds.contains("Active SIPs: 1 with monthly investment of ₹2000.00"));
	assert!(text_of("u1_mf_F-2").contains("No active SIP."));
	assert!(text_of("u1_goal_g1").contains("(40.0% complete)"));
	assert!(text_of("u1_investment_fd1").contains("Returns: 7.00%"));
	assert!(text_of("u1_other_investments").contains("fd: 1 worth ₹53500.00"));
}

#[test]
fn account_and_goals_only_snapshot_yields_four_chunks() {
	let chunks = build_chunks(&savings_goals_snapshot("U1"));

	assert_eq!(chunks.len(), 4);
	assert_eq!(chunks[0].text, "Account balance: ₹24540.00. Bank: HDFC Bank. Account type: Savings.");
	assert!(chunks.iter().all(|chunk| chunk.chunk_type != ChunkType::Transaction));
}

#[test]
fn empty_snapshot_yields_no_chunks() {
	assert!(build_chunks(&FinancialSnapshot::empty("u1", FETCHED_AT)).is_empty());
}
