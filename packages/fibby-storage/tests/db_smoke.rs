use fibby_config::Postgres;
use fibby_storage::{SnapshotSource, db::Db};
use fibby_testkit::TestDatabase;

#[tokio::test]
#[ignore = "Requires external Postgres. Set FIBBY_PG_DSN to run."]
async fn snapshot_reads_seeded_rows() {
	let Some(base_dsn) = fibby_testkit::env_dsn() else {
		eprintln!("Skipping snapshot_reads_seeded_rows; set FIBBY_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");
	db.ensure_schema().await.expect("Schema bootstrap must be repeatable.");

	for statement in [
		"INSERT INTO users (user_id, name, email) VALUES ('u1', 'Asha', 'asha@example.com')",
		"INSERT INTO bank_accounts (user_id, bank_name, account_type, balance) VALUES ('u1', 'HDFC Bank', 'Savings', 24540)",
		"INSERT INTO goals (goal_id, user_id, name, target_amount, saved_amount) VALUES ('g1', 'u1', 'Trip', 30000, 12000)",
		"INSERT INTO transactions (transaction_id, user_id, amount, transaction_type, category, txn_date) VALUES ('t1', 'u1', 250, 'debit', 'food', '2026-02-01')",
		"INSERT INTO transactions (transaction_id, user_id, amount, transaction_type, category, txn_date) VALUES ('t2', 'u1', 900, 'debit', 'travel', '2026-02-10')",
	] {
		sqlx::query(statement).execute(&db.pool).await.expect("Failed to seed row.");
	}

	let owners = db.owners().await.expect("Failed to list owners.");
	let snapshot = db.fetch("u1").await.expect("Failed to fetch snapshot.");

	assert_eq!(owners, vec!["u1".to_string()]);
	assert_eq!(snapshot.account.map(|account| account.balance), Some(24_540.0));
	assert_eq!(snapshot.goals.len(), 1);
	assert_eq!(snapshot.transactions.len(), 2);
	assert_eq!(snapshot.transactions[0].category, "travel");

	let missing = db.fetch("nobody").await.expect("Unknown owners read as empty.");

	assert!(missing.profile.is_none());
	assert!(missing.goals.is_empty());

	drop(db);
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
