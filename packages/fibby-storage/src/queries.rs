//! Snapshot reads. Every query is keyed by `user_id`.

use sqlx::PgPool;
use time::OffsetDateTime;

use crate::{
	BoxFuture, Result, SnapshotSource,
	db::Db,
	models::{
		BankAccountRow, GoalRow, HoldingRow, InsightRow, MutualFundRow, OtherInvestmentRow,
		TransactionRow, UserRow,
	},
};
use fibby_domain::snapshot::{FinancialSnapshot, Transaction, TransactionType};

pub const MAX_SNAPSHOT_TRANSACTIONS: i64 = 100;

pub async fn list_owners(pool: &PgPool) -> Result<Vec<String>> {
	let owners = sqlx::query_scalar("SELECT user_id FROM users ORDER BY user_id")
		.fetch_all(pool)
		.await?;

	Ok(owners)
}

pub async fn fetch_snapshot(pool: &PgPool, owner: &str) -> Result<FinancialSnapshot> {
	let fetched_at = OffsetDateTime::now_utc();
	let mut snapshot = FinancialSnapshot::empty(owner, fetched_at);

	snapshot.profile = sqlx::query_as::<_, UserRow>(
		"\
SELECT user_id, name, email, phone, location
FROM users
WHERE user_id = $1",
	)
	.bind(owner)
	.fetch_optional(pool)
	.await?
	.map(Into::into);
	snapshot.account = sqlx::query_as::<_, BankAccountRow>(
		"\
SELECT bank_name, account_type, balance
FROM bank_accounts
WHERE user_id = $1",
	)
	.bind(owner)
	.fetch_optional(pool)
	.await?
	.map(Into::into);

	let transactions: Vec<TransactionRow> = sqlx::query_as(
		"\
SELECT transaction_id, description, amount, transaction_type, category, merchant, txn_date
FROM transactions
WHERE user_id = $1
ORDER BY txn_date DESC NULLS LAST, transaction_id
LIMIT $2",
	)
	.bind(owner)
	.bind(MAX_SNAPSHOT_TRANSACTIONS)
	.fetch_all(pool)
	.await?;

	snapshot.transactions = transactions.into_iter().filter_map(to_transaction).collect();
	snapshot.goals = sqlx::query_as::<_, GoalRow>(
		"\
SELECT goal_id, name, target_amount, saved_amount, auto_save_enabled, auto_save_amount, deadline
FROM goals
WHERE user_id = $1
ORDER BY goal_id",
	)
	.bind(owner)
	.fetch_all(pool)
	.await?
	.into_iter()
	.map(Into::into)
	.collect();
	snapshot.holdings = sqlx::query_as::<_, HoldingRow>(
		"\
SELECT tradingsymbol, exchange, quantity, average_price, last_price
FROM investment_holdings
WHERE user_id = $1
ORDER BY tradingsymbol",
	)
	.bind(owner)
	.fetch_all(pool)
	.await?
	.into_iter()
	.map(Into::into)
	.collect();
	snapshot.mutual_funds = sqlx::query_as::<_, MutualFundRow>(
		"\
SELECT folio, fund, units, average_nav, last_nav, sip_active, sip_monthly_amount, sip_day_of_month
FROM mutual_funds
WHERE user_id = $1
ORDER BY folio",
	)
	.bind(owner)
	.fetch_all(pool)
	.await?
	.into_iter()
	.map(Into::into)
	.collect();
	snapshot.other_investments = sqlx::query_as::<_, OtherInvestmentRow>(
		"\
SELECT
	investment_id,
	investment_type,
	name,
	amount_invested,
	current_value,
	interest_rate,
	maturity_date
FROM other_investments
WHERE user_id = $1
ORDER BY investment_id",
	)
	.bind(owner)
	.fetch_all(pool)
	.await?
	.into_iter()
	.map(Into::into)
	.collect();
	snapshot.insights = sqlx::query_as::<_, InsightRow>(
		"\
SELECT insight_id, insight_type, message
FROM insights
WHERE user_id = $1
ORDER BY created_at DESC, insight_id",
	)
	.bind(owner)
	.fetch_all(pool)
	.await?
	.into_iter()
	.map(Into::into)
	.collect();

	Ok(snapshot)
}

fn to_transaction(row: TransactionRow) -> Option<Transaction> {
	let Some(transaction_type) = TransactionType::parse(&row.transaction_type) else {
		tracing::warn!(
			transaction_id = %row.transaction_id,
			transaction_type = %row.transaction_type,
			"Skipping transaction with unknown type."
		);

		return None;
	};

	Some(Transaction {
		description: row.description,
		amount: row.amount,
		transaction_type,
		category: row.category,
		merchant: row.merchant,
		date: row.txn_date,
	})
}

impl SnapshotSource for Db {
	fn fetch<'a>(&'a self, owner: &'a str) -> BoxFuture<'a, Result<FinancialSnapshot>> {
		Box::pin(fetch_snapshot(&self.pool, owner))
	}

	fn owners(&self) -> BoxFuture<'_, Result<Vec<String>>> {
		Box::pin(list_owners(&self.pool))
	}
}
