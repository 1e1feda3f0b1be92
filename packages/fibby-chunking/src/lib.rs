//! Turns a [`FinancialSnapshot`] into short, self-contained text chunks.
//!
//! Chunk ids are `<owner>_<discriminator>` so rebuilding an unchanged snapshot yields the same
//! id set. Absent sections produce no chunks.

use std::collections::{BTreeMap, HashMap};

use fibby_domain::{
	chunk::{Chunk, ChunkType},
	snapshot::{
		BankAccount, FinancialSnapshot, Goal, Insight, MutualFund, OtherInvestment, Profile,
		StockHolding, Transaction, TransactionType,
	},
};

/// Individual transaction chunks cover only the most recent rows.
pub const MAX_TRANSACTION_CHUNKS: usize = 30;
pub const MAX_SUMMARY_CATEGORIES: usize = 10;

pub fn build_chunks(snapshot: &FinancialSnapshot) -> Vec<Chunk> {
	let mut builder = ChunkSet::new(&snapshot.owner);

	if let Some(profile) = snapshot.profile.as_ref() {
		builder.push("profile", ChunkType::Profile, profile_text(profile));
	}
	if let Some(account) = snapshot.account.as_ref() {
		builder.push("account", ChunkType::Account, account_text(account));
	}
	if !snapshot.transactions.is_empty() {
		builder.push(
			"transactions_summary",
			ChunkType::TransactionsSummary,
			transactions_summary_text(&snapshot.transactions),
		);

		for (idx, txn) in snapshot.transactions.iter().take(MAX_TRANSACTION_CHUNKS).enumerate() {
			builder.push(format!("txn_{idx}"), ChunkType::Transaction, transaction_text(txn));
		}
	}

	for goal in &snapshot.goals {
		builder.push(format!("goal_{}", goal.goal_id), ChunkType::Goal, goal_text(goal));
	}

	if !snapshot.holdings.is_empty() {
		builder.push(
			"investments_holdings",
			ChunkType::InvestmentsHoldings,
			holdings_summary_text(&snapshot.holdings),
		);

		for holding in &snapshot.holdings {
			builder.push(
				format!("stock_{}", holding.tradingsymbol),
				ChunkType::Stock,
				stock_text(holding),
			);
		}
	}
	if !snapshot.mutual_funds.is_empty() {
		builder.push(
			"mutual_funds",
			ChunkType::MutualFunds,
			mutual_funds_summary_text(&snapshot.mutual_funds),
		);

		for fund in &snapshot.mutual_funds {
			builder.push(format!("mf_{}", fund.folio), ChunkType::MutualFund, mutual_fund_text(fund));
		}
	}
	if !snapshot.other_investments.is_empty() {
		builder.push(
			"other_investments",
			ChunkType::OtherInvestments,
			other_investments_summary_text(&snapshot.other_investments),
		);

		for investment in &snapshot.other_investments {
			builder.push(
				format!("investment_{}", investment.investment_id),
				ChunkType::Investment(normalize_subtype(&investment.investment_type)),
				other_investment_text(investment),
			);
		}
	}

	for insight in &snapshot.insights {
		builder.push(format!("insight_{}", insight.insight_id), ChunkType::Insight, insight_text(insight));
	}

	let chunks = builder.finish();

	tracing::debug!(owner = %snapshot.owner, chunk_count = chunks.len(), "Built chunks.");

	chunks
}

/// Unique within one owner only. Vector stores key records by `(owner, id)`.
pub fn chunk_id(owner: &str, discriminator: &str) -> String {
	format!("{owner}_{discriminator}")
}

/// Ordered chunk list where a repeated id replaces the earlier chunk in place.
struct ChunkSet<'a> {
	owner: &'a str,
	chunks: Vec<Chunk>,
	positions: HashMap<String, usize>,
}
impl<'a> ChunkSet<'a> {
	fn new(owner: &'a str) -> Self {
		Self { owner, chunks: Vec::new(), positions: HashMap::new() }
	}

	fn push(&mut self, discriminator: impl AsRef<str>, chunk_type: ChunkType, text: String) {
		let id = chunk_id(self.owner, discriminator.as_ref());
		let chunk = Chunk { id: id.clone(), text, chunk_type, owner: self.owner.to_string() };

		match self.positions.get(&id) {
			Some(&position) => {
				tracing::debug!(chunk_id = %id, "Chunk id collision; keeping the later chunk.");

				self.chunks[position] = chunk;
			},
			None => {
				self.positions.insert(id, self.chunks.len());
				self.chunks.push(chunk);
			},
		}
	}

	fn finish(self) -> Vec<Chunk> {
		self.chunks
	}
}

fn rupees(amount: f64) -> String {
	format!("₹{amount:.2}")
}

fn normalize_subtype(raw: &str) -> String {
	let normalized = raw.trim().to_ascii_lowercase().replace([' ', '-'], "_");

	if normalized.is_empty() { "other".to_string() } else { normalized }
}

fn profile_text(profile: &Profile) -> String {
	let mut text = format!("User {} ({})", profile.name, profile.email);

	if let Some(phone) = profile.phone.as_deref() {
		text.push_str(&format!(", phone {phone}"));
	}
	if let Some(location) = profile.location.as_deref() {
		text.push_str(&format!(", based in {location}"));
	}

	text.push_str(". Profile information.");

	text
}

fn account_text(account: &BankAccount) -> String {
	format!(
		"Account balance: {}. Bank: {}. Account type: {}.",
		rupees(account.balance),
		account.bank_name,
		account.account_type
	)
}

fn transactions_summary_text(transactions: &[Transaction]) -> String {
	let mut income = 0.0;
	let mut expense = 0.0;
	let mut categories: Vec<&str> = Vec::new();

	for txn in transactions {
		match txn.transaction_type {
			TransactionType::Income => income += txn.amount,
			TransactionType::Expense => expense += txn.amount,
		}

		if categories.len() < MAX_SUMMARY_CATEGORIES && !categories.contains(&txn.category.as_str())
		{
			categories.push(txn.category.as_str());
		}
	}

	format!(
		"Transaction history: {} recent transactions. Total income: {}. Total expense: {}. Categories: {}.",
		transactions.len(),
		rupees(income),
		rupees(expense),
		categories.join(", ")
	)
}

fn transaction_text(txn: &Transaction) -> String {
	let merchant = txn.merchant.as_deref().unwrap_or("Unknown");
	let description = txn.description.as_deref().unwrap_or(merchant);
	let mut text = format!(
		"Transaction: {description} - {} ({}) in {} category at {merchant}",
		rupees(txn.amount),
		txn.transaction_type.as_str(),
		txn.category
	);

	if let Some(date) = txn.date {
		text.push_str(&format!(" on {date}"));
	}

	text
}

fn goal_text(goal: &Goal) -> String {
	let auto_save = match (goal.auto_save_enabled, goal.auto_save_amount) {
		(true, Some(amount)) => format!("Auto-save enabled at {} per cycle.", rupees(amount)),
		(true, None) => "Auto-save enabled.".to_string(),
		(false, _) => "Auto-save disabled.".to_string(),
	};
	let mut text = format!(
		"Financial goal: {} - Target: {}, Saved: {} ({:.1}% complete). {auto_save}",
		goal.name,
		rupees(goal.target_amount),
		rupees(goal.saved_amount),
		goal.progress_percent()
	);

	if let Some(deadline) = goal.deadline {
		text.push_str(&format!(" Deadline: {deadline}."));
	}

	text
}

fn holdings_summary_text(holdings: &[StockHolding]) -> String {
	let value: f64 = holdings.iter().map(StockHolding::current_value).sum();
	let invested: f64 = holdings.iter().map(StockHolding::invested).sum();

	format!(
		"Stock holdings: {} stocks. Current value: {}. Invested: {}. P&L: {}.",
		holdings.len(),
		rupees(value),
		rupees(invested),
		rupees(value - invested)
	)
}

fn stock_text(holding: &StockHolding) -> String {
	format!(
		"Stock holding: {} on {} - {} shares at average price {}, last price {}. P&L: {}.",
		holding.tradingsymbol,
		holding.exchange,
		holding.quantity,
		rupees(holding.average_price),
		rupees(holding.last_price),
		rupees(holding.pnl())
	)
}

fn mutual_funds_summary_text(funds: &[MutualFund]) -> String {
	let value: f64 = funds.iter().map(MutualFund::current_value).sum();
	let invested: f64 = funds.iter().map(MutualFund::invested).sum();
	let active_sips = funds.iter().filter_map(MutualFund::active_sip).collect::<Vec<_>>();
	let monthly: f64 = active_sips.iter().map(|sip| sip.monthly_amount).sum();

	format!(
		"Mutual funds: {} funds. Current value: {}. Invested: {}. P&L: {}. Active SIPs: {} with monthly investment of {}.",
		funds.len(),
		rupees(value),
		rupees(invested),
		rupees(value - invested),
		active_sips.len(),
		rupees(monthly)
	)
}

fn mutual_fund_text(fund: &MutualFund) -> String {
	let sip = match fund.active_sip() {
		Some(sip) => match sip.day_of_month {
			Some(day) => format!("SIP of {} monthly on day {day}.", rupees(sip.monthly_amount)),
			None => format!("SIP of {} monthly.", rupees(sip.monthly_amount)),
		},
		None => "No active SIP.".to_string(),
	};

	format!(
		"Mutual fund: {} (folio {}) - {:.3} units at NAV {}, invested {}. P&L: {}. {sip}",
		fund.fund,
		fund.folio,
		fund.units,
		rupees(fund.last_nav),
		rupees(fund.invested()),
		rupees(fund.pnl())
	)
}

fn other_investments_summary_text(investments: &[OtherInvestment]) -> String {
	let mut by_type: BTreeMap<String, (usize, f64)> = BTreeMap::new();

	for investment in investments {
		let entry = by_type.entry(normalize_subtype(&investment.investment_type)).or_default();

		entry.0 += 1;
		entry.1 += investment.current_value;
	}

	let value: f64 = investments.iter().map(|investment| investment.current_value).sum();
	let invested: f64 = investments.iter().map(|investment| investment.amount_invested).sum();
	let groups = by_type
		.iter()
		.map(|(kind, (count, total))| format!("{kind}: {count} worth {}", rupees(*total)))
		.collect::<Vec<_>>()
		.join("; ");

	format!(
		"Other investments: {} holdings. Current value: {}. Invested: {}. By type: {groups}.",
		investments.len(),
		rupees(value),
		rupees(invested)
	)
}

fn other_investment_text(investment: &OtherInvestment) -> String {
	let mut text = format!(
		"Investment ({}): {} - Invested: {}, Current value: {}, Returns: {:.2}%.",
		investment.investment_type,
		investment.name,
		rupees(investment.amount_invested),
		rupees(investment.current_value),
		investment.returns_percent()
	);

	if let Some(rate) = investment.interest_rate {
		text.push_str(&format!(" Interest rate: {rate:.2}%."));
	}
	if let Some(maturity) = investment.maturity_date {
		text.push_str(&format!(" Matures on {maturity}."));
	}

	text
}

fn insight_text(insight: &Insight) -> String {
	format!("Insight ({}): {}", insight.insight_type, insight.message)
}
