//! Per-user financial snapshot read from the backing store before chunking.
//!
//! Every section is optional. An owner with no rows in a table simply has an empty list or
//! `None` for that section.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
	pub owner: String,
	pub profile: Option<Profile>,
	pub account: Option<BankAccount>,
	/// Most recent first.
	#[serde(default)]
	pub transactions: Vec<Transaction>,
	#[serde(default)]
	pub goals: Vec<Goal>,
	#[serde(default)]
	pub holdings: Vec<StockHolding>,
	#[serde(default)]
	pub mutual_funds: Vec<MutualFund>,
	#[serde(default)]
	pub other_investments: Vec<OtherInvestment>,
	#[serde(default)]
	pub insights: Vec<Insight>,
	#[serde(with = "time::serde::rfc3339")]
	pub fetched_at: OffsetDateTime,
}
impl FinancialSnapshot {
	pub fn empty(owner: impl Into<String>, fetched_at: OffsetDateTime) -> Self {
		Self {
			owner: owner.into(),
			profile: None,
			account: None,
			transactions: Vec::new(),
			goals: Vec::new(),
			holdings: Vec::new(),
			mutual_funds: Vec::new(),
			other_investments: Vec::new(),
			insights: Vec::new(),
			fetched_at,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
	pub name: String,
	pub email: String,
	pub phone: Option<String>,
	pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankAccount {
	pub bank_name: String,
	pub account_type: String,
	pub balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
	#[serde(alias = "credit")]
	Income,
	#[serde(alias = "debit")]
	Expense,
}
impl TransactionType {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Income => "income",
			Self::Expense => "expense",
		}
	}

	/// Accepts both the ledger vocabulary (`credit`/`debit`) and the app vocabulary.
	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"income" | "credit" => Some(Self::Income),
			"expense" | "debit" => Some(Self::Expense),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
	pub description: Option<String>,
	pub amount: f64,
	pub transaction_type: TransactionType,
	pub category: String,
	pub merchant: Option<String>,
	pub date: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
	pub goal_id: String,
	pub name: String,
	pub target_amount: f64,
	pub saved_amount: f64,
	pub auto_save_enabled: bool,
	pub auto_save_amount: Option<f64>,
	pub deadline: Option<Date>,
}
impl Goal {
	/// Percent of the target already saved. Targets below one are treated as one.
	pub fn progress_percent(&self) -> f64 {
		self.saved_amount / self.target_amount.max(1.0) * 100.0
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockHolding {
	pub tradingsymbol: String,
	pub exchange: String,
	pub quantity: f64,
	pub average_price: f64,
	pub last_price: f64,
}
impl StockHolding {
	pub fn current_value(&self) -> f64 {
		self.last_price * self.quantity
	}

	pub fn invested(&self) -> f64 {
		self.average_price * self.quantity
	}

	pub fn pnl(&self) -> f64 {
		self.current_value() - self.invested()
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutualFund {
	pub folio: String,
	pub fund: String,
	pub units: f64,
	pub average_nav: f64,
	pub last_nav: f64,
	pub sip: Option<Sip>,
}
impl MutualFund {
	pub fn current_value(&self) -> f64 {
		self.last_nav * self.units
	}

	pub fn invested(&self) -> f64 {
		self.average_nav * self.units
	}

	pub fn pnl(&self) -> f64 {
		self.current_value() - self.invested()
	}

	pub fn active_sip(&self) -> Option<&Sip> {
		self.sip.as_ref().filter(|sip| sip.active)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sip {
	pub active: bool,
	pub monthly_amount: f64,
	/// Day of month the instalment is debited.
	pub day_of_month: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherInvestment {
	pub investment_id: String,
	/// Free-form subtype such as `fd`, `crypto`, `ppf`, `real_estate`.
	pub investment_type: String,
	pub name: String,
	pub amount_invested: f64,
	pub current_value: f64,
	pub interest_rate: Option<f64>,
	pub maturity_date: Option<Date>,
}
impl OtherInvestment {
	pub fn returns_percent(&self) -> f64 {
		if self.amount_invested <= 0.0 {
			return 0.0;
		}

		(self.current_value - self.amount_invested) / self.amount_invested * 100.0
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
	pub insight_id: String,
	pub insight_type: String,
	pub message: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn goal_progress_guards_zero_target() {
		let goal = Goal {
			goal_id: "g".to_string(),
			name: "Emergency fund".to_string(),
			target_amount: 0.0,
			saved_amount: 0.5,
			auto_save_enabled: false,
			auto_save_amount: None,
			deadline: None,
		};

		assert_eq!(goal.progress_percent(), 50.0);
	}

	#[test]
	fn returns_percent_is_zero_without_principal() {
		let investment = OtherInvestment {
			investment_id: "i".to_string(),
			investment_type: "gold".to_string(),
			name: "Gold coin".to_string(),
			amount_invested: 0.0,
			current_value: 1_000.0,
			interest_rate: None,
			maturity_date: None,
		};

		assert_eq!(investment.returns_percent(), 0.0);
	}

	#[test]
	fn parses_ledger_transaction_types() {
		assert_eq!(TransactionType::parse("DEBIT"), Some(TransactionType::Expense));
		assert_eq!(TransactionType::parse("credit"), Some(TransactionType::Income));
		assert_eq!(TransactionType::parse("refund"), None);
	}
}
