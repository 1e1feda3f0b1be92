use time::Date;

use fibby_domain::snapshot::{
	BankAccount, Goal, Insight, MutualFund, OtherInvestment, Profile, Sip, StockHolding,
};

#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
	pub user_id: String,
	pub name: String,
	pub email: String,
	pub phone: Option<String>,
	pub location: Option<String>,
}
impl From<UserRow> for Profile {
	fn from(row: UserRow) -> Self {
		Self { name: row.name, email: row.email, phone: row.phone, location: row.location }
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct BankAccountRow {
	pub bank_name: String,
	pub account_type: String,
	pub balance: f64,
}
impl From<BankAccountRow> for BankAccount {
	fn from(row: BankAccountRow) -> Self {
		Self { bank_name: row.bank_name, account_type: row.account_type, balance: row.balance }
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct TransactionRow {
	pub transaction_id: String,
	pub description: Option<String>,
	pub amount: f64,
	pub transaction_type: String,
	pub category: String,
	pub merchant: Option<String>,
	pub txn_date: Option<Date>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct GoalRow {
	pub goal_id: String,
	pub name: String,
	pub target_amount: f64,
	pub saved_amount: f64,
	pub auto_save_enabled: bool,
	pub auto_save_amount: Option<f64>,
	pub deadline: Option<Date>,
}
impl From<GoalRow> for Goal {
	fn from(row: GoalRow) -> Self {
		Self {
			goal_id: row.goal_id,
			name: row.name,
			target_amount: row.target_amount,
			saved_amount: row.saved_amount,
			auto_save_enabled: row.auto_save_enabled,
			auto_save_amount: row.auto_save_amount,
			deadline: row.deadline,
		}
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct HoldingRow {
	pub tradingsymbol: String,
	pub exchange: String,
	pub quantity: f64,
	pub average_price: f64,
	pub last_price: f64,
}
impl From<HoldingRow> for StockHolding {
	fn from(row: HoldingRow) -> Self {
		Self {
			tradingsymbol: row.tradingsymbol,
			exchange: row.exchange,
			quantity: row.quantity,
			average_price: row.average_price,
			last_price: row.last_price,
		}
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct MutualFundRow {
	pub folio: String,
	pub fund: String,
	pub units: f64,
	pub average_nav: f64,
	pub last_nav: f64,
	pub sip_active: Option<bool>,
	pub sip_monthly_amount: Option<f64>,
	pub sip_day_of_month: Option<i16>,
}
impl From<MutualFundRow> for MutualFund {
	fn from(row: MutualFundRow) -> Self {
		// A fund without any SIP columns set has never had a SIP.
		let sip = match (row.sip_active, row.sip_monthly_amount) {
			(None, None) => None,
			(active, amount) => Some(Sip {
				active: active.unwrap_or(false),
				monthly_amount: amount.unwrap_or_default(),
				day_of_month: row.sip_day_of_month.and_then(|day| u8::try_from(day).ok()),
			}),
		};

		Self {
			folio: row.folio,
			fund: row.fund,
			units: row.units,
			average_nav: row.average_nav,
			last_nav: row.last_nav,
			sip,
		}
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct OtherInvestmentRow {
	pub investment_id: String,
	pub investment_type: String,
	pub name: String,
	pub amount_invested: f64,
	pub current_value: f64,
	pub interest_rate: Option<f64>,
	pub maturity_date: Option<Date>,
}
impl From<OtherInvestmentRow> for OtherInvestment {
	fn from(row: OtherInvestmentRow) -> Self {
		Self {
			investment_id: row.investment_id,
			investment_type: row.investment_type,
			name: row.name,
			amount_invested: row.amount_invested,
			current_value: row.current_value,
			interest_rate: row.interest_rate,
			maturity_date: row.maturity_date,
		}
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct InsightRow {
	pub insight_id: String,
	pub insight_type: String,
	pub message: String,
}
impl From<InsightRow> for Insight {
	fn from(row: InsightRow) -> Self {
		Self { insight_id: row.insight_id, insight_type: row.insight_type, message: row.message }
	}
}
