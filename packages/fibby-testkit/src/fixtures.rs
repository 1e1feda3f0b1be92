//! Sample financial snapshots.

use time::{Date, Month, OffsetDateTime, macros::datetime};

use fibby_domain::snapshot::{
	BankAccount, FinancialSnapshot, Goal, Insight, MutualFund, OtherInvestment, Profile, Sip,
	StockHolding, Transaction, TransactionType,
};

pub const FETCHED_AT: OffsetDateTime = datetime!(2026-03-01 09:30 UTC);

pub fn account(balance: f64) -> BankAccount {
	BankAccount {
		bank_name: "HDFC Bank".to_string(),
		account_type: "Savings".to_string(),
		balance,
	}
}

pub fn goal(goal_id: &str, name: &str, target: f64, saved: f64) -> Goal {
	Goal {
		goal_id: goal_id.to_string(),
		name: name.to_string(),
		target_amount: target,
		saved_amount: saved,
		auto_save_enabled: false,
		auto_save_amount: None,
		deadline: None,
	}
}

pub fn expense(description: &str, amount: f64, category: &str, day: u8) -> Transaction {
	Transaction {
		description: Some(description.to_string()),
		amount,
		transaction_type: TransactionType::Expense,
		category: category.to_string(),
		merchant: None,
		date: Date::from_calendar_date(2026, Month::February, day).ok(),
	}
}

/// One account holding ₹24,540 and three savings goals. No transactions.
pub fn savings_goals_snapshot(owner: &str) -> FinancialSnapshot {
	let mut snapshot = FinancialSnapshot::empty(owner, FETCHED_AT);

	snapshot.account = Some(account(24_540.0));
	snapshot.goals = vec![
		goal("g1", "Emergency fund", 100_000.0, 40_000.0),
		goal("g2", "Goa trip", 30_000.0, 12_000.0),
		goal("g3", "New laptop", 80_000.0, 20_000.0),
	];

	snapshot
}

/// Every section populated.
pub fn full_snapshot(owner: &str) -> FinancialSnapshot {
	let mut snapshot = FinancialSnapshot::empty(owner, FETCHED_AT);

	snapshot.profile = Some(Profile {
		name: "Asha Rao".to_string(),
		email: format!("{owner}@example.com"),
		phone: None,
		location: Some("Bengaluru".to_string()),
	});
	snapshot.account = Some(account(52_000.0));
	snapshot.transactions = vec![
		Transaction {
			description: Some("Salary".to_string()),
			amount: 85_000.0,
			transaction_type: TransactionType::Income,
			category: "salary".to_string(),
			merchant: None,
			date: Date::from_calendar_date(2026, Month::February, 28).ok(),
		},
		expense("Groceries", 3_200.0, "food", 20),
		expense("Movie night", 900.0, "entertainment", 14),
		expense("Electricity bill", 2_100.0, "utilities", 5),
	];
	snapshot.goals = vec![goal("g1", "Emergency fund", 100_000.0, 40_000.0)];
	snapshot.holdings = vec![StockHolding {
		tradingsymbol: "INFY".to_string(),
		exchange: "NSE".to_string(),
		quantity: 10.0,
		average_price: 1_400.0,
		last_price: 1_500.0,
	}];
	snapshot.mutual_funds = vec![MutualFund {
		folio: "F-1".to_string(),
		fund: "Nifty Index Fund".to_string(),
		units: 100.0,
		average_nav: 50.0,
		last_nav: 55.0,
		sip: Some(Sip { active: true, monthly_amount: 2_000.0, day_of_month: Some(5) }),
	}];
	snapshot.other_investments = vec![OtherInvestment {
		investment_id: "fd1".to_string(),
		investment_type: "fd".to_string(),
		name: "SBI fixed deposit".to_string(),
		amount_invested: 50_000.0,
		current_value: 53_500.0,
		interest_rate: Some(7.0),
		maturity_date: None,
	}];
	snapshot.insights = vec![Insight {
		insight_id: "i1".to_string(),
		insight_type: "spending".to_string(),
		message: "Entertainment spending rose this month.".to_string(),
	}];

	snapshot
}
