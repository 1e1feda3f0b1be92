//! Keyword-triggered query expansion.
//!
//! Each group is evaluated independently against the lowercased question. Every group that
//! matches appends its queries, so the output may repeat a phrase; duplicates are harmless
//! because retrieval deduplicates by chunk id.

pub struct ExpansionGroup {
	pub name: &'static str,
	pub keywords: &'static [&'static str],
	pub queries: &'static [&'static str],
}
impl ExpansionGroup {
	/// `lowered` must already be lowercase.
	fn matches(&self, lowered: &str) -> bool {
		self.keywords.iter().any(|keyword| lowered.contains(keyword))
	}
}

pub const EXPANSION_GROUPS: &[ExpansionGroup] = &[
	ExpansionGroup {
		name: "affordability",
		keywords: &["afford", "buy", "purchase", "can i"],
		queries: &[
			"current account balance",
			"monthly budget and spending",
			"upcoming bills and payments",
			"recent expenses",
		],
	},
	ExpansionGroup {
		name: "goals",
		keywords: &["goal", "save", "saving", "target"],
		queries: &["financial goals and savings"],
	},
	ExpansionGroup {
		name: "travel",
		keywords: &["trip", "travel", "vacation", "goa", "holiday"],
		queries: &["travel goals", "travel expenses", "entertainment spending"],
	},
	ExpansionGroup {
		name: "spending",
		keywords: &["spend", "spent", "spending", "expenses"],
		queries: &["recent transactions", "spending by category", "monthly expenses"],
	},
	ExpansionGroup {
		name: "investing",
		keywords: &["invest", "portfolio", "stocks", "mutual fund", "sip"],
		queries: &["investment holdings", "mutual funds portfolio", "SIP investments"],
	},
	ExpansionGroup {
		name: "budgeting",
		keywords: &["budget", "monthly"],
		queries: &["monthly budget", "spending limits", "budget status"],
	},
];

/// Expands one question into the question itself followed by every matching group's queries.
pub fn expand(question: &str) -> Vec<String> {
	let lowered = question.to_lowercase();
	let mut queries = vec![question.to_string()];

	for group in EXPANSION_GROUPS {
		if group.matches(&lowered) {
			queries.extend(group.queries.iter().map(|query| query.to_string()));
		}
	}

	queries
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn original_question_comes_first() {
		let queries = expand("Hello there");

		assert_eq!(queries, vec!["Hello there".to_string()]);
	}

	#[test]
	fn goa_trip_triggers_affordability_and_travel() {
		let queries = expand("Can I afford a Goa trip?");

		assert_eq!(queries[0], "Can I afford a Goa trip?");
		assert!(queries.iter().any(|query| query == "current account balance"));
		assert_eq!(queries.len(), 1 + 4 + 3);
		assert_eq!(queries[5], "travel goals");
	}

	#[test]
	fn matching_is_case_insensitive() {
		assert_eq!(
			expand("MY PORTFOLIO"),
			vec!["MY PORTFOLIO", "investment holdings", "mutual funds portfolio", "SIP investments"]
		);
	}

	#[test]
	fn multiple_groups_accumulate() {
		let queries = expand("monthly spending budget");

		assert_eq!(queries.len(), 1 + 3 + 3);
		assert_eq!(queries[1], "recent transactions");
		assert_eq!(queries[4], "monthly budget");
	}
}
