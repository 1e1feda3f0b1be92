//! Renders ranked chunks into the context block handed to prompt assembly.

use crate::retrieval::RetrievalResult;

pub const NO_CONTEXT: &str = "No additional context available from user's financial data.";
pub const CONTEXT_START: &str = "=== RETRIEVED USER CONTEXT ===";
pub const CONTEXT_END: &str = "=== END OF RETRIEVED CONTEXT ===";
pub const MAX_TRANSACTION_LINES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSection {
	Profile,
	Account,
	Transactions,
	Goals,
	Investments,
	Budget,
	Other,
}
impl ContextSection {
	/// `Budget` is grouped but has no rendered section, so budget chunks never reach the block.
	pub const RENDER_ORDER: [Self; 6] = [
		Self::Profile,
		Self::Account,
		Self::Goals,
		Self::Transactions,
		Self::Investments,
		Self::Other,
	];

	/// Exact bucket names win, then the `transaction`, `investment` and `goal` prefixes.
	/// Anything else lands in `Other`.
	pub fn for_chunk_type(chunk_type: &str) -> Self {
		match chunk_type {
			"profile" => Self::Profile,
			"account" => Self::Account,
			"transactions" => Self::Transactions,
			"goals" => Self::Goals,
			"investments" => Self::Investments,
			"budget" => Self::Budget,
			other if other.starts_with("transaction") => Self::Transactions,
			other if other.starts_with("investment") => Self::Investments,
			other if other.starts_with("goal") => Self::Goals,
			_ => Self::Other,
		}
	}

	pub fn header(self) -> &'static str {
		match self {
			Self::Profile => "USER PROFILE:",
			Self::Account => "ACCOUNT INFORMATION:",
			Self::Transactions => "RECENT TRANSACTIONS:",
			Self::Goals => "FINANCIAL GOALS:",
			Self::Investments => "INVESTMENT PORTFOLIO:",
			Self::Budget => "BUDGET:",
			Self::Other => "OTHER RELEVANT INFORMATION:",
		}
	}

	fn line_limit(self) -> Option<usize> {
		match self {
			Self::Transactions => Some(MAX_TRANSACTION_LINES),
			_ => None,
		}
	}
}

/// Never returns an empty string. Empty input yields [`NO_CONTEXT`].
pub fn format_context(results: &[RetrievalResult]) -> String {
	if results.is_empty() {
		return NO_CONTEXT.to_string();
	}

	let mut lines = vec![CONTEXT_START.to_string(), String::new()];

	for section in ContextSection::RENDER_ORDER {
		let members = results
			.iter()
			.filter(|result| ContextSection::for_chunk_type(&result.metadata.chunk_type) == section)
			.take(section.line_limit().unwrap_or(usize::MAX))
			.collect::<Vec<_>>();

		if members.is_empty() {
			continue;
		}

		lines.push(section.header().to_string());
		lines.extend(members.into_iter().map(|result| format!("- {}", result.text)));
		lines.push(String::new());
	}

	lines.push(CONTEXT_END.to_string());
	lines.push(String::new());

	lines.join("\n")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::retrieval::ChunkMetadata;

	fn result(id: &str, chunk_type: &str, text: &str, distance: f32) -> RetrievalResult {
		RetrievalResult {
			id: id.to_string(),
			text: text.to_string(),
			metadata: ChunkMetadata {
				owner: "u1".to_string(),
				chunk_type: chunk_type.to_string(),
				update_token: "gen_u1_0_00000000".to_string(),
				timestamp: "2026-01-01T00:00:00Z".to_string(),
			},
			distance,
			query: "q".to_string(),
		}
	}

	#[test]
	fn empty_input_yields_no_context_sentence() {
		assert_eq!(format_context(&[]), NO_CONTEXT);
	}

	#[test]
	fn buckets_follow_prefix_rules() {
		assert_eq!(ContextSection::for_chunk_type("transactions_summary"), ContextSection::Transactions);
		assert_eq!(ContextSection::for_chunk_type("transaction"), ContextSection::Transactions);
		assert_eq!(ContextSection::for_chunk_type("investments_holdings"), ContextSection::Investments);
		assert_eq!(ContextSection::for_chunk_type("investment_fd"), ContextSection::Investments);
		assert_eq!(ContextSection::for_chunk_type("goal"), ContextSection::Goals);
		assert_eq!(ContextSection::for_chunk_type("stock"), ContextSection::Other);
		assert_eq!(ContextSection::for_chunk_type("insight"), ContextSection::Other);
	}

	#[test]
	fn sections_render_in_fixed_order_and_skip_empty_ones() {
		let rendered = format_context(&[
			result("a", "goal", "Goal one", 0.1),
			result("b", "profile", "Profile line", 0.2),
			result("c", "insight", "Insight line", 0.3),
		]);
		let profile = rendered.find("USER PROFILE:").expect("profile section");
		let goals = rendered.find("FINANCIAL GOALS:").expect("goals section");
		let other = rendered.find("OTHER RELEVANT INFORMATION:").expect("other section");

		assert!(rendered.starts_with(CONTEXT_START));
		assert!(rendered.trim_end().ends_with(CONTEXT_END));
		assert!(profile < goals && goals < other);
		assert!(!rendered.contains("ACCOUNT INFORMATION:"));
		assert!(rendered.contains("- Goal one"));
	}

	#[test]
	fn budget_bucket_is_not_rendered() {
		assert_eq!(ContextSection::for_chunk_type("budget"), ContextSection::Budget);
		assert!(!ContextSection::RENDER_ORDER.contains(&ContextSection::Budget));

		let rendered = format_context(&[
			result("a", "budget", "Budget line", 0.1),
			result("b", "account", "Account line", 0.2),
		]);

		assert!(!rendered.contains("BUDGET:"));
		assert!(!rendered.contains("Budget line"));
		assert!(rendered.contains("- Account line"));
	}

	#[test]
	fn transactions_are_capped() {
		let results = (0..14)
			.map(|idx| result(&format!("t{idx}"), "transaction", &format!("Txn {idx}"), idx as f32))
			.collect::<Vec<_>>();
		let rendered = format_context(&results);
		let shown = rendered.lines().filter(|line| line.starts_with("- Txn")).count();

		assert_eq!(shown, MAX_TRANSACTION_LINES);
		assert!(rendered.contains("- Txn 9"));
		assert!(!rendered.contains("- Txn 10"));
	}
}
