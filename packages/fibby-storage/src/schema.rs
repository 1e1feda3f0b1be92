pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_users.sql" => out.push_str(include_str!("../../../sql/tables/001_users.sql")),
				"tables/002_bank_accounts.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_bank_accounts.sql")),
				"tables/003_transactions.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_transactions.sql")),
				"tables/004_goals.sql" => out.push_str(include_str!("../../../sql/tables/004_goals.sql")),
				"tables/005_investment_holdings.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_investment_holdings.sql")),
				"tables/006_mutual_funds.sql" =>
					out.push_str(include_str!("../../../sql/tables/006_mutual_funds.sql")),
				"tables/007_other_investments.sql" =>
					out.push_str(include_str!("../../../sql/tables/007_other_investments.sql")),
				"tables/008_insights.sql" =>
					out.push_str(include_str!("../../../sql/tables/008_insights.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn includes_are_expanded() {
		let sql = render_schema();

		assert!(!sql.contains("\\ir "));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS transactions"));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS insights"));
	}
}
