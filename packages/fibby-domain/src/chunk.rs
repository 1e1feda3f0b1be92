use std::fmt;

use serde::{Deserialize, Serialize};

/// One retrievable unit of rendered text describing a single financial fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
	/// Deterministic for a given owner and semantic source.
	pub id: String,
	pub text: String,
	pub chunk_type: ChunkType,
	pub owner: String,
}

/// Closed set of chunk tags. `Investment` carries the subtype of an other-investment row and
/// renders as `investment_<subtype>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChunkType {
	Profile,
	Account,
	TransactionsSummary,
	Transaction,
	Goal,
	InvestmentsHoldings,
	Stock,
	MutualFunds,
	MutualFund,
	OtherInvestments,
	Investment(String),
	Insight,
}
impl ChunkType {
	pub fn as_tag(&self) -> String {
		match self {
			Self::Investment(subtype) => format!("investment_{subtype}"),
			other => other.fixed_tag().unwrap_or_default().to_string(),
		}
	}

	pub fn parse(tag: &str) -> Option<Self> {
		let parsed = match tag {
			"profile" => Self::Profile,
			"account" => Self::Account,
			"transactions_summary" => Self::TransactionsSummary,
			"transaction" => Self::Transaction,
			"goal" => Self::Goal,
			"investments_holdings" => Self::InvestmentsHoldings,
			"stock" => Self::Stock,
			"mutual_funds" => Self::MutualFunds,
			"mutual_fund" => Self::MutualFund,
			"other_investments" => Self::OtherInvestments,
			"insight" => Self::Insight,
			other => {
				let subtype = other.strip_prefix("investment_")?;

				if subtype.is_empty() {
					return None;
				}

				Self::Investment(subtype.to_string())
			},
		};

		Some(parsed)
	}

	fn fixed_tag(&self) -> Option<&'static str> {
		let tag = match self {
			Self::Profile => "profile",
			Self::Account => "account",
			Self::TransactionsSummary => "transactions_summary",
			Self::Transaction => "transaction",
			Self::Goal => "goal",
			Self::InvestmentsHoldings => "investments_holdings",
			Self::Stock => "stock",
			Self::MutualFunds => "mutual_funds",
			Self::MutualFund => "mutual_fund",
			Self::OtherInvestments => "other_investments",
			Self::Insight => "insight",
			Self::Investment(_) => return None,
		};

		Some(tag)
	}
}
impl fmt::Display for ChunkType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.as_tag())
	}
}
impl Serialize for ChunkType {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(&self.as_tag())
	}
}
impl<'de> Deserialize<'de> for ChunkType {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		Self::parse(&raw)
			.ok_or_else(|| serde::de::Error::custom(format!("Unknown chunk type {raw:?}.")))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tags_round_trip_through_parse() {
		for chunk_type in [
			ChunkType::Profile,
			ChunkType::TransactionsSummary,
			ChunkType::MutualFund,
			ChunkType::Investment("fd".to_string()),
		] {
			assert_eq!(ChunkType::parse(&chunk_type.as_tag()), Some(chunk_type));
		}
	}

	#[test]
	fn investment_subtype_renders_with_prefix() {
		assert_eq!(ChunkType::Investment("real_estate".to_string()).to_string(), "investment_real_estate");
		assert_eq!(ChunkType::parse("investment_"), None);
		assert_eq!(ChunkType::parse("budget"), None);
	}
}
