use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

/// Layout shipped with the widget.
const BUILTIN_LAYOUT: &str = include_str!("calculator.json");

/// The five ordered layers of the decision graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
	Entry,
	Category,
	Tier,
	Modifier,
	Result,
}

impl Stage {
	pub const ALL: [Stage; 5] = [
		Stage::Entry,
		Stage::Category,
		Stage::Tier,
		Stage::Modifier,
		Stage::Result,
	];

	pub fn index(self) -> usize {
		self as usize
	}
}

/// A `[min, max]` price pair from the price table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "[u64; 2]")]
pub struct PriceRange {
	pub min: u64,
	pub max: u64,
}

impl From<[u64; 2]> for PriceRange {
	fn from([min, max]: [u64; 2]) -> Self {
		Self { min, max }
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct NodeSpec {
	pub id: String,
	#[serde(default)]
	pub attributes: BTreeMap<String, String>,
}

impl NodeSpec {
	pub fn label(&self) -> &str {
		self.attributes
			.get("label")
			.map(String::as_str)
			.unwrap_or(&self.id)
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct StageSpec {
	pub name: Stage,
	pub nodes: Vec<NodeSpec>,
}

/// Static declarative input of the calculator.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorConfig {
	pub stages: Vec<StageSpec>,
	pub price_table: BTreeMap<String, BTreeMap<String, PriceRange>>,
	pub modifier_discount: BTreeMap<String, u32>,
}

impl CalculatorConfig {
	pub fn from_json(json: &str) -> Result<Self, ConfigError> {
		Ok(serde_json::from_str(json)?)
	}

	pub fn builtin() -> Result<Self, ConfigError> {
		Self::from_json(BUILTIN_LAYOUT)
	}
}

/// Setup failures. None of these are recoverable once the widget is live.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("malformed calculator layout: {0}")]
	Malformed(#[from] serde_json::Error),
	#[error("node id `{0}` is declared more than once")]
	DuplicateNode(String),
	#[error("no price for category `{category}` at tier `{tier}`")]
	MissingPrice { category: String, tier: String },
	#[error("modifier `{0}` has no discount")]
	MissingDiscount(String),
	#[error("modifier `{id}` discount of {percent}% exceeds 100%")]
	DiscountOutOfRange { id: String, percent: u32 },
}
