use std::fmt;

use super::model::{GraphModel, NodeKind};
use super::types::{CalculatorConfig, ConfigError, PriceRange, Stage};

/// Category x tier price ranges, resolved against a built [`GraphModel`].
#[derive(Clone, Debug)]
pub struct PriceTable {
	tiers: usize,
	ranges: Vec<PriceRange>,
}

impl PriceTable {
	/// Fails if any declared category/tier pair lacks a price.
	pub fn from_config(config: &CalculatorConfig, model: &GraphModel) -> Result<Self, ConfigError> {
		let keys = |stage| {
			model
				.stage(stage)
				.iter()
				.map(|&id| model.node(id).key.as_str())
				.collect::<Vec<_>>()
		};
		let (categories, tiers) = (keys(Stage::Category), keys(Stage::Tier));

		let mut ranges = Vec::with_capacity(categories.len() * tiers.len());
		for category in &categories {
			for tier in &tiers {
				let range = config
					.price_table
					.get(*category)
					.and_then(|row| row.get(*tier))
					.ok_or_else(|| ConfigError::MissingPrice {
						category: category.to_string(),
						tier: tier.to_string(),
					})?;
				ranges.push(*range);
			}
		}

		Ok(Self {
			tiers: tiers.len(),
			ranges,
		})
	}

	pub fn range(&self, category_slot: usize, tier_slot: usize) -> PriceRange {
		self.ranges[category_slot * self.tiers + tier_slot]
	}

	/// Price the given category, tier and modifier nodes.
	///
	/// Returns `None` when the kinds don't line up, which a gate-approved
	/// selection never produces.
	pub fn quote(&self, category: &NodeKind, tier: &NodeKind, modifier: &NodeKind) -> Option<Estimate> {
		match (category, tier, modifier) {
			(
				NodeKind::Category { slot: c, .. },
				NodeKind::Tier { slot: t, .. },
				NodeKind::Modifier { discount, .. },
			) => Some(estimate(self.range(*c, *t), *discount)),
			_ => None,
		}
	}
}

/// A discounted price range ready for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Estimate {
	pub low: u64,
	pub high: u64,
	pub discount: u32,
}

pub fn estimate(base: PriceRange, discount: u32) -> Estimate {
	let factor = 1.0 - f64::from(discount.min(100)) / 100.0;
	let apply = |v: u64| (v as f64 * factor).round() as u64;
	Estimate {
		low: apply(base.min),
		high: apply(base.max),
		discount,
	}
}

/// `1234567` -> `"1,234,567"`.
pub fn group_thousands(value: u64) -> String {
	let digits = value.to_string();
	let mut out = String::with_capacity(digits.len() + digits.len() / 3);
	for (i, ch) in digits.chars().enumerate() {
		if i > 0 && (digits.len() - i) % 3 == 0 {
			out.push(',');
		}
		out.push(ch);
	}
	out
}

impl fmt::Display for Estimate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"${} – ${} ({}% off)",
			group_thousands(self.low),
			group_thousands(self.high),
			self.discount
		)
	}
}
