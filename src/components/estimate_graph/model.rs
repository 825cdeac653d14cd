use std::collections::HashSet;

use super::types::{CalculatorConfig, ConfigError, Stage};

/// Index of a node inside its [`GraphModel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// What a node is, with only the data its stage needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
	Entry,
	/// `slot` is the row of this category in the price table.
	Category { slot: usize },
	/// `slot` is the column of this tier in the price table.
	Tier { slot: usize },
	Modifier { discount: u32 },
	Result,
}

impl NodeKind {
	pub fn stage(&self) -> Stage {
		match self {
			NodeKind::Entry => Stage::Entry,
			NodeKind::Category { .. } => Stage::Category,
			NodeKind::Tier { .. } => Stage::Tier,
			NodeKind::Modifier { .. } => Stage::Modifier,
			NodeKind::Result => Stage::Result,
		}
	}
}

#[derive(Clone, Debug)]
pub struct Node {
	pub id: NodeId,
	pub key: String,
	pub label: String,
	pub kind: NodeKind,
	pub enabled: bool,
	pub selected: bool,
}

impl Node {
	pub fn stage(&self) -> Stage {
		self.kind.stage()
	}
}

/// Nodes of the decision graph grouped by stage.
#[derive(Clone, Debug)]
pub struct GraphModel {
	nodes: Vec<Node>,
	stages: [Vec<NodeId>; 5],
}

impl GraphModel {
	/// Enumerate the configured nodes in stage order.
	///
	/// Tier and Modifier nodes start disabled; everything else is clickable
	/// from the outset.
	pub fn build_layout(config: &CalculatorConfig) -> Result<Self, ConfigError> {
		let mut nodes = Vec::new();
		let mut stages: [Vec<NodeId>; 5] = Default::default();
		let mut seen = HashSet::new();

		for stage in Stage::ALL {
			let specs = config
				.stages
				.iter()
				.filter(|s| s.name == stage)
				.flat_map(|s| s.nodes.iter());
			for (slot, spec) in specs.enumerate() {
				if !seen.insert(spec.id.clone()) {
					return Err(ConfigError::DuplicateNode(spec.id.clone()));
				}
				let key = spec.id.clone();
				let kind = match stage {
					Stage::Entry => NodeKind::Entry,
					Stage::Category => NodeKind::Category { slot },
					Stage::Tier => NodeKind::Tier { slot },
					Stage::Modifier => {
						let Some(&discount) = config.modifier_discount.get(&key) else {
							return Err(ConfigError::MissingDiscount(key));
						};
						if discount > 100 {
							return Err(ConfigError::DiscountOutOfRange {
								id: key,
								percent: discount,
							});
						}
						NodeKind::Modifier { discount }
					}
					Stage::Result => NodeKind::Result,
				};
				let id = NodeId(nodes.len());
				nodes.push(Node {
					id,
					key,
					label: spec.label().to_owned(),
					kind,
					enabled: !matches!(stage, Stage::Tier | Stage::Modifier),
					selected: false,
				});
				stages[stage.index()].push(id);
			}
		}

		Ok(Self { nodes, stages })
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn node(&self, id: NodeId) -> &Node {
		&self.nodes[id.0]
	}

	pub fn stage(&self, stage: Stage) -> &[NodeId] {
		&self.stages[stage.index()]
	}

	#[cfg(test)]
	pub fn find(&self, key: &str) -> Option<NodeId> {
		self.nodes.iter().find(|n| n.key == key).map(|n| n.id)
	}

	/// Cross product of every pair of adjacent stages, in stage order.
	pub fn all_edges(&self) -> Vec<(NodeId, NodeId)> {
		self.stages
			.windows(2)
			.flat_map(|pair| {
				pair[0]
					.iter()
					.flat_map(move |&from| pair[1].iter().map(move |&to| (from, to)))
			})
			.collect()
	}

	pub fn enable_stage(&mut self, stage: Stage) {
		for &id in &self.stages[stage.index()] {
			self.nodes[id.0].enabled = true;
		}
	}

	/// Mark `id` selected and clear every other selection in its stage.
	pub fn select(&mut self, id: NodeId) {
		let stage = self.nodes[id.0].stage();
		for &other in &self.stages[stage.index()] {
			self.nodes[other.0].selected = other == id;
		}
	}

	pub fn is_selected(&self, id: NodeId) -> bool {
		self.nodes[id.0].selected
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn model() -> GraphModel {
		GraphModel::build_layout(&CalculatorConfig::builtin().unwrap()).unwrap()
	}

	#[test]
	fn nodes_are_grouped_in_stage_order() {
		let model = model();
		let sizes: Vec<usize> = Stage::ALL.iter().map(|&s| model.stage(s).len()).collect();
		assert_eq!(sizes, vec![1, 4, 3, 4, 1]);
		for stage in Stage::ALL {
			for &id in model.stage(stage) {
				assert_eq!(model.node(id).stage(), stage);
			}
		}
	}

	#[test]
	fn edge_set_is_adjacent_cross_product() {
		let model = model();
		let edges = model.all_edges();
		let expected: usize = Stage::ALL
			.windows(2)
			.map(|w| model.stage(w[0]).len() * model.stage(w[1]).len())
			.sum();
		assert_eq!(edges.len(), expected);
		assert_eq!(edges.len(), 4 + 12 + 12 + 4);
		for (from, to) in edges {
			assert_eq!(
				model.node(from).stage().index() + 1,
				model.node(to).stage().index()
			);
		}
	}

	#[test]
	fn later_stages_start_disabled() {
		let model = model();
		for node in model.nodes() {
			let locked = matches!(node.stage(), Stage::Tier | Stage::Modifier);
			assert_eq!(node.enabled, !locked, "{}", node.key);
			assert!(!node.selected);
		}
	}

	#[test]
	fn select_clears_only_its_own_stage() {
		let mut model = model();
		let design = model.find("design").unwrap();
		let api = model.find("api").unwrap();
		let simple = model.find("simple").unwrap();

		model.select(design);
		model.select(simple);
		model.select(api);

		assert!(!model.is_selected(design));
		assert!(model.is_selected(api));
		assert!(model.is_selected(simple));
	}

	#[test]
	fn modifier_discount_must_exist() {
		let mut config = CalculatorConfig::builtin().unwrap();
		config.modifier_discount.remove("creator");
		let err = GraphModel::build_layout(&config).unwrap_err();
		assert!(matches!(err, ConfigError::MissingDiscount(id) if id == "creator"));
	}

	#[test]
	fn discount_above_hundred_is_rejected() {
		let mut config = CalculatorConfig::builtin().unwrap();
		config.modifier_discount.insert("startup".into(), 120);
		let err = GraphModel::build_layout(&config).unwrap_err();
		assert!(matches!(err, ConfigError::DiscountOutOfRange { percent: 120, .. }));
	}

	#[test]
	fn duplicate_ids_are_rejected() {
		let mut config = CalculatorConfig::builtin().unwrap();
		let dup = config.stages[1].nodes[0].clone();
		config.stages[3].nodes.push(dup);
		let err = GraphModel::build_layout(&config).unwrap_err();
		assert!(matches!(err, ConfigError::DuplicateNode(id) if id == "architecting"));
	}
}
