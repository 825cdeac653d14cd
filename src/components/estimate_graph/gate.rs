use thiserror::Error;

use super::model::{Node, NodeId, NodeKind};
use super::types::Stage;

/// The choices made so far. Replaced wholesale on every accepted click.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
	pub category: Option<NodeId>,
	pub tier: Option<NodeId>,
	pub modifier: Option<NodeId>,
}

impl Selection {
	pub fn phase(&self) -> Phase {
		match (self.category, self.tier, self.modifier) {
			(_, _, Some(_)) => Phase::Estimated,
			(_, Some(_), None) => Phase::TierChosen,
			(Some(_), None, None) => Phase::CategoryChosen,
			(None, None, None) => Phase::Init,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
	Init,
	CategoryChosen,
	TierChosen,
	Estimated,
}

/// Why a click was turned down. The message is shown to the user as is.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Refusal {
	#[error("Select a category first")]
	CategoryRequired,
	#[error("Select a tier first")]
	TierRequired,
}

/// An accepted click.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
	pub selection: Selection,
	pub chosen: NodeId,
	/// Stage whose nodes become clickable as a result.
	pub unlocks: Option<Stage>,
}

/// Apply a click on `node` to `selection`.
///
/// Entry and Result nodes carry no choice and yield `Ok(None)`.
pub fn transition(selection: Selection, node: &Node) -> Result<Option<Transition>, Refusal> {
	let id = node.id;
	let (selection, unlocks) = match node.kind {
		NodeKind::Entry | NodeKind::Result => return Ok(None),
		// Later choices are left as they are when the category changes.
		NodeKind::Category { .. } => (
			Selection {
				category: Some(id),
				..selection
			},
			Some(Stage::Tier),
		),
		NodeKind::Tier { .. } => {
			if selection.category.is_none() {
				return Err(Refusal::CategoryRequired);
			}
			(
				Selection {
					tier: Some(id),
					..selection
				},
				Some(Stage::Modifier),
			)
		}
		NodeKind::Modifier { .. } => {
			if selection.tier.is_none() {
				return Err(Refusal::TierRequired);
			}
			(
				Selection {
					modifier: Some(id),
					..selection
				},
				None,
			)
		}
	};
	Ok(Some(Transition {
		selection,
		chosen: id,
		unlocks,
	}))
}

/// Selection state machine: `Init -> CategoryChosen -> TierChosen -> Estimated`.
#[derive(Clone, Debug, Default)]
pub struct StageGate {
	selection: Selection,
}

impl StageGate {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn selection(&self) -> Selection {
		self.selection
	}

	pub fn phase(&self) -> Phase {
		self.selection.phase()
	}

	pub fn choose(&mut self, node: &Node) -> Result<Option<Transition>, Refusal> {
		let accepted = transition(self.selection, node)?;
		if let Some(t) = accepted {
			self.selection = t.selection;
		}
		Ok(accepted)
	}
}
