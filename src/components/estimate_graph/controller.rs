use log::{debug, info, warn};

use super::gate::{Phase, Refusal, Selection, StageGate};
use super::model::{GraphModel, NodeId};
use super::pricing::{Estimate, PriceTable};
use super::state::RenderSurface;
use super::types::{CalculatorConfig, ConfigError, Stage};

/// What a click did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
	/// No enabled node under the pointer.
	Missed,
	/// The node's stage is still locked.
	Disabled(NodeId),
	/// Entry or Result node; nothing to choose.
	Ignored(NodeId),
	Refused(Refusal),
	Chosen {
		node: NodeId,
		estimate: Option<Estimate>,
	},
}

/// Routes clicks through the gate and keeps the model, surface and result in step.
pub struct SelectionController {
	model: GraphModel,
	gate: StageGate,
	prices: PriceTable,
	surface: RenderSurface,
	estimate: Option<Estimate>,
	/// Something visible changed since the last frame was drawn.
	dirty: bool,
}

impl SelectionController {
	pub fn new(config: &CalculatorConfig, width: f64, height: f64) -> Result<Self, ConfigError> {
		let model = GraphModel::build_layout(config)?;
		let prices = PriceTable::from_config(config, &model)?;
		let surface = RenderSurface::new(&model, width, height);
		info!(
			"Estimate graph ready: {} nodes, {} edges",
			model.nodes().len(),
			surface.edges().len()
		);
		Ok(Self {
			model,
			gate: StageGate::new(),
			prices,
			surface,
			estimate: None,
			dirty: true,
		})
	}

	pub fn builtin(width: f64, height: f64) -> Result<Self, ConfigError> {
		Self::new(&CalculatorConfig::builtin()?, width, height)
	}

	pub fn model(&self) -> &GraphModel {
		&self.model
	}

	pub fn surface(&self) -> &RenderSurface {
		&self.surface
	}

	pub fn selection(&self) -> Selection {
		self.gate.selection()
	}

	pub fn phase(&self) -> Phase {
		self.gate.phase()
	}

	/// Formatted estimate; `None` keeps the result panel hidden.
	pub fn result_text(&self) -> Option<String> {
		self.estimate.map(|e| e.to_string())
	}

	pub fn click_at(&mut self, x: f64, y: f64) -> ClickOutcome {
		match self.surface.node_at_position(&self.model, x, y) {
			Some(id) => self.click_node(id),
			None => ClickOutcome::Missed,
		}
	}

	pub fn click_node(&mut self, id: NodeId) -> ClickOutcome {
		let node = self.model.node(id);
		if !node.enabled {
			return ClickOutcome::Disabled(id);
		}
		let transition = match self.gate.choose(node) {
			Ok(Some(t)) => t,
			Ok(None) => return ClickOutcome::Ignored(id),
			Err(refusal) => {
				warn!("Refused click on `{}`: {}", node.key, refusal);
				return ClickOutcome::Refused(refusal);
			}
		};
		debug!(
			"Chose `{}`, now {:?}",
			node.key,
			transition.selection.phase()
		);

		let chosen = transition.chosen;
		self.model.select(chosen);
		if let Some(stage) = transition.unlocks {
			self.model.enable_stage(stage);
		}
		self.mark_path_ends();
		self.surface.highlight_from(chosen);
		self.dirty = true;

		let selection = transition.selection;
		if selection.modifier == Some(chosen) {
			self.estimate = self.quote(selection);
			if let Some(e) = self.estimate {
				info!("Estimate: {}", e);
			}
		}

		ClickOutcome::Chosen {
			node: chosen,
			estimate: self.estimate,
		}
	}

	fn quote(&self, selection: Selection) -> Option<Estimate> {
		let (category, tier, modifier) = (selection.category?, selection.tier?, selection.modifier?);
		self.prices.quote(
			&self.model.node(category).kind,
			&self.model.node(tier).kind,
			&self.model.node(modifier).kind,
		)
	}

	/// Entry joins the locked-in path with the first category, Result with the estimate.
	fn mark_path_ends(&mut self) {
		let phase = self.gate.phase();
		let ends = [
			(Stage::Entry, phase >= Phase::CategoryChosen),
			(Stage::Result, phase == Phase::Estimated),
		];
		for (stage, on_path) in ends {
			if !on_path {
				continue;
			}
			for id in self.model.stage(stage).to_vec() {
				self.model.select(id);
			}
		}
	}

	/// Recompute positions and redraw every edge. Selections are untouched.
	///
	/// A surface that measures empty (its host is hidden) keeps the last
	/// layout; returns whether a relayout happened.
	pub fn resize(&mut self, width: f64, height: f64) -> bool {
		if width <= 0.0 || height <= 0.0 {
			debug!("Skipping relayout of hidden surface ({}x{})", width, height);
			return false;
		}
		self.surface.resize(&self.model, width, height);
		self.dirty = true;
		debug!(
			"Relayout #{} at {}x{}",
			self.surface.layout_generation(),
			width,
			height
		);
		true
	}

	pub fn tick(&mut self, dt: f64) {
		if self.surface.is_animating() {
			self.surface.tick(dt);
			self.dirty = true;
		}
	}

	/// Force a redraw on the next frame, e.g. after the host is shown again.
	pub fn invalidate(&mut self) {
		self.dirty = true;
	}

	/// Whether the next frame needs drawing; clears the flag.
	pub fn take_redraw(&mut self) -> bool {
		std::mem::take(&mut self.dirty)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::estimate_graph::state::EdgeState;

	fn controller() -> SelectionController {
		SelectionController::builtin(1000.0, 800.0).unwrap()
	}

	fn click(c: &mut SelectionController, key: &str) -> ClickOutcome {
		let id = c.model().find(key).unwrap();
		let at = c.surface().center(id);
		c.click_at(at.x, at.y)
	}

	#[test]
	fn full_path_produces_estimate() {
		let mut c = controller();
		assert_eq!(c.result_text(), None);
		click(&mut c, "architecting");
		click(&mut c, "simple");
		let outcome = click(&mut c, "standard");

		assert!(matches!(outcome, ClickOutcome::Chosen { estimate: Some(_), .. }));
		assert_eq!(c.phase(), Phase::Estimated);
		assert_eq!(c.result_text().as_deref(), Some("$400 – $800 (0% off)"));
	}

	#[test]
	fn discounted_path() {
		let mut c = controller();
		click(&mut c, "architecting");
		click(&mut c, "simple");
		click(&mut c, "startup");
		assert_eq!(c.result_text().as_deref(), Some("$340 – $680 (15% off)"));
	}

	#[test]
	fn changing_modifier_requotes() {
		let mut c = controller();
		click(&mut c, "api");
		click(&mut c, "advanced");
		click(&mut c, "startup");
		click(&mut c, "nonprofit");
		assert_eq!(c.result_text().as_deref(), Some("$3,000 – $6,000 (25% off)"));
		let startup = c.model().find("startup").unwrap();
		assert!(!c.model().is_selected(startup));
	}

	#[test]
	fn locked_tier_is_never_dispatched() {
		let mut c = controller();
		assert!(matches!(click(&mut c, "simple"), ClickOutcome::Missed));
		let simple = c.model().find("simple").unwrap();
		assert_eq!(c.click_node(simple), ClickOutcome::Disabled(simple));
		assert_eq!(c.phase(), Phase::Init);
	}

	#[test]
	fn out_of_order_tier_is_refused() {
		let mut c = controller();
		c.model.enable_stage(Stage::Tier);
		let simple = c.model().find("simple").unwrap();

		assert_eq!(
			c.click_node(simple),
			ClickOutcome::Refused(Refusal::CategoryRequired)
		);
		assert_eq!(c.phase(), Phase::Init);
		assert_eq!(c.selection(), Selection::default());
		assert!(!c.model().is_selected(simple));
		assert!(c.surface().edges().iter().all(|e| !e.active));
	}

	#[test]
	fn out_of_order_modifier_is_refused() {
		let mut c = controller();
		click(&mut c, "design");
		c.model.enable_stage(Stage::Modifier);
		let creator = c.model().find("creator").unwrap();
		assert_eq!(
			c.click_node(creator),
			ClickOutcome::Refused(Refusal::TierRequired)
		);
		assert_eq!(c.phase(), Phase::CategoryChosen);
		assert_eq!(c.result_text(), None);
	}

	#[test]
	fn terminal_nodes_are_ignored() {
		let mut c = controller();
		let start = c.model().find("start").unwrap();
		assert_eq!(click(&mut c, "start"), ClickOutcome::Ignored(start));
		assert!(c.surface().edges().iter().all(|e| !e.active));
	}

	#[test]
	fn stages_unlock_in_order() {
		let mut c = controller();
		let enabled = |c: &SelectionController, stage| {
			c.model()
				.stage(stage)
				.iter()
				.all(|&id| c.model().node(id).enabled)
		};
		assert!(!enabled(&c, Stage::Tier));
		click(&mut c, "automating");
		assert!(enabled(&c, Stage::Tier));
		assert!(!enabled(&c, Stage::Modifier));
		click(&mut c, "moderate");
		assert!(enabled(&c, Stage::Modifier));
	}

	#[test]
	fn reselection_stays_within_its_stage() {
		let mut c = controller();
		click(&mut c, "api");
		click(&mut c, "moderate");
		click(&mut c, "design");

		let m = c.model();
		let (api, design, moderate) = (
			m.find("api").unwrap(),
			m.find("design").unwrap(),
			m.find("moderate").unwrap(),
		);
		assert!(!m.is_selected(api));
		assert!(m.is_selected(design));
		assert!(m.is_selected(moderate));
		assert_eq!(c.selection().category, Some(design));
		assert_eq!(c.selection().tier, Some(moderate));
	}

	#[test]
	fn highlight_follows_last_click() {
		let mut c = controller();
		click(&mut c, "api");
		click(&mut c, "moderate");
		let moderate = c.model().find("moderate").unwrap();
		for edge in c.surface().edges() {
			assert_eq!(edge.active, edge.from == moderate || edge.to == moderate);
		}
	}

	#[test]
	fn locked_in_path_runs_entry_to_result() {
		let mut c = controller();
		click(&mut c, "design");
		click(&mut c, "simple");
		click(&mut c, "creator");
		// Reroute the path through automating.
		click(&mut c, "automating");
		click(&mut c, "simple");
		click(&mut c, "creator");

		let lit = c
			.surface()
			.edges()
			.iter()
			.filter(|e| c.surface().edge_state(e, c.model()) != EdgeState::Inactive)
			.count();
		// The four edges touching creator are Active; the rest of the path is Selected.
		let keys: Vec<(&str, &str)> = c
			.surface()
			.edges()
			.iter()
			.filter(|e| !e.active && c.surface().edge_state(e, c.model()) == EdgeState::Selected)
			.map(|e| (c.model().node(e.from).key.as_str(), c.model().node(e.to).key.as_str()))
			.collect();
		assert_eq!(keys, vec![("start", "automating"), ("automating", "simple")]);
		assert_eq!(lit, 2 + 4);
	}

	#[test]
	fn resize_keeps_selection_and_redraws() {
		let mut c = controller();
		click(&mut c, "architecting");
		click(&mut c, "advanced");
		let selection = c.selection();
		let flags: Vec<bool> = c.model().nodes().iter().map(|n| n.selected).collect();
		let generation = c.surface().layout_generation();
		let edge_count = c.surface().edges().len();

		c.resize(640.0, 480.0);

		assert_eq!(c.selection(), selection);
		let after: Vec<bool> = c.model().nodes().iter().map(|n| n.selected).collect();
		assert_eq!(after, flags);
		assert_eq!(c.surface().layout_generation(), generation + 1);
		assert_eq!(c.surface().edges().len(), edge_count);
		assert_eq!(c.surface().width, 640.0);
	}

	#[test]
	fn hidden_surface_keeps_its_layout() {
		let mut c = controller();
		click(&mut c, "design");
		let generation = c.surface().layout_generation();
		let curves: Vec<_> = c.surface().edges().iter().map(|e| e.curve).collect();

		assert!(!c.resize(0.0, 600.0));

		assert_eq!(c.surface().layout_generation(), generation);
		assert_eq!(c.surface().width, 1000.0);
		let after: Vec<_> = c.surface().edges().iter().map(|e| e.curve).collect();
		assert_eq!(after, curves);
		assert!(c.surface().edges().iter().any(|e| e.active));

		assert!(c.resize(700.0, 600.0));
		assert_eq!(c.surface().layout_generation(), generation + 1);
	}

	#[test]
	fn frames_are_drawn_only_after_changes() {
		let mut c = controller();
		assert!(c.take_redraw());
		assert!(!c.take_redraw());

		c.tick(0.016);
		assert!(!c.take_redraw());

		click(&mut c, "api");
		assert!(c.take_redraw());
		c.tick(0.5);
		assert!(c.take_redraw());
		// Finishing the draw-in still paints the final frame once.
		c.tick(10.0);
		assert!(c.take_redraw());
		c.tick(0.016);
		assert!(!c.take_redraw());

		assert!(!c.resize(0.0, 0.0));
		assert!(!c.take_redraw());
		c.resize(900.0, 600.0);
		assert!(c.take_redraw());

		c.invalidate();
		assert!(c.take_redraw());
	}

	#[test]
	fn missed_click_needs_no_redraw() {
		let mut c = controller();
		c.take_redraw();
		assert_eq!(c.click_at(-10.0, -10.0), ClickOutcome::Missed);
		assert!(!c.take_redraw());
	}

	#[test]
	fn chosen_node_is_the_one_recorded() {
		let mut c = controller();
		let moderate = c.model().find("moderate").unwrap();
		click(&mut c, "api");
		assert_eq!(
			click(&mut c, "moderate"),
			ClickOutcome::Chosen {
				node: moderate,
				estimate: None
			}
		);
	}

	#[test]
	fn incomplete_price_table_fails_setup() {
		let mut config = CalculatorConfig::builtin().unwrap();
		config.price_table.remove("design");
		let err = SelectionController::new(&config, 800.0, 600.0).err().unwrap();
		assert!(matches!(err, ConfigError::MissingPrice { .. }));
	}
}
