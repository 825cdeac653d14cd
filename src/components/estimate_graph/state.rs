use super::model::{GraphModel, NodeId};
use super::types::Stage;

/// Seconds an edge takes to draw itself in once activated.
pub const DRAW_DURATION: f64 = 1.2;

pub const ENTRY_RADIUS: f64 = 50.0;
pub const TIER_RADIUS: f64 = 64.0;
pub const CARD_HALF_WIDTH: f64 = 64.0;
pub const CARD_HALF_HEIGHT: f64 = 26.0;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	fn distance(self, other: Point) -> f64 {
		(other.x - self.x).hypot(other.y - self.y)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeShape {
	Circle { radius: f64 },
	/// A square rotated by 45 degrees; `radius` is centre to corner.
	Diamond { radius: f64 },
	Card { half_width: f64, half_height: f64 },
}

impl NodeShape {
	pub fn for_stage(stage: Stage) -> Self {
		match stage {
			Stage::Entry => NodeShape::Circle {
				radius: ENTRY_RADIUS,
			},
			Stage::Tier => NodeShape::Diamond {
				radius: TIER_RADIUS,
			},
			Stage::Category | Stage::Modifier | Stage::Result => NodeShape::Card {
				half_width: CARD_HALF_WIDTH,
				half_height: CARD_HALF_HEIGHT,
			},
		}
	}

	pub fn contains(&self, center: Point, p: Point) -> bool {
		let (dx, dy) = ((p.x - center.x).abs(), (p.y - center.y).abs());
		match *self {
			NodeShape::Circle { radius } => dx.hypot(dy) <= radius,
			NodeShape::Diamond { radius } => dx + dy <= radius,
			NodeShape::Card {
				half_width,
				half_height,
			} => dx <= half_width && dy <= half_height,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeBox {
	pub id: NodeId,
	pub center: Point,
	pub shape: NodeShape,
}

/// Cubic Bezier leaving `start` and entering `end` vertically.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicCurve {
	pub start: Point,
	pub c1: Point,
	pub c2: Point,
	pub end: Point,
}

impl CubicCurve {
	pub fn s_curve(start: Point, end: Point) -> Self {
		let mid_y = (start.y + end.y) / 2.0;
		Self {
			start,
			c1: Point::new(start.x, mid_y),
			c2: Point::new(end.x, mid_y),
			end,
		}
	}

	pub fn point_at(&self, t: f64) -> Point {
		let u = 1.0 - t;
		let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
		Point::new(
			a * self.start.x + b * self.c1.x + c * self.c2.x + d * self.end.x,
			a * self.start.y + b * self.c1.y + c * self.c2.y + d * self.end.y,
		)
	}

	/// Polyline approximation of the arc length.
	pub fn length(&self) -> f64 {
		const STEPS: usize = 32;
		(1..=STEPS)
			.map(|i| {
				let (t0, t1) = ((i - 1) as f64 / STEPS as f64, i as f64 / STEPS as f64);
				self.point_at(t0).distance(self.point_at(t1))
			})
			.sum()
	}
}

/// Visual state of an edge; exactly one applies at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeState {
	Inactive,
	/// Incident to the most recently clicked node.
	Active,
	/// Both endpoints are on the locked-in path.
	Selected,
}

/// One-shot draw-in of an activated edge.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DrawAnimation {
	elapsed: f64,
}

impl DrawAnimation {
	pub fn restart(&mut self) {
		self.elapsed = 0.0;
	}

	pub fn tick(&mut self, dt: f64) {
		self.elapsed = (self.elapsed + dt).min(DRAW_DURATION);
	}

	pub fn is_running(&self) -> bool {
		self.elapsed < DRAW_DURATION
	}

	/// Eased fraction of the edge drawn so far, 0 to 1.
	pub fn progress(&self) -> f64 {
		ease_out_cubic(self.elapsed / DRAW_DURATION)
	}
}

#[derive(Clone, Debug)]
pub struct RenderedEdge {
	pub from: NodeId,
	pub to: NodeId,
	pub curve: CubicCurve,
	pub active: bool,
	pub draw: DrawAnimation,
}

/// Which edges are Active after a click on `node`: exactly those incident to it.
pub fn active_after_click(edges: &[(NodeId, NodeId)], node: NodeId) -> Vec<bool> {
	edges
		.iter()
		.map(|&(from, to)| from == node || to == node)
		.collect()
}

/// Geometry and highlight state of the drawn graph.
pub struct RenderSurface {
	pub width: f64,
	pub height: f64,
	boxes: Vec<NodeBox>,
	edges: Vec<RenderedEdge>,
	layout_generation: u64,
}

impl RenderSurface {
	pub fn new(model: &GraphModel, width: f64, height: f64) -> Self {
		let mut surface = Self {
			width,
			height,
			boxes: Vec::new(),
			edges: Vec::new(),
			layout_generation: 0,
		};
		surface.relayout(model);
		surface
	}

	pub fn resize(&mut self, model: &GraphModel, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.relayout(model);
	}

	/// Place every node, then rebuild the whole edge set from the new centres.
	fn relayout(&mut self, model: &GraphModel) {
		let rows = Stage::ALL.len() as f64;
		let mut boxes = vec![None; model.nodes().len()];
		for (row, stage) in Stage::ALL.into_iter().enumerate() {
			let ids = model.stage(stage);
			let y = self.height * (row as f64 + 0.5) / rows;
			for (col, &id) in ids.iter().enumerate() {
				let x = self.width * (col as f64 + 0.5) / ids.len() as f64;
				boxes[id.0] = Some(NodeBox {
					id,
					center: Point::new(x, y),
					shape: NodeShape::for_stage(stage),
				});
			}
		}
		self.boxes = boxes.into_iter().flatten().collect();

		self.edges = model
			.all_edges()
			.into_iter()
			.map(|(from, to)| RenderedEdge {
				from,
				to,
				curve: CubicCurve::s_curve(self.center(from), self.center(to)),
				active: false,
				draw: DrawAnimation::default(),
			})
			.collect();
		self.layout_generation += 1;
	}

	pub fn boxes(&self) -> &[NodeBox] {
		&self.boxes
	}

	pub fn edges(&self) -> &[RenderedEdge] {
		&self.edges
	}

	pub fn center(&self, id: NodeId) -> Point {
		self.boxes[id.0].center
	}

	/// Number of times the edge set has been rebuilt.
	pub fn layout_generation(&self) -> u64 {
		self.layout_generation
	}

	/// Topmost enabled node under the given surface position.
	pub fn node_at_position(&self, model: &GraphModel, x: f64, y: f64) -> Option<NodeId> {
		let p = Point::new(x, y);
		self.boxes
			.iter()
			.rev()
			.find(|b| model.node(b.id).enabled && b.shape.contains(b.center, p))
			.map(|b| b.id)
	}

	/// Clear every Active edge, then activate and restart those touching `node`.
	pub fn highlight_from(&mut self, node: NodeId) {
		let pairs: Vec<(NodeId, NodeId)> = self.edges.iter().map(|e| (e.from, e.to)).collect();
		for (edge, active) in self.edges.iter_mut().zip(active_after_click(&pairs, node)) {
			edge.active = active;
			if active {
				edge.draw.restart();
			}
		}
	}

	pub fn edge_state(&self, edge: &RenderedEdge, model: &GraphModel) -> EdgeState {
		if edge.active {
			EdgeState::Active
		} else if model.is_selected(edge.from) && model.is_selected(edge.to) {
			EdgeState::Selected
		} else {
			EdgeState::Inactive
		}
	}

	pub fn tick(&mut self, dt: f64) {
		for edge in self.edges.iter_mut().filter(|e| e.active) {
			edge.draw.tick(dt);
		}
	}

	pub fn is_animating(&self) -> bool {
		self.edges.iter().any(|e| e.active && e.draw.is_running())
	}
}
