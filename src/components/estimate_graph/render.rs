use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::controller::SelectionController;
use super::model::Node;
use super::state::{EdgeState, NodeBox, NodeShape, RenderedEdge};
use super::types::Stage;

const BACKGROUND: &str = "#0a0a0a";
const GRID: &str = "rgba(255, 255, 255, 0.02)";
const GRID_STEP: f64 = 30.0;
const ACTIVE: &str = "#4a9eff";
const SELECTED: &str = "#7b68ee";

pub fn render(controller: &SelectionController, ctx: &CanvasRenderingContext2d) {
	let surface = controller.surface();
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, surface.width, surface.height);
	draw_grid(ctx, surface.width, surface.height);

	let model = controller.model();
	for state in [EdgeState::Inactive, EdgeState::Selected, EdgeState::Active] {
		for edge in surface.edges() {
			if surface.edge_state(edge, model) == state {
				draw_edge(ctx, edge, state);
			}
		}
	}
	for node_box in surface.boxes() {
		draw_node(ctx, model.node(node_box.id), node_box);
	}
}

fn draw_grid(ctx: &CanvasRenderingContext2d, width: f64, height: f64) {
	ctx.set_stroke_style_str(GRID);
	ctx.set_line_width(1.0);
	ctx.begin_path();
	let mut x = 0.0;
	while x < width {
		ctx.move_to(x, 0.0);
		ctx.line_to(x, height);
		x += GRID_STEP;
	}
	let mut y = 0.0;
	while y < height {
		ctx.move_to(0.0, y);
		ctx.line_to(width, y);
		y += GRID_STEP;
	}
	ctx.stroke();
}

fn draw_edge(ctx: &CanvasRenderingContext2d, edge: &RenderedEdge, state: EdgeState) {
	let c = &edge.curve;
	ctx.save();
	match state {
		EdgeState::Inactive => {
			ctx.set_stroke_style_str("rgba(255, 255, 255, 0.1)");
			ctx.set_line_width(2.0);
		}
		EdgeState::Selected => {
			ctx.set_stroke_style_str(SELECTED);
			ctx.set_line_width(3.0);
		}
		EdgeState::Active => {
			ctx.set_stroke_style_str(ACTIVE);
			ctx.set_line_width(3.0);
			ctx.set_shadow_color("rgba(74, 158, 255, 0.6)");
			ctx.set_shadow_blur(6.0);
			// Reveal the curve from its start by sliding a single dash along it.
			let length = c.length();
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(length),
				&JsValue::from_f64(length),
			));
			ctx.set_line_dash_offset(length * (1.0 - edge.draw.progress()));
		}
	}
	ctx.begin_path();
	ctx.move_to(c.start.x, c.start.y);
	ctx.bezier_curve_to(c.c1.x, c.c1.y, c.c2.x, c.c2.y, c.end.x, c.end.y);
	ctx.stroke();
	ctx.restore();
}

fn draw_node(ctx: &CanvasRenderingContext2d, node: &Node, node_box: &NodeBox) {
	let (x, y) = (node_box.center.x, node_box.center.y);
	ctx.set_global_alpha(if node.enabled { 1.0 } else { 0.3 });

	ctx.begin_path();
	match node_box.shape {
		NodeShape::Circle { radius } => {
			let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		}
		NodeShape::Diamond { radius } => {
			ctx.move_to(x, y - radius);
			ctx.line_to(x + radius, y);
			ctx.line_to(x, y + radius);
			ctx.line_to(x - radius, y);
			ctx.close_path();
		}
		NodeShape::Card {
			half_width,
			half_height,
		} => {
			rounded_rect(ctx, x - half_width, y - half_height, x + half_width, y + half_height, 8.0);
		}
	}

	if node.stage() == Stage::Entry {
		let gradient = ctx.create_linear_gradient(x - 50.0, y - 50.0, x + 50.0, y + 50.0);
		let _ = gradient.add_color_stop(0.0, "#f4e4a3");
		let _ = gradient.add_color_stop(1.0, "#d4c483");
		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
		ctx.set_shadow_color("rgba(244, 228, 163, 0.3)");
		ctx.set_shadow_blur(20.0);
		ctx.fill();
		ctx.set_shadow_blur(0.0);
	} else {
		ctx.set_fill_style_str("#141414");
		ctx.fill();
		let border = match (node.selected, node.stage()) {
			(true, Stage::Tier) => SELECTED,
			(true, _) => ACTIVE,
			(false, _) => "rgba(255, 255, 255, 0.2)",
		};
		ctx.set_stroke_style_str(border);
		ctx.set_line_width(2.0);
		ctx.stroke();
	}

	ctx.set_fill_style_str(if node.stage() == Stage::Entry {
		"#222"
	} else {
		"white"
	});
	ctx.set_font("600 14px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(&node.label, x, y);
	ctx.set_global_alpha(1.0);
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x0: f64, y0: f64, x1: f64, y1: f64, r: f64) {
	ctx.move_to(x0 + r, y0);
	let _ = ctx.arc_to(x1, y0, x1, y1, r);
	let _ = ctx.arc_to(x1, y1, x0, y1, r);
	let _ = ctx.arc_to(x0, y1, x0, y0, r);
	let _ = ctx.arc_to(x0, y0, x1, y0, r);
	ctx.close_path();
}
