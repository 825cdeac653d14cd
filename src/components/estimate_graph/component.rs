use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Window};

use super::controller::{ClickOutcome, SelectionController};
use super::render;

/// Frame step used to advance the draw-in animations.
const FRAME_DT: f64 = 0.016;

/// Width used before the host has ever been measured.
const FALLBACK_WIDTH: f64 = 800.0;

/// A hidden element reports a client width of 0.
fn measured_width(client_width: i32) -> Option<f64> {
	(client_width > 0).then_some(client_width as f64)
}

fn parent_width(canvas: &HtmlCanvasElement) -> Option<f64> {
	canvas
		.parent_element()
		.and_then(|p| measured_width(p.client_width()))
}

/// Fit the canvas to its live parent. Does nothing while the parent is hidden.
fn fit_to_parent(canvas: &HtmlCanvasElement, controller: &mut SelectionController, height: f64) {
	let Some(width) = parent_width(canvas) else {
		return;
	};
	if width != controller.surface().width && controller.resize(width, height) {
		canvas.set_width(width as u32);
	}
}

/// The decision graph, drawn on a canvas, plus the estimate panel under it.
///
/// Built once, the first time the canvas is attached. `open` is the modal
/// host's visibility; nothing is laid out or drawn while it is false.
#[component]
pub fn EstimateGraph(
	#[prop(into)] open: Signal<bool>,
	#[prop(default = 600.0)] height: f64,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let controller: Rc<RefCell<Option<SelectionController>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (controller_init, animate_init, resize_cb_init) =
		(controller.clone(), animate.clone(), resize_cb.clone());

	let (result, set_result) = signal(None::<String>);
	let (setup_error, set_setup_error) = signal(None::<String>);

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if controller_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let width = parent_width(&canvas).unwrap_or(FALLBACK_WIDTH);
		canvas.set_width(width as u32);
		canvas.set_height(height as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("Canvas 2d context unavailable");
			return;
		};

		match SelectionController::builtin(width, height) {
			Ok(c) => *controller_init.borrow_mut() = Some(c),
			Err(err) => {
				error!("Calculator setup failed: {}", err);
				set_setup_error.set(Some(err.to_string()));
				return;
			}
		}

		let (controller_resize, canvas_resize) = (controller_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut c) = *controller_resize.borrow_mut() {
				fit_to_parent(&canvas_resize, c, height);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (controller_anim, animate_inner) = (controller_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if open.get_untracked() {
				if let Some(ref mut c) = *controller_anim.borrow_mut() {
					c.tick(FRAME_DT);
					if c.take_redraw() {
						render::render(c, &ctx);
					}
				}
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.map(|win| win.request_animation_frame(cb.as_ref().unchecked_ref()));
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
		info!("Estimate graph mounted at {}x{}", width, height);
	});

	// The window may have been resized while the modal was closed.
	let controller_open = controller.clone();
	Effect::new(move |_| {
		if !open.get() {
			return;
		}
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		if let Some(ref mut c) = *controller_open.borrow_mut() {
			fit_to_parent(&canvas, c, height);
			c.invalidate();
		}
	});

	let controller_click = controller.clone();
	let on_click = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		let (outcome, text) = match *controller_click.borrow_mut() {
			Some(ref mut c) => {
				let outcome = c.click_at(x, y);
				debug!("{:?} -> {:?} {:?}", outcome, c.phase(), c.selection());
				(outcome, c.result_text())
			}
			None => return,
		};
		match outcome {
			ClickOutcome::Refused(refusal) => {
				let window: Option<Window> = web_sys::window();
				if let Some(window) = window {
					let _ = window.alert_with_message(&refusal.to_string());
				}
			}
			ClickOutcome::Chosen {
				estimate: Some(_), ..
			} => set_result.set(text),
			_ => {}
		}
	};

	view! {
		<div class="calculator-container">
			<div class="header">
				<h1>"Interactive Pricing Calculator"</h1>
				<p>"Click a node in each row to build your estimate"</p>
			</div>
			<div class="diagram-container">
				<Show when=move || setup_error.get().is_some()>
					<p class="setup-error">{move || setup_error.get()}</p>
				</Show>
				<canvas
					node_ref=canvas_ref
					class="estimate-graph-canvas"
					on:click=on_click
					style="display: block; cursor: pointer;"
				/>
			</div>
			<div
				class="summary-panel"
				style:display=move || if result.get().is_some() { "block" } else { "none" }
			>
				<h2>"Your Estimate"</h2>
				<p>{move || result.get().unwrap_or_default()}</p>
			</div>
		</div>
	}
}
