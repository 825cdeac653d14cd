use leptos::ev::MouseEvent;
use leptos::prelude::*;
use log::debug;

use crate::components::estimate_graph::EstimateGraph;

/// Default Home Page, hosting the calculator in a modal.
#[component]
pub fn Home() -> impl IntoView {
	let (open, set_open) = signal(false);
	// Flips once on first open; the calculator is then kept alive across closes.
	let (mounted, set_mounted) = signal(false);

	let open_modal = move |_: MouseEvent| {
		if !mounted.get_untracked() {
			debug!("Mounting calculator");
			set_mounted.set(true);
		}
		set_open.set(true);
	};
	let close_modal = move |_: MouseEvent| set_open.set(false);

	view! {
		<>
			<header class="header">
				<button class="calculator-trigger" aria-label="Calculator" on:click=open_modal>
					"Estimate"
				</button>
			</header>

			<div class="modal-bg" class:is-visible=move || open.get() on:click=close_modal />
			<div class="modal calculator-modal" class:is-visible=move || open.get()>
				<div class="modal-content">
					<button class="modal-close" aria-label="Close" on:click=close_modal>
						"×"
					</button>
					<Show when=move || mounted.get()>
						<EstimateGraph open=open />
					</Show>
				</div>
			</div>
		</>
	}
}
