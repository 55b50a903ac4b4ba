use leptos::prelude::*;
use log::warn;

use super::canvas::DiagramType;

/// Diagram type picker and the "Load Template" action.
#[component]
pub fn ControlPanel(
	diagram: RwSignal<DiagramType>,
	#[prop(into)] on_load: Callback<()>,
	#[prop(into)] loading: Signal<bool>,
	#[prop(into)] has_keywords: Signal<bool>,
) -> impl IntoView {
	let on_change = move |ev: web_sys::Event| match event_target_value(&ev).parse::<DiagramType>() {
		Ok(t) => diagram.set(t),
		Err(e) => warn!("{}", e),
	};

	view! {
		<div class="control-panel">
			<label for="diagram-type">"Diagram Type:"</label>
			<select
				id="diagram-type"
				prop:value=move || diagram.get().as_str()
				prop:disabled=move || loading.get()
				on:change=on_change
			>
				{DiagramType::selectable()
					.map(|d| {
						view! {
							<option value=d.as_str() selected=move || diagram.get() == d>
								{d.label()}
							</option>
						}
					})
					.collect_view()}
			</select>
			<button
				class="primary"
				prop:disabled=move || loading.get() || !has_keywords.get()
				on:click=move |_| on_load.run(())
			>
				"Load Template"
			</button>
		</div>
	}
}
