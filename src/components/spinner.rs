use leptos::prelude::*;

/// Full-page busy overlay.
#[component]
pub fn Spinner(#[prop(into)] message: Signal<Option<String>>) -> impl IntoView {
	view! {
		<div class="spinner-overlay">
			<div class="spinner" />
			{move || message.get().map(|m| view! { <p class="spinner-message">{m}</p> })}
		</div>
	}
}
