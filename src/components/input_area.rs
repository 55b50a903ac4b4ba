use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{File, HtmlInputElement};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tab {
	Text,
	File,
}

/// Text box and PDF upload feeding keyword extraction.
#[component]
pub fn InputArea(
	#[prop(into)] on_text: Callback<String>,
	#[prop(into)] on_file: Callback<File>,
	#[prop(into)] loading: Signal<bool>,
) -> impl IntoView {
	let text = RwSignal::new(String::new());
	let tab = RwSignal::new(Tab::Text);

	let on_change = move |ev: web_sys::Event| {
		let file = ev
			.target()
			.and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
			.and_then(|input| input.files())
			.and_then(|files| files.get(0));
		if let Some(file) = file {
			on_file.run(file);
		}
	};

	view! {
		<div class="input-area">
			<div class="tabs">
				<button class:active=move || tab.get() == Tab::Text on:click=move |_| tab.set(Tab::Text)>
					"Paste Text"
				</button>
				<button class:active=move || tab.get() == Tab::File on:click=move |_| tab.set(Tab::File)>
					"Upload PDF"
				</button>
			</div>
			<Show
				when=move || tab.get() == Tab::Text
				fallback=move || {
					view! {
						<label for="file-upload" class="file-drop">
							<span class="file-drop-action">"Click to upload"</span>
							<span class="file-drop-hint">"PDF (MAX. 5MB)"</span>
						</label>
						<input
							id="file-upload"
							type="file"
							class="sr-only"
							accept=".pdf"
							prop:disabled=move || loading.get()
							on:change=on_change
						/>
					}
				}
			>
				<textarea
					placeholder="Paste your article, notes, or any text here..."
					prop:value=move || text.get()
					prop:disabled=move || loading.get()
					on:input=move |ev| text.set(event_target_value(&ev))
				/>
				<button
					class="primary"
					prop:disabled=move || loading.get() || text.with(|t| t.trim().is_empty())
					on:click=move |_| on_text.run(text.get_untracked())
				>
					"Analyze Text"
				</button>
			</Show>
		</div>
	}
}
