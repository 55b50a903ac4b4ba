use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, info, warn};
use web_sys::File;

use crate::components::canvas::{DiagramCanvas, DiagramType, ExtractedData};
use crate::components::{ControlPanel, InputArea, KeywordPanel, Spinner};
use crate::services::{
	ExtractionGate, HttpKeywordService, KeywordSession, PdfJsDocumentService, ServiceConfig,
	ServiceError, read_file, submit_document, submit_text,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Panel {
	Input,
	Visuals,
}

/// Page-level state shared by the handlers.
#[derive(Clone, Copy)]
struct Workspace {
	session: RwSignal<KeywordSession>,
	gate: RwSignal<ExtractionGate>,
	error: RwSignal<Option<String>>,
	canvas_key: RwSignal<u32>,
	panel: RwSignal<Panel>,
}

impl Workspace {
	fn new() -> Self {
		Self {
			session: RwSignal::new(KeywordSession::default()),
			gate: RwSignal::new(ExtractionGate::default()),
			error: RwSignal::new(None),
			canvas_key: RwSignal::new(0),
			panel: RwSignal::new(Panel::Input),
		}
	}

	/// Claim the gate for a new request. Returns false if one is running.
	fn begin(self, message: &str) -> bool {
		let mut claimed = Ok(());
		self.gate.update(|g| claimed = g.begin(message));
		if let Err(e) = claimed {
			warn!("ignoring submission: {}", e);
			return false;
		}
		self.error.set(None);
		true
	}

	fn settle(self, result: Result<ExtractedData, ServiceError>) {
		self.gate.update(ExtractionGate::finish);
		match result {
			Ok(data) => {
				info!("loaded {} keywords", data.keywords.len());
				self.session.update(|s| s.load(data));
				self.canvas_key.update(|k| *k += 1);
				self.panel.set(Panel::Visuals);
			}
			Err(e) => {
				error!("extraction failed: {}", e);
				self.error.set(Some(e.user_message().to_string()));
			}
		}
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let config = use_context::<ServiceConfig>().unwrap_or_default();
	let ws = Workspace::new();
	let diagram = RwSignal::new(DiagramType::default());

	let loading = Signal::derive(move || ws.gate.with(ExtractionGate::is_busy));
	let message = Signal::derive(move || ws.gate.with(|g| g.message().map(str::to_string)));
	let selected = Memo::new(move |_| ws.session.with(KeywordSession::selected_keywords));
	let has_selection = Signal::derive(move || ws.session.with(KeywordSession::has_selection));
	let has_data = Signal::derive(move || ws.session.with(KeywordSession::has_data));

	let endpoint = config.keyword_endpoint.clone();
	let on_text = move |text: String| {
		if text.trim().is_empty() {
			ws.error.set(Some(ServiceError::EmptyInput.user_message().to_string()));
			return;
		}
		if !ws.begin("Extracting keywords...") {
			return;
		}
		let service = HttpKeywordService::new(endpoint.clone());
		spawn_local(async move {
			ws.settle(submit_text(&service, &text).await);
		});
	};

	let endpoint = config.keyword_endpoint;
	let on_file = move |file: File| {
		if !ws.begin("Processing PDF file...") {
			return;
		}
		let service = HttpKeywordService::new(endpoint.clone());
		spawn_local(async move {
			let result = match read_file(&file).await {
				Ok(bytes) => submit_document(&PdfJsDocumentService, &service, &bytes).await,
				Err(e) => Err(e),
			};
			ws.settle(result);
		});
	};

	let on_load = move |_: ()| ws.canvas_key.update(|k| *k += 1);

	view! {
		<header class="app-header">
			<h1>"Cognitive Gamut"</h1>
			<nav>
				<button
					class:active=move || ws.panel.get() == Panel::Input
					on:click=move |_| ws.panel.set(Panel::Input)
				>
					"Input & Keywords"
				</button>
				<button
					class:active=move || ws.panel.get() == Panel::Visuals
					prop:disabled=move || !has_data.get()
					on:click=move |_| ws.panel.set(Panel::Visuals)
				>
					"Visualizer"
				</button>
			</nav>
		</header>
		<main>
			<Show when=move || loading.get()>
				<Spinner message=message />
			</Show>
			{move || {
				ws.error
					.get()
					.map(|e| {
						view! {
							<div class="error-banner">
								<p>{e}</p>
								<button on:click=move |_| ws.error.set(None)>"×"</button>
							</div>
						}
					})
			}}
			<div class="workspace">
				<aside class:hidden=move || ws.panel.get() != Panel::Input>
					<InputArea on_text=on_text on_file=on_file loading=loading />
					<Show when=move || has_data.get()>
						<KeywordPanel session=ws.session />
					</Show>
				</aside>
				<section class="visuals" class:hidden=move || ws.panel.get() != Panel::Visuals>
					<ControlPanel
						diagram=diagram
						on_load=on_load
						loading=loading
						has_keywords=has_selection
					/>
					{move || {
						ws.canvas_key.track();
						view! {
							<DiagramCanvas keywords=selected diagram_type=diagram loading=loading />
						}
					}}
				</section>
			</div>
		</main>
	}
}
