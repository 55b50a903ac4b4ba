use leptos::prelude::*;

use crate::services::KeywordSession;

/// Checklist of extracted keywords.
#[component]
pub fn KeywordPanel(session: RwSignal<KeywordSession>) -> impl IntoView {
	let counts = move || {
		session.with(|s| format!("{} / {} selected", s.selected_count(), s.keywords().len()))
	};

	view! {
		<div class="keyword-panel">
			<h2>"Extracted Keywords"</h2>
			<div class="keyword-panel-toolbar">
				<span>{counts}</span>
				<button on:click=move |_| session.update(KeywordSession::select_all)>"All"</button>
				<button on:click=move |_| session.update(KeywordSession::deselect_all)>"None"</button>
			</div>
			<div class="keyword-list">
				{move || {
					session
						.with(|s| s.keywords().to_vec())
						.into_iter()
						.map(|keyword| {
							let id = format!("keyword-{}", keyword.name);
							let name = keyword.name.clone();
							let checked_name = keyword.name.clone();
							let title = keyword.description.clone();
							view! {
								<div class="keyword-row" title=title>
									<input
										type="checkbox"
										id=id.clone()
										prop:checked=move || session.with(|s| s.is_selected(&checked_name))
										on:change=move |_| session.update(|s| s.toggle(&name))
									/>
									<label for=id>
										{keyword.name}
										<p class="keyword-description">{keyword.description}</p>
									</label>
								</div>
							}
						})
						.collect_view()
				}}
			</div>
		</div>
	}
}
