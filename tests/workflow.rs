//! End-to-end flows through the public engine API: extraction, the keyword
//! bank, drops and canvas interaction.

use concept_canvas::components::canvas::drop::{DropOutcome, TransferPayload};
use concept_canvas::components::canvas::interaction::{CanvasEvent, Focus, Key, Target};
use concept_canvas::components::canvas::{
	CanvasState, DiagramType, ExtractedData, Keyword, Point, Shape,
};
use concept_canvas::services::{KeywordService, KeywordSession, ServiceError, submit_text};
use futures::executor::block_on;
use pretty_assertions::assert_eq;

struct Fox;

impl KeywordService for Fox {
	async fn extract_keywords(&self, _text: &str) -> Result<ExtractedData, ServiceError> {
		Ok(ExtractedData {
			keywords: vec![Keyword::new("fox", "An animal")],
		})
	}
}

fn fox() -> Keyword {
	Keyword::new("fox", "An animal")
}

fn drop_at(state: &mut CanvasState, keyword: &Keyword, x: f64, y: f64) -> DropOutcome {
	let payload = TransferPayload::of(keyword).unwrap();
	state.drop_keyword(&payload, Point::new(x, y))
}

#[test]
fn extracted_keywords_land_in_the_bank_preselected() {
	let data = block_on(submit_text(&Fox, "The quick brown fox")).unwrap();
	let mut session = KeywordSession::default();
	session.load(data);

	assert!(session.is_selected("fox"));
	let state = CanvasState::new(DiagramType::NetworkDiagram, 800.0, 600.0);
	assert_eq!(state.store.keyword_bank(&session.selected_keywords()), vec![fox()]);
}

#[test]
fn dropping_onto_a_flowchart_places_a_rectangle_and_empties_the_bank() {
	let mut state = CanvasState::new(DiagramType::Flowchart, 800.0, 600.0);
	assert_eq!(drop_at(&mut state, &fox(), 100.0, 100.0), DropOutcome::Placed("fox".into()));

	let node = state.store.node("fox").unwrap();
	assert_eq!(node.position, Some(Point::new(100.0, 100.0)));
	assert_eq!(node.shape, Shape::Rectangle);
	assert_eq!(node.description, "An animal");
	assert!(state.store.keyword_bank(&[fox()]).is_empty());
}

#[test]
fn flowchart_drops_snap_to_the_grid() {
	let mut state = CanvasState::new(DiagramType::Flowchart, 800.0, 600.0);
	drop_at(&mut state, &fox(), 107.0, 93.0);
	assert_eq!(state.store.node("fox").unwrap().position, Some(Point::new(100.0, 100.0)));
}

#[test]
fn dropping_the_same_keyword_twice_keeps_one_node() {
	let mut state = CanvasState::new(DiagramType::MindMap, 800.0, 600.0);
	drop_at(&mut state, &fox(), 100.0, 100.0);
	assert_eq!(
		drop_at(&mut state, &fox(), 300.0, 300.0),
		DropOutcome::AlreadyPlaced("fox".into())
	);
	assert_eq!(state.store.nodes().len(), 1);
	assert_eq!(state.store.node("fox").unwrap().position, Some(Point::new(100.0, 100.0)));
}

#[test]
fn malformed_drop_leaves_the_diagram_alone() {
	let mut state = CanvasState::new(DiagramType::NetworkDiagram, 800.0, 600.0);
	let revision = state.store.revision();
	let payload = TransferPayload {
		json: Some("{not json".into()),
		text: None,
	};
	assert_eq!(
		state.drop_keyword(&payload, Point::new(10.0, 10.0)),
		DropOutcome::Ignored
	);
	assert_eq!(
		state.drop_keyword(&TransferPayload::default(), Point::new(10.0, 10.0)),
		DropOutcome::Ignored
	);
	assert!(state.store.nodes().is_empty());
	assert_eq!(state.store.revision(), revision);
}

#[test]
fn link_two_nodes_then_delete_the_link() {
	let mut state = CanvasState::new(DiagramType::ConceptMap, 800.0, 600.0);
	drop_at(&mut state, &Keyword::new("a", ""), 100.0, 100.0);
	drop_at(&mut state, &Keyword::new("b", ""), 300.0, 100.0);

	state.dispatch(CanvasEvent::DoubleClick {
		node: "a".into(),
		edit_modifier: false,
	});
	assert_eq!(state.interaction.focus(), &Focus::Linking("a".into()));
	state.dispatch(CanvasEvent::Click(Target::Node("a".into())));
	assert_eq!(state.interaction.focus(), &Focus::Linking("a".into()));
	state.dispatch(CanvasEvent::Click(Target::Node("b".into())));
	assert_eq!(state.interaction.focus(), &Focus::Idle);
	assert_eq!(state.store.links().len(), 1);

	let link = state.store.links()[0].id;
	let midpoint = Point::new(200.0, 100.0);
	assert_eq!(state.target_at(midpoint), Target::Link(link));
	let target = state.target_at(midpoint);
	state.dispatch(CanvasEvent::Click(target));
	state.dispatch(CanvasEvent::KeyDown(Key::Delete));

	assert!(state.store.links().is_empty());
	assert!(state.store.contains("a") && state.store.contains("b"));
	assert_eq!(state.interaction.focus(), &Focus::Idle);
}

#[test]
fn deleting_a_node_cascades_to_its_links() {
	let mut state = CanvasState::new(DiagramType::NetworkDiagram, 800.0, 600.0);
	for (name, x) in [("a", 100.0), ("b", 300.0), ("c", 500.0)] {
		drop_at(&mut state, &Keyword::new(name, ""), x, 100.0);
	}
	state.store.add_link("a", "b").unwrap();
	state.store.add_link("b", "c").unwrap();

	state.dispatch(CanvasEvent::Click(Target::Node("b".into())));
	state.dispatch(CanvasEvent::KeyDown(Key::from_name("Backspace")));

	assert!(!state.store.contains("b"));
	assert!(state.store.links().is_empty());
	assert_eq!(state.store.keyword_bank(&[Keyword::new("b", "")]).len(), 1);
}

#[test]
fn flowchart_drag_snaps_and_swallows_the_click() {
	let mut state = CanvasState::new(DiagramType::Flowchart, 800.0, 600.0);
	drop_at(&mut state, &fox(), 100.0, 100.0);

	state.dispatch(CanvasEvent::PointerDown {
		node: "fox".into(),
		at: Point::new(100.0, 100.0),
	});
	state.dispatch(CanvasEvent::PointerMove(Point::new(107.0, 113.0)));
	state.dispatch(CanvasEvent::PointerUp);
	state.dispatch(CanvasEvent::Click(Target::Node("fox".into())));

	assert_eq!(state.store.node("fox").unwrap().position, Some(Point::new(100.0, 120.0)));
	assert_eq!(state.interaction.focus(), &Focus::Idle);
}

#[test]
fn shift_double_click_renames_a_flowchart_node_and_its_links() {
	let mut state = CanvasState::new(DiagramType::Flowchart, 800.0, 600.0);
	drop_at(&mut state, &fox(), 100.0, 100.0);
	drop_at(&mut state, &Keyword::new("den", ""), 300.0, 100.0);
	state.store.add_link("fox", "den").unwrap();

	state.dispatch(CanvasEvent::DoubleClick {
		node: "fox".into(),
		edit_modifier: true,
	});
	assert_eq!(state.interaction.focus(), &Focus::Editing("fox".into()));
	state.dispatch(CanvasEvent::CommitEdit("  Arctic fox ".into()));

	assert_eq!(state.interaction.focus(), &Focus::Idle);
	assert!(!state.store.contains("fox"));
	assert_eq!(state.store.links()[0].source, "Arctic fox");
	assert_eq!(state.store.keyword_bank(&[fox()]), vec![fox()]);
}

#[test]
fn physics_keeps_every_node_on_the_canvas() {
	let mut state = CanvasState::new(DiagramType::NetworkDiagram, 400.0, 300.0);
	for i in 0..12 {
		state
			.store
			.add_node(&Keyword::new(format!("k{i}"), ""), None)
			.unwrap();
	}
	for i in 1..12 {
		state.store.add_link("k0", &format!("k{i}")).unwrap();
	}
	for _ in 0..300 {
		state.tick(0.016);
	}
	for node in state.store.nodes() {
		let p = node.position.unwrap();
		assert!((0.0..=400.0).contains(&p.x), "{} escaped: {:?}", node.id, p);
		assert!((0.0..=300.0).contains(&p.y), "{} escaped: {:?}", node.id, p);
	}
}
