//! Pointer and keyboard input mediated into graph mutations.
//!
//! | State          | Entered by                         | Left by                                |
//! |----------------|------------------------------------|----------------------------------------|
//! | `Idle`         | empty-canvas click, link, delete   | any element click / double-click       |
//! | `NodeSelected` | node click (not linking)           | delete, other click, double-click      |
//! | `LinkSelected` | link click                         | delete, other click, double-click      |
//! | `Linking`      | node double-click                  | click on another node, canvas, link    |
//! | `Editing`      | Shift + double-click (flowchart)   | commit / blur of the edit field        |

use log::{debug, warn};

use super::graph::GraphStore;
use super::layout::Layout;
use super::types::{LinkId, Point, Template};

/// Pointer travel below which a press counts as a click, not a drag.
const DRAG_THRESHOLD: f64 = 3.0;

/// The single element holding focus.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Focus {
	/// Nothing focused.
	#[default]
	Idle,
	/// A node is selected.
	NodeSelected(String),
	/// A link is selected.
	LinkSelected(LinkId),
	/// A link gesture started from this node.
	Linking(String),
	/// This node's label is being edited inline.
	Editing(String),
}

/// What a click landed on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
	/// Empty canvas.
	Canvas,
	/// A node, by id.
	Node(String),
	/// A link, by identity.
	Link(LinkId),
}

/// Keys the canvas reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
	/// Delete or Backspace.
	Delete,
	/// Anything else.
	Other,
}

impl Key {
	/// Classify a `KeyboardEvent.key` value.
	pub fn from_name(name: &str) -> Self {
		match name {
			"Delete" | "Backspace" => Key::Delete,
			_ => Key::Other,
		}
	}
}

/// Input events, in canvas coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasEvent {
	/// Single click.
	Click(Target),
	/// Double click on a node.
	DoubleClick {
		/// Node id.
		node: String,
		/// Whether the edit modifier (Shift) was held.
		edit_modifier: bool,
	},
	/// Key pressed anywhere in the window.
	KeyDown(Key),
	/// Button pressed over a node.
	PointerDown {
		/// Node id.
		node: String,
		/// Pointer position.
		at: Point,
	},
	/// Pointer moved.
	PointerMove(Point),
	/// Button released.
	PointerUp,
	/// Pointer left the canvas. Ends any drag and forgets the pointer.
	PointerLeave,
	/// Inline edit field submitted or blurred with this text.
	CommitEdit(String),
}

/// An in-progress node drag.
#[derive(Clone, Debug, PartialEq)]
pub struct DragState {
	/// Grabbed node.
	pub node: String,
	/// Pointer position at press.
	pub start: Point,
	/// Node position at press.
	pub node_start: Point,
	/// Whether the pointer travelled past the click threshold.
	pub moved: bool,
}

/// Focus, drag and pointer tracking for one canvas.
#[derive(Clone, Debug, Default)]
pub struct Interaction {
	focus: Focus,
	drag: Option<DragState>,
	pointer: Option<Point>,
	suppress_click: bool,
}

impl Interaction {
	/// Idle, no pointer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Current focus.
	pub fn focus(&self) -> &Focus {
		&self.focus
	}

	/// Last known pointer position.
	pub fn pointer(&self) -> Option<Point> {
		self.pointer
	}

	/// The drag in progress, if any.
	pub fn drag(&self) -> Option<&DragState> {
		self.drag.as_ref()
	}

	/// Selected node id.
	pub fn selected_node(&self) -> Option<&str> {
		match &self.focus {
			Focus::NodeSelected(id) => Some(id),
			_ => None,
		}
	}

	/// Selected link.
	pub fn selected_link(&self) -> Option<LinkId> {
		match self.focus {
			Focus::LinkSelected(id) => Some(id),
			_ => None,
		}
	}

	/// Source of the link gesture in progress.
	pub fn linking_source(&self) -> Option<&str> {
		match &self.focus {
			Focus::Linking(id) => Some(id),
			_ => None,
		}
	}

	/// Node whose label is being edited.
	pub fn editing(&self) -> Option<&str> {
		match &self.focus {
			Focus::Editing(id) => Some(id),
			_ => None,
		}
	}

	/// Apply one event. Mutations go to `store`; drags go through `layout`.
	pub fn dispatch(
		&mut self,
		event: CanvasEvent,
		store: &mut GraphStore,
		layout: &mut Layout,
		template: Template,
	) {
		match event {
			CanvasEvent::Click(target) => {
				if std::mem::take(&mut self.suppress_click) {
					return;
				}
				self.click(target, store);
			}
			CanvasEvent::DoubleClick {
				node,
				edit_modifier,
			} => {
				if !store.contains(&node) {
					return;
				}
				self.focus = if edit_modifier && template == Template::Flowchart {
					Focus::Editing(node)
				} else {
					Focus::Linking(node)
				};
			}
			CanvasEvent::KeyDown(Key::Delete) => self.delete_selection(store),
			CanvasEvent::KeyDown(Key::Other) => {}
			CanvasEvent::PointerDown { node, at } => {
				self.suppress_click = false;
				if self.editing().is_some() {
					return;
				}
				let Some(node_start) = store.node(&node).and_then(|n| n.position) else {
					return;
				};
				layout.begin_drag(store, &node);
				self.drag = Some(DragState {
					node,
					start: at,
					node_start,
					moved: false,
				});
			}
			CanvasEvent::PointerMove(at) => {
				self.pointer = Some(at);
				if let Some(drag) = &mut self.drag {
					if !drag.moved && drag.start.distance(at) < DRAG_THRESHOLD {
						return;
					}
					drag.moved = true;
					let to = Point::new(
						drag.node_start.x + (at.x - drag.start.x),
						drag.node_start.y + (at.y - drag.start.y),
					);
					layout.drag_to(store, &drag.node, to);
				}
			}
			CanvasEvent::PointerUp => self.release(store, layout),
			CanvasEvent::PointerLeave => {
				self.release(store, layout);
				self.pointer = None;
			}
			CanvasEvent::CommitEdit(text) => {
				let Focus::Editing(id) = std::mem::take(&mut self.focus) else {
					return;
				};
				if let Err(e) = store.rename_node(&id, &text) {
					warn!("rename of `{}` rejected: {}", id, e);
				}
			}
		}
	}

	fn release(&mut self, store: &mut GraphStore, layout: &mut Layout) {
		if let Some(drag) = self.drag.take() {
			layout.end_drag(store, &drag.node);
			self.suppress_click = drag.moved;
		}
	}

	fn click(&mut self, target: Target, store: &mut GraphStore) {
		match target {
			Target::Canvas => self.focus = Focus::Idle,
			Target::Link(id) => self.focus = Focus::LinkSelected(id),
			Target::Node(node) => match &self.focus {
				Focus::Linking(source) if *source == node => {
					debug!("ignoring self-link on `{}`", node);
				}
				Focus::Linking(source) => {
					if let Err(e) = store.add_link(source, &node) {
						warn!("link rejected: {}", e);
					}
					self.focus = Focus::Idle;
				}
				_ => self.focus = Focus::NodeSelected(node),
			},
		}
	}

	fn delete_selection(&mut self, store: &mut GraphStore) {
		let result = match &self.focus {
			Focus::NodeSelected(id) => store.remove_node(id).map(drop),
			Focus::LinkSelected(id) => store.remove_link(*id).map(drop),
			_ => return,
		};
		if let Err(e) = result {
			warn!("delete failed: {}", e);
		}
		self.focus = Focus::Idle;
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::canvas::types::Keyword;

	struct Rig {
		store: GraphStore,
		layout: Layout,
		template: Template,
		machine: Interaction,
	}

	impl Rig {
		fn new(template: Template, names: &[&str]) -> Self {
			let mut store = GraphStore::new();
			let layout = Layout::for_template(template, 800.0, 600.0);
			for (i, name) in names.iter().enumerate() {
				let at = layout.place(Some(Point::new(100.0 + 200.0 * i as f64, 100.0)));
				store.add_node(&Keyword::new(*name, ""), at).unwrap();
			}
			Self {
				store,
				layout,
				template,
				machine: Interaction::new(),
			}
		}

		fn send(&mut self, event: CanvasEvent) {
			self.machine
				.dispatch(event, &mut self.store, &mut self.layout, self.template);
		}

		fn click_node(&mut self, id: &str) {
			self.send(CanvasEvent::Click(Target::Node(id.into())));
		}

		fn double_click(&mut self, id: &str, edit_modifier: bool) {
			self.send(CanvasEvent::DoubleClick {
				node: id.into(),
				edit_modifier,
			});
		}
	}

	#[test]
	fn clicking_the_linking_source_again_keeps_linking() {
		let mut rig = Rig::new(Template::ForceGeneric, &["a", "b"]);
		rig.double_click("a", false);
		assert_eq!(rig.machine.focus(), &Focus::Linking("a".into()));

		rig.click_node("a");
		assert_eq!(rig.machine.focus(), &Focus::Linking("a".into()));
		assert!(rig.store.links().is_empty());

		rig.click_node("b");
		assert_eq!(rig.machine.focus(), &Focus::Idle);
		assert_eq!(rig.store.links().len(), 1);
		assert_eq!(rig.store.links()[0].source, "a");
		assert_eq!(rig.store.links()[0].target, "b");
	}

	#[test]
	fn empty_canvas_click_cancels_linking() {
		let mut rig = Rig::new(Template::ForceGeneric, &["a", "b"]);
		rig.double_click("a", false);
		rig.send(CanvasEvent::Click(Target::Canvas));
		assert_eq!(rig.machine.focus(), &Focus::Idle);
		rig.click_node("b");
		assert_eq!(rig.machine.focus(), &Focus::NodeSelected("b".into()));
		assert!(rig.store.links().is_empty());
	}

	#[test]
	fn link_click_cancels_linking_and_selects_link() {
		let mut rig = Rig::new(Template::ForceGeneric, &["a", "b", "c"]);
		let ab = rig.store.add_link("a", "b").unwrap();
		rig.double_click("c", false);
		rig.send(CanvasEvent::Click(Target::Link(ab)));
		assert_eq!(rig.machine.focus(), &Focus::LinkSelected(ab));
	}

	#[test]
	fn delete_removes_only_the_selected_link() {
		let mut rig = Rig::new(Template::ForceGeneric, &["a", "b"]);
		let first = rig.store.add_link("a", "b").unwrap();
		let second = rig.store.add_link("a", "b").unwrap();

		rig.send(CanvasEvent::Click(Target::Link(first)));
		rig.send(CanvasEvent::KeyDown(Key::from_name("Delete")));

		assert_eq!(rig.machine.focus(), &Focus::Idle);
		assert_eq!(rig.store.nodes().len(), 2);
		assert_eq!(rig.store.links().len(), 1);
		assert_eq!(rig.store.links()[0].id, second);
	}

	#[test]
	fn backspace_removes_selected_node_and_its_links() {
		let mut rig = Rig::new(Template::ForceGeneric, &["a", "b", "c"]);
		rig.store.add_link("a", "b").unwrap();
		rig.store.add_link("b", "c").unwrap();

		rig.click_node("b");
		rig.send(CanvasEvent::KeyDown(Key::from_name("Backspace")));

		assert!(!rig.store.contains("b"));
		assert!(rig.store.links().is_empty());
		assert_eq!(rig.machine.focus(), &Focus::Idle);
	}

	#[test]
	fn delete_without_selection_does_nothing() {
		let mut rig = Rig::new(Template::ForceGeneric, &["a"]);
		rig.double_click("a", false);
		rig.send(CanvasEvent::KeyDown(Key::Delete));
		assert!(rig.store.contains("a"));
		assert_eq!(rig.machine.focus(), &Focus::Linking("a".into()));
	}

	#[test]
	fn edit_modifier_only_edits_on_flowcharts() {
		let mut rig = Rig::new(Template::ForceGeneric, &["a"]);
		rig.double_click("a", true);
		assert_eq!(rig.machine.focus(), &Focus::Linking("a".into()));

		let mut rig = Rig::new(Template::Flowchart, &["a"]);
		rig.click_node("a");
		rig.double_click("a", true);
		assert_eq!(rig.machine.focus(), &Focus::Editing("a".into()));
	}

	#[test]
	fn committing_an_edit_renames_the_node() {
		let mut rig = Rig::new(Template::Flowchart, &["a", "b"]);
		rig.store.add_link("a", "b").unwrap();
		rig.double_click("a", true);
		rig.send(CanvasEvent::CommitEdit("Start".into()));

		assert_eq!(rig.machine.focus(), &Focus::Idle);
		assert!(rig.store.contains("Start"));
		assert_eq!(rig.store.links()[0].source, "Start");

		// the blur that follows a submit is ignored
		rig.send(CanvasEvent::CommitEdit("Other".into()));
		assert!(rig.store.contains("Start"));
	}

	#[test]
	fn empty_edit_keeps_the_label() {
		let mut rig = Rig::new(Template::Flowchart, &["a"]);
		rig.double_click("a", true);
		rig.send(CanvasEvent::CommitEdit(String::new()));
		assert!(rig.store.contains("a"));
		assert_eq!(rig.machine.focus(), &Focus::Idle);
	}

	#[test]
	fn flowchart_drag_snaps_to_grid() {
		let mut rig = Rig::new(Template::Flowchart, &["a"]);
		rig.send(CanvasEvent::PointerDown {
			node: "a".into(),
			at: Point::new(100.0, 100.0),
		});
		rig.send(CanvasEvent::PointerMove(Point::new(137.0, 151.0)));
		rig.send(CanvasEvent::PointerUp);

		assert_eq!(
			rig.store.node("a").unwrap().position,
			Some(Point::new(140.0, 160.0))
		);
		// the click that follows a real drag is swallowed
		rig.click_node("a");
		assert_eq!(rig.machine.focus(), &Focus::Idle);
		rig.click_node("a");
		assert_eq!(rig.machine.focus(), &Focus::NodeSelected("a".into()));
	}

	#[test]
	fn dragging_is_disabled_while_editing() {
		let mut rig = Rig::new(Template::Flowchart, &["a"]);
		rig.double_click("a", true);
		rig.send(CanvasEvent::PointerDown {
			node: "a".into(),
			at: Point::new(100.0, 100.0),
		});
		rig.send(CanvasEvent::PointerMove(Point::new(300.0, 300.0)));
		assert!(rig.machine.drag().is_none());
		assert_eq!(
			rig.store.node("a").unwrap().position,
			Some(Point::new(100.0, 100.0))
		);
	}

	#[test]
	fn physics_drag_pins_then_releases() {
		let mut rig = Rig::new(Template::ForceGeneric, &["a"]);
		rig.send(CanvasEvent::PointerDown {
			node: "a".into(),
			at: Point::new(105.0, 100.0),
		});
		rig.send(CanvasEvent::PointerMove(Point::new(205.0, 150.0)));
		assert_eq!(
			rig.store.node("a").unwrap().pinned,
			Some(Point::new(200.0, 150.0))
		);
		rig.send(CanvasEvent::PointerUp);
		assert_eq!(rig.store.node("a").unwrap().pinned, None);
	}

	#[test]
	fn leaving_the_canvas_ends_the_drag_and_forgets_the_pointer() {
		let mut rig = Rig::new(Template::ForceGeneric, &["a"]);
		rig.send(CanvasEvent::PointerDown {
			node: "a".into(),
			at: Point::new(105.0, 100.0),
		});
		rig.send(CanvasEvent::PointerMove(Point::new(205.0, 150.0)));
		rig.send(CanvasEvent::PointerLeave);

		assert!(rig.machine.drag().is_none());
		assert_eq!(rig.machine.pointer(), None);
		assert_eq!(rig.store.node("a").unwrap().pinned, None);
	}

	#[test]
	fn selecting_clears_linking_and_vice_versa() {
		let mut rig = Rig::new(Template::ForceGeneric, &["a", "b"]);
		rig.click_node("a");
		rig.double_click("b", false);
		assert_eq!(rig.machine.selected_node(), None);
		assert_eq!(rig.machine.linking_source(), Some("b"));
	}
}
