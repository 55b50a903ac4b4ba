use log::debug;

use super::drop::{DropOutcome, TransferPayload, complete_drop};
use super::graph::GraphStore;
use super::interaction::{CanvasEvent, Interaction, Target};
use super::layout::Layout;
use super::scene::{
	NODE_RADIUS, SELECTED_RADIUS, Scene, SceneInput, build_scene, flowchart_link_segment,
	in_shape_bounds,
};
use super::text::TextMeasure;
use super::types::{DiagramType, LinkId, Point, Shape, Template};

/// Extra reach around a circle for pointer hits.
pub const HIT_SLOP: f64 = 4.0;
/// Half-width of the invisible band around a link that counts as a hit.
pub const LINK_HIT_WIDTH: f64 = 6.0;

/// Everything one mounted canvas owns.
pub struct CanvasState {
	/// Nodes and links.
	pub store: GraphStore,
	/// Focus, drag and pointer.
	pub interaction: Interaction,
	/// Active positioning strategy.
	pub layout: Layout,
	/// Selected diagram type.
	pub diagram: DiagramType,
	/// Canvas width.
	pub width: f64,
	/// Canvas height.
	pub height: f64,
	/// Node under the pointer.
	pub hover: Option<String>,
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len2 = dx * dx + dy * dy;
	if len2 == 0.0 {
		return p.distance(a);
	}
	let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
	p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

impl CanvasState {
	/// An empty diagram of `diagram` type on a `width` x `height` canvas.
	pub fn new(diagram: DiagramType, width: f64, height: f64) -> Self {
		Self {
			store: GraphStore::new(),
			interaction: Interaction::new(),
			layout: Layout::for_template(Self::template_of(diagram), width, height),
			diagram,
			width,
			height,
			hover: None,
		}
	}

	fn template_of(diagram: DiagramType) -> Template {
		diagram.template().unwrap_or(Template::ForceGeneric)
	}

	/// Strategy of the current diagram type.
	pub fn template(&self) -> Template {
		Self::template_of(self.diagram)
	}

	/// Switch templates, keeping nodes and links.
	pub fn set_diagram(&mut self, diagram: DiagramType) {
		if diagram == self.diagram {
			return;
		}
		let was_grid = self.layout.is_grid();
		self.diagram = diagram;
		let layout = Layout::for_template(self.template(), self.width, self.height);
		if layout.is_grid() != was_grid {
			debug!("switching layout for {}", diagram.label());
			self.layout = layout;
			self.interaction = Interaction::new();
		}
	}

	/// Track a new canvas size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.layout.resize(width, height);
	}

	/// Advance layout by `dt` seconds. Returns whether anything moved.
	///
	/// Hover follows the nodes: a node sliding under a still pointer
	/// becomes hovered, and one sliding away stops being hovered.
	pub fn tick(&mut self, dt: f32) -> bool {
		let moved = self.layout.tick(&mut self.store, dt);
		if let Some(at) = self.interaction.pointer() {
			let hovered = self.node_at_position(at);
			self.set_hover(hovered);
		}
		moved
	}

	/// Topmost node under canvas point `p`.
	pub fn node_at_position(&self, p: Point) -> Option<String> {
		let template = self.template();
		let selected = self.interaction.selected_node();
		self.store
			.nodes()
			.iter()
			.rev()
			.find(|node| {
				let Some(center) = node.position else {
					return false;
				};
				match template {
					Template::Flowchart => in_shape_bounds(center, p),
					_ => {
						let radius = if selected == Some(node.id.as_str()) {
							SELECTED_RADIUS
						} else {
							NODE_RADIUS
						};
						center.distance(p) <= radius + HIT_SLOP
					}
				}
			})
			.map(|node| node.id.clone())
	}

	/// Topmost link under canvas point `p`.
	pub fn link_at_position(&self, p: Point) -> Option<LinkId> {
		let template = self.template();
		self.store
			.links()
			.iter()
			.rev()
			.find(|link| {
				let segment = match template {
					Template::Flowchart => flowchart_link_segment(&self.store, link),
					_ => self
						.store
						.node(&link.source)
						.and_then(|s| s.position)
						.zip(self.store.node(&link.target).and_then(|t| t.position)),
				};
				segment.is_some_and(|(a, b)| distance_to_segment(p, a, b) <= LINK_HIT_WIDTH)
			})
			.map(|link| link.id)
	}

	/// What a click at `p` lands on. Nodes are drawn above links.
	pub fn target_at(&self, p: Point) -> Target {
		if let Some(id) = self.node_at_position(p) {
			return Target::Node(id);
		}
		match self.link_at_position(p) {
			Some(id) => Target::Link(id),
			None => Target::Canvas,
		}
	}

	/// Feed one input event to the state machine.
	pub fn dispatch(&mut self, event: CanvasEvent) {
		let template = self.template();
		self.interaction
			.dispatch(event, &mut self.store, &mut self.layout, template);
		if let Some(id) = &self.hover
			&& !self.store.contains(id)
		{
			self.hover = None;
		}
	}

	/// Update the hovered node unless a drag is in progress.
	pub fn set_hover(&mut self, node: Option<String>) {
		if self.interaction.drag().is_none() {
			self.hover = node;
		}
	}

	/// Complete a palette drop at canvas point `at`.
	pub fn drop_keyword(&mut self, payload: &TransferPayload, at: Point) -> DropOutcome {
		complete_drop(&mut self.store, &self.layout, payload, at)
	}

	/// Change the outline of the selected flowchart node.
	pub fn set_selected_shape(&mut self, shape: Shape) {
		if let Some(id) = self.interaction.selected_node().map(str::to_string) {
			let _ = self.store.set_shape(&id, shape);
		}
	}

	/// Derive the frame for the current state.
	pub fn scene(&self, measure: &dyn TextMeasure) -> Scene {
		build_scene(
			&SceneInput {
				template: self.template(),
				store: &self.store,
				interaction: &self.interaction,
				hover: self.hover.as_deref(),
				width: self.width,
				height: self.height,
			},
			measure,
		)
	}
}
