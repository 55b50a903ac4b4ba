//! Template renderer: turns graph + interaction state into a flat list of
//! drawing primitives. The scene is rebuilt from scratch on every frame.

use super::graph::GraphStore;
use super::interaction::Interaction;
use super::layout::GRID_SIZE;
use super::text::{TextMeasure, centered_offsets, wrap_words};
use super::types::{Link, Node, Point, Shape, Template};

/// Circle radius in force templates.
pub const NODE_RADIUS: f64 = 12.0;
/// Circle radius of the selected node.
pub const SELECTED_RADIUS: f64 = 16.0;
/// Flowchart shape width.
pub const SHAPE_WIDTH: f64 = 120.0;
/// Flowchart shape height.
pub const SHAPE_HEIGHT: f64 = 60.0;
const PARALLELOGRAM_SKEW: f64 = 15.0;
const LABEL_PADDING: f64 = 10.0;
const LABEL_SIZE: f64 = 12.0;
const LABEL_LINE_HEIGHT: f64 = 14.0;
/// Gap left between a link's start and the source outline.
pub const SOURCE_PADDING: f64 = 4.0;
/// Gap left between a link's arrow tip and the target outline.
pub const TARGET_PADDING: f64 = 10.0;
const ARROW_SIZE: f64 = 10.0;
const TOOLTIP_SIZE: f64 = 12.0;

const BACKGROUND: &str = "#111827";
const GRID_COLOR: &str = "rgba(255, 255, 255, 0.05)";
const NODE_FILL: &str = "#6366f1";
const NODE_STROKE: &str = "#a5b4fc";
const SELECTED_STROKE: &str = "#ef4444";
const LINKING_FILL: &str = "#f97316";
const LINK_COLOR: &str = "#6b7280";
const SELECTED_LINK: &str = "#f43f5e";
const LABEL_COLOR: &str = "#e0e7ff";
const SHAPE_FILL: &str = "#1f2937";
const SHAPE_LINKING_FILL: &str = "#7c2d12";
const DIMMED_FILL: &str = "rgba(31, 41, 55, 0.4)";
const DIMMED_STROKE: &str = "rgba(99, 102, 241, 0.4)";
const TOOLTIP_FILL: &str = "rgba(17, 24, 39, 0.92)";

const SWOT_CATEGORIES: [(&str, &str); 4] = [
	("Strengths", "#10b981"),
	("Weaknesses", "#f43f5e"),
	("Opportunities", "#3b82f6"),
	("Threats", "#f97316"),
];

/// Outline style.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
	/// CSS color.
	pub color: &'static str,
	/// Line width.
	pub width: f64,
	/// Dash and gap lengths.
	pub dash: Option<(f64, f64)>,
}

impl Stroke {
	const fn solid(color: &'static str, width: f64) -> Self {
		Self {
			color,
			width,
			dash: None,
		}
	}
}

/// Horizontal text anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
	/// Text starts at the anchor.
	Left,
	/// Text is centered on the anchor.
	Center,
}

/// One drawing instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
	/// Axis-aligned, optionally rounded rectangle.
	Rect {
		/// Top-left corner.
		origin: Point,
		/// Width.
		width: f64,
		/// Height.
		height: f64,
		/// Corner radius.
		radius: f64,
		/// Fill color.
		fill: Option<&'static str>,
		/// Outline.
		stroke: Option<Stroke>,
	},
	/// Circle.
	Circle {
		/// Center.
		center: Point,
		/// Radius.
		radius: f64,
		/// Fill color.
		fill: &'static str,
		/// Outline.
		stroke: Stroke,
	},
	/// Axis-aligned ellipse.
	Ellipse {
		/// Center.
		center: Point,
		/// Horizontal radius.
		rx: f64,
		/// Vertical radius.
		ry: f64,
		/// Fill color.
		fill: &'static str,
		/// Outline.
		stroke: Stroke,
	},
	/// Closed polygon.
	Polygon {
		/// Vertices in order.
		points: Vec<Point>,
		/// Fill color.
		fill: Option<&'static str>,
		/// Outline.
		stroke: Option<Stroke>,
	},
	/// Straight segment.
	Line {
		/// Start.
		from: Point,
		/// End.
		to: Point,
		/// Style.
		stroke: Stroke,
	},
	/// Single line of text, baseline at `at`.
	Text {
		/// Anchor.
		at: Point,
		/// Content.
		text: String,
		/// CSS color.
		color: &'static str,
		/// Font size in pixels.
		size: f64,
		/// Bold weight.
		bold: bool,
		/// Anchor alignment.
		align: Align,
	},
}

/// Where the inline label editor goes.
#[derive(Clone, Debug, PartialEq)]
pub struct EditOverlay {
	/// Node being edited.
	pub node: String,
	/// Top-left of the input box.
	pub origin: Point,
	/// Input width.
	pub width: f64,
	/// Input height.
	pub height: f64,
	/// Initial text.
	pub text: String,
}

/// A fully derived frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
	/// Canvas width.
	pub width: f64,
	/// Canvas height.
	pub height: f64,
	/// Clear color.
	pub background: &'static str,
	/// Back-to-front drawing order.
	pub primitives: Vec<Primitive>,
	/// Inline editor placement, if editing.
	pub edit_overlay: Option<EditOverlay>,
}

/// Everything the renderer reads.
pub struct SceneInput<'a> {
	/// Active strategy.
	pub template: Template,
	/// Nodes and links.
	pub store: &'a GraphStore,
	/// Focus, drag and pointer.
	pub interaction: &'a Interaction,
	/// Node under the pointer.
	pub hover: Option<&'a str>,
	/// Canvas width.
	pub width: f64,
	/// Canvas height.
	pub height: f64,
}

/// Distance from a shape's center to its outline along the unit vector (ux, uy).
pub fn boundary_distance(shape: Shape, ux: f64, uy: f64) -> f64 {
	let (hw, hh) = (SHAPE_WIDTH / 2.0, SHAPE_HEIGHT / 2.0);
	let (ax, ay) = (ux.abs(), uy.abs());
	match shape {
		Shape::Rectangle | Shape::Parallelogram => {
			let tx = if ax > 0.0 { hw / ax } else { f64::INFINITY };
			let ty = if ay > 0.0 { hh / ay } else { f64::INFINITY };
			tx.min(ty)
		}
		Shape::Oval => 1.0 / ((ux / hw).powi(2) + (uy / hh).powi(2)).sqrt(),
		Shape::Diamond => 1.0 / (ax / hw + ay / hh),
	}
}

/// The visible segment of a flowchart link: from just outside the source
/// outline to the arrow tip just outside the target outline.
pub fn flowchart_link_segment(store: &GraphStore, link: &Link) -> Option<(Point, Point)> {
	let source = store.node(&link.source)?;
	let target = store.node(&link.target)?;
	let (a, b) = (source.position?, target.position?);
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len = dx.hypot(dy);
	if len < f64::EPSILON {
		return None;
	}
	let (ux, uy) = (dx / len, dy / len);
	let start = boundary_distance(source.shape, ux, uy) + SOURCE_PADDING;
	let end = boundary_distance(target.shape, ux, uy) + TARGET_PADDING;
	if start + end >= len {
		return None;
	}
	Some((
		Point::new(a.x + ux * start, a.y + uy * start),
		Point::new(b.x - ux * end, b.y - uy * end),
	))
}

/// Inner label width for a flowchart shape.
pub fn label_width(shape: Shape) -> f64 {
	match shape {
		Shape::Rectangle | Shape::Oval => SHAPE_WIDTH - 2.0 * LABEL_PADDING,
		Shape::Parallelogram => SHAPE_WIDTH - 2.0 * (LABEL_PADDING + PARALLELOGRAM_SKEW),
		Shape::Diamond => SHAPE_WIDTH / 2.0,
	}
}

/// Whether `p` falls inside the bounding box of a flowchart node at `center`.
pub fn in_shape_bounds(center: Point, p: Point) -> bool {
	(p.x - center.x).abs() <= SHAPE_WIDTH / 2.0 && (p.y - center.y).abs() <= SHAPE_HEIGHT / 2.0
}

/// Build the frame for the current state.
pub fn build_scene(input: &SceneInput<'_>, measure: &dyn TextMeasure) -> Scene {
	let mut out = Vec::new();
	let mut edit_overlay = None;
	match input.template {
		Template::Swot => {
			swot_background(input.width, input.height, &mut out);
			force_scene(input, &mut out);
		}
		Template::ForceGeneric => force_scene(input, &mut out),
		Template::Flowchart => {
			grid_background(input.width, input.height, &mut out);
			edit_overlay = flowchart_scene(input, measure, &mut out);
		}
	}
	linking_guide(input, &mut out);
	tooltip(input, measure, &mut out);
	Scene {
		width: input.width,
		height: input.height,
		background: BACKGROUND,
		primitives: out,
		edit_overlay,
	}
}

fn swot_background(width: f64, height: f64, out: &mut Vec<Primitive>) {
	let (cell_w, cell_h) = (width / 2.0 - 20.0, height / 2.0 - 20.0);
	for (i, (name, color)) in SWOT_CATEGORIES.iter().enumerate() {
		let origin = Point::new(
			10.0 + (i % 2) as f64 * (cell_w + 20.0),
			10.0 + (i / 2) as f64 * (cell_h + 20.0),
		);
		out.push(Primitive::Rect {
			origin,
			width: cell_w,
			height: cell_h,
			radius: 8.0,
			fill: Some(SHAPE_FILL),
			stroke: Some(Stroke::solid(color, 1.0)),
		});
		out.push(Primitive::Text {
			at: Point::new(origin.x + 15.0, origin.y + 25.0),
			text: name.to_string(),
			color,
			size: 18.0,
			bold: true,
			align: Align::Left,
		});
	}
}

fn grid_background(width: f64, height: f64, out: &mut Vec<Primitive>) {
	let stroke = Stroke::solid(GRID_COLOR, 1.0);
	let mut x = 0.0;
	while x <= width {
		out.push(Primitive::Line {
			from: Point::new(x, 0.0),
			to: Point::new(x, height),
			stroke,
		});
		x += GRID_SIZE;
	}
	let mut y = 0.0;
	while y <= height {
		out.push(Primitive::Line {
			from: Point::new(0.0, y),
			to: Point::new(width, y),
			stroke,
		});
		y += GRID_SIZE;
	}
}

fn force_scene(input: &SceneInput<'_>, out: &mut Vec<Primitive>) {
	let store = input.store;
	let selected_link = input.interaction.selected_link();
	for link in store.links() {
		let (Some(a), Some(b)) = (position(store, &link.source), position(store, &link.target))
		else {
			continue;
		};
		let stroke = if selected_link == Some(link.id) {
			Stroke::solid(SELECTED_LINK, 5.0)
		} else {
			Stroke::solid(LINK_COLOR, 2.0)
		};
		out.push(Primitive::Line {
			from: a,
			to: b,
			stroke,
		});
	}

	let selected = input.interaction.selected_node();
	let linking = input.interaction.linking_source();
	for node in store.nodes() {
		let Some(p) = node.position else { continue };
		let is_selected = selected == Some(node.id.as_str());
		out.push(Primitive::Circle {
			center: p,
			radius: if is_selected { SELECTED_RADIUS } else { NODE_RADIUS },
			fill: if linking == Some(node.id.as_str()) {
				LINKING_FILL
			} else {
				NODE_FILL
			},
			stroke: Stroke::solid(
				if is_selected { SELECTED_STROKE } else { NODE_STROKE },
				2.0,
			),
		});
		out.push(Primitive::Text {
			at: Point::new(p.x + 18.0, p.y + 6.0),
			text: node.id.clone(),
			color: LABEL_COLOR,
			size: 14.0,
			bold: false,
			align: Align::Left,
		});
	}
}

fn flowchart_scene(
	input: &SceneInput<'_>,
	measure: &dyn TextMeasure,
	out: &mut Vec<Primitive>,
) -> Option<EditOverlay> {
	let store = input.store;
	let selected_link = input.interaction.selected_link();
	for link in store.links() {
		let Some((from, to)) = flowchart_link_segment(store, link) else {
			continue;
		};
		let (color, width) = if selected_link == Some(link.id) {
			(SELECTED_LINK, 3.0)
		} else {
			("#9ca3af", 2.0)
		};
		let len = from.distance(to);
		let (ux, uy) = ((to.x - from.x) / len, (to.y - from.y) / len);
		let back = Point::new(to.x - ux * ARROW_SIZE, to.y - uy * ARROW_SIZE);
		let (px, py) = (-uy * ARROW_SIZE * 0.5, ux * ARROW_SIZE * 0.5);
		out.push(Primitive::Line {
			from,
			to: back,
			stroke: Stroke::solid(color, width),
		});
		out.push(Primitive::Polygon {
			points: vec![
				to,
				Point::new(back.x + px, back.y + py),
				Point::new(back.x - px, back.y - py),
			],
			fill: Some(color),
			stroke: None,
		});
	}

	let selected = input.interaction.selected_node();
	let linking = input.interaction.linking_source();
	let editing = input.interaction.editing();
	let mut overlay = None;
	for node in store.nodes() {
		let Some(p) = node.position else { continue };
		let id = node.id.as_str();
		let (fill, stroke) = if editing == Some(id) {
			(DIMMED_FILL, Stroke::solid(DIMMED_STROKE, 2.0))
		} else if linking == Some(id) {
			(SHAPE_LINKING_FILL, Stroke::solid(LINKING_FILL, 3.0))
		} else if selected == Some(id) {
			(SHAPE_FILL, Stroke::solid(SELECTED_STROKE, 3.0))
		} else {
			(SHAPE_FILL, Stroke::solid(NODE_FILL, 2.0))
		};
		out.push(shape_outline(node.shape, p, fill, stroke));

		if editing == Some(id) {
			overlay = Some(EditOverlay {
				node: node.id.clone(),
				origin: Point::new(p.x - SHAPE_WIDTH / 2.0, p.y - SHAPE_HEIGHT / 2.0),
				width: SHAPE_WIDTH,
				height: SHAPE_HEIGHT,
				text: node.id.clone(),
			});
			continue;
		}
		shape_label(node, p, measure, out);
	}
	overlay
}

fn shape_outline(shape: Shape, c: Point, fill: &'static str, stroke: Stroke) -> Primitive {
	let (hw, hh) = (SHAPE_WIDTH / 2.0, SHAPE_HEIGHT / 2.0);
	match shape {
		Shape::Rectangle => Primitive::Rect {
			origin: Point::new(c.x - hw, c.y - hh),
			width: SHAPE_WIDTH,
			height: SHAPE_HEIGHT,
			radius: 4.0,
			fill: Some(fill),
			stroke: Some(stroke),
		},
		Shape::Oval => Primitive::Ellipse {
			center: c,
			rx: hw,
			ry: hh,
			fill,
			stroke,
		},
		Shape::Diamond => Primitive::Polygon {
			points: vec![
				Point::new(c.x, c.y - hh),
				Point::new(c.x + hw, c.y),
				Point::new(c.x, c.y + hh),
				Point::new(c.x - hw, c.y),
			],
			fill: Some(fill),
			stroke: Some(stroke),
		},
		Shape::Parallelogram => Primitive::Polygon {
			points: vec![
				Point::new(c.x - hw + PARALLELOGRAM_SKEW, c.y - hh),
				Point::new(c.x + hw, c.y - hh),
				Point::new(c.x + hw - PARALLELOGRAM_SKEW, c.y + hh),
				Point::new(c.x - hw, c.y + hh),
			],
			fill: Some(fill),
			stroke: Some(stroke),
		},
	}
}

fn shape_label(node: &Node, c: Point, measure: &dyn TextMeasure, out: &mut Vec<Primitive>) {
	let lines = wrap_words(&node.id, label_width(node.shape), LABEL_SIZE, measure);
	let offsets = centered_offsets(lines.len(), LABEL_LINE_HEIGHT);
	for (line, dy) in lines.into_iter().zip(offsets) {
		out.push(Primitive::Text {
			// baseline sits a third of the font size below the line center
			at: Point::new(c.x, c.y + dy + LABEL_SIZE / 3.0),
			text: line,
			color: LABEL_COLOR,
			size: LABEL_SIZE,
			bold: false,
			align: Align::Center,
		});
	}
}

fn linking_guide(input: &SceneInput<'_>, out: &mut Vec<Primitive>) {
	let Some(source) = input.interaction.linking_source() else {
		return;
	};
	let (Some(from), Some(to)) = (position(input.store, source), input.interaction.pointer())
	else {
		return;
	};
	out.push(Primitive::Line {
		from,
		to,
		stroke: Stroke {
			color: LINKING_FILL,
			width: 2.0,
			dash: Some((4.0, 4.0)),
		},
	});
}

fn tooltip(input: &SceneInput<'_>, measure: &dyn TextMeasure, out: &mut Vec<Primitive>) {
	if input.interaction.drag().is_some() {
		return;
	}
	let (Some(id), Some(pointer)) = (input.hover, input.interaction.pointer()) else {
		return;
	};
	let Some(node) = input.store.node(id) else {
		return;
	};
	if node.description.is_empty() {
		return;
	}
	let width = measure.width(&node.description, TOOLTIP_SIZE) + 12.0;
	let height = TOOLTIP_SIZE + 10.0;
	let origin = Point::new(
		(pointer.x + 12.0).min(input.width - width).max(0.0),
		(pointer.y + 12.0).min(input.height - height).max(0.0),
	);
	out.push(Primitive::Rect {
		origin,
		width,
		height,
		radius: 4.0,
		fill: Some(TOOLTIP_FILL),
		stroke: Some(Stroke::solid(NODE_STROKE, 1.0)),
	});
	out.push(Primitive::Text {
		at: Point::new(origin.x + 6.0, origin.y + TOOLTIP_SIZE + 3.0),
		text: node.description.clone(),
		color: LABEL_COLOR,
		size: TOOLTIP_SIZE,
		bold: false,
		align: Align::Left,
	});
}

fn position(store: &GraphStore, id: &str) -> Option<Point> {
	store.node(id).and_then(|n| n.position)
}
