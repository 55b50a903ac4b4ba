use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A keyword record as returned by the keyword service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
	/// Candidate node id.
	pub name: String,
	/// One-sentence description, shown as a tooltip.
	pub description: String,
}

impl Keyword {
	/// Build a keyword from borrowed parts.
	pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			description: description.into(),
		}
	}
}

/// Payload of a successful keyword extraction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedData {
	/// Extracted keywords in service order.
	pub keywords: Vec<Keyword>,
}

/// A point in canvas coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Point {
	/// Construct a point.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance to `other`.
	pub fn distance(self, other: Point) -> f64 {
		(self.x - other.x).hypot(self.y - other.y)
	}
}

/// Flowchart node outline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Shape {
	/// Process box.
	#[default]
	Rectangle,
	/// Start / end terminal.
	Oval,
	/// Decision.
	Diamond,
	/// Input / output.
	Parallelogram,
}

impl Shape {
	/// Every shape, in palette order.
	pub const ALL: [Shape; 4] = [
		Shape::Rectangle,
		Shape::Oval,
		Shape::Diamond,
		Shape::Parallelogram,
	];

	/// Human-readable name.
	pub fn label(self) -> &'static str {
		match self {
			Shape::Rectangle => "Rectangle",
			Shape::Oval => "Oval",
			Shape::Diamond => "Diamond",
			Shape::Parallelogram => "Parallelogram",
		}
	}
}

/// A placed keyword on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Display label, unique within the diagram.
	pub id: String,
	/// Tooltip text.
	pub description: String,
	/// Outline used by the flowchart template.
	pub shape: Shape,
	/// Last laid-out position, if any.
	pub position: Option<Point>,
	/// Pointer-grabbed override for the physics engine.
	pub pinned: Option<Point>,
}

impl Node {
	/// A fresh rectangle node for `keyword`.
	pub fn from_keyword(keyword: &Keyword, position: Option<Point>) -> Self {
		Self {
			id: keyword.name.clone(),
			description: keyword.description.clone(),
			shape: Shape::default(),
			position,
			pinned: None,
		}
	}
}

/// Identity of a link. Parallel links between the same pair get distinct ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub u64);

impl fmt::Display for LinkId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "link#{}", self.0)
	}
}

/// A connection between two nodes, stored by id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
	/// Identity used for selection and deletion.
	pub id: LinkId,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
}

impl Link {
	/// Whether this link has `node` as either endpoint.
	pub fn touches(&self, node: &str) -> bool {
		self.source == node || self.target == node
	}
}

/// Rendering/layout strategy a diagram type dispatches to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Template {
	/// Quadrant background plus a force scene.
	Swot,
	/// Grid-snapped shapes with arrowed links.
	Flowchart,
	/// Circles and lines driven by the force scene.
	ForceGeneric,
}

/// Selectable diagram templates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DiagramType {
	/// Free-form network.
	#[default]
	NetworkDiagram,
	/// Central idea with branches.
	MindMap,
	/// Concepts and relations.
	ConceptMap,
	/// Hierarchy.
	TreeDiagram,
	/// Grid-snapped process chart.
	Flowchart,
	/// Strengths / weaknesses / opportunities / threats.
	SwotAnalysis,
	/// Word associations.
	SemanticMap,
	/// Overlapping sets. Not implemented.
	VennDiagram,
}

impl DiagramType {
	/// Every member of the catalogue, in menu order.
	pub const ALL: [DiagramType; 8] = [
		DiagramType::NetworkDiagram,
		DiagramType::MindMap,
		DiagramType::ConceptMap,
		DiagramType::TreeDiagram,
		DiagramType::Flowchart,
		DiagramType::SwotAnalysis,
		DiagramType::SemanticMap,
		DiagramType::VennDiagram,
	];

	/// Members the canvas can actually draw.
	pub fn selectable() -> impl Iterator<Item = DiagramType> {
		Self::ALL.into_iter().filter(|t| t.template().is_some())
	}

	/// Strategy for this type, or `None` when it has no renderer yet.
	pub fn template(self) -> Option<Template> {
		match self {
			DiagramType::SwotAnalysis => Some(Template::Swot),
			DiagramType::Flowchart => Some(Template::Flowchart),
			DiagramType::VennDiagram => None,
			_ => Some(Template::ForceGeneric),
		}
	}

	/// Menu label.
	pub fn label(self) -> &'static str {
		match self {
			DiagramType::NetworkDiagram => "Network Diagram",
			DiagramType::MindMap => "Mind Map",
			DiagramType::ConceptMap => "Concept Map",
			DiagramType::TreeDiagram => "Tree Diagram",
			DiagramType::Flowchart => "Flowchart",
			DiagramType::SwotAnalysis => "SWOT Analysis",
			DiagramType::SemanticMap => "Semantic Map",
			DiagramType::VennDiagram => "Venn Diagram",
		}
	}

	/// Stable identifier used as the `<option>` value.
	pub fn as_str(self) -> &'static str {
		match self {
			DiagramType::NetworkDiagram => "NetworkDiagram",
			DiagramType::MindMap => "MindMap",
			DiagramType::ConceptMap => "ConceptMap",
			DiagramType::TreeDiagram => "TreeDiagram",
			DiagramType::Flowchart => "Flowchart",
			DiagramType::SwotAnalysis => "SWOTAnalysis",
			DiagramType::SemanticMap => "SemanticMap",
			DiagramType::VennDiagram => "VennDiagram",
		}
	}
}

/// Raised when parsing an unknown diagram identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown diagram type `{0}`")]
pub struct UnknownDiagramType(pub String);

impl FromStr for DiagramType {
	type Err = UnknownDiagramType;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|t| t.as_str() == s)
			.ok_or_else(|| UnknownDiagramType(s.to_string()))
	}
}
