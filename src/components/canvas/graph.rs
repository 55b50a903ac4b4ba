//! Node and link collections for one diagram instance.

use std::collections::HashSet;

use log::debug;

use super::types::{Keyword, Link, LinkId, Node, Point, Shape};

/// Rejected graph mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
	/// No node carries this id.
	#[error("no node with id `{0}`")]
	UnknownNode(String),
	/// Links must join two distinct nodes.
	#[error("refusing to link `{0}` to itself")]
	SelfLink(String),
	/// Node ids are unique within a diagram.
	#[error("a node with id `{0}` already exists")]
	DuplicateNode(String),
	/// No link carries this id.
	#[error("no link {0}")]
	UnknownLink(LinkId),
}

/// Owns the diagram's nodes and links.
///
/// `revision` changes on every structural mutation (nodes, links, ids) so the
/// physics engine knows when to rebuild. Position updates do not bump it.
#[derive(Clone, Debug, Default)]
pub struct GraphStore {
	nodes: Vec<Node>,
	links: Vec<Link>,
	next_link: u64,
	revision: u64,
}

impl GraphStore {
	/// An empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Nodes in insertion (draw) order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Links in insertion order.
	pub fn links(&self) -> &[Link] {
		&self.links
	}

	/// Structural revision counter.
	pub fn revision(&self) -> u64 {
		self.revision
	}

	/// Look up a node by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Mutable lookup by id.
	pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}

	/// Look up a link by identity.
	pub fn link(&self, id: LinkId) -> Option<&Link> {
		self.links.iter().find(|l| l.id == id)
	}

	/// Whether a node with `id` exists.
	pub fn contains(&self, id: &str) -> bool {
		self.node(id).is_some()
	}

	/// Place `keyword` as a new node.
	pub fn add_node(&mut self, keyword: &Keyword, position: Option<Point>) -> Result<(), GraphError> {
		if self.contains(&keyword.name) {
			return Err(GraphError::DuplicateNode(keyword.name.clone()));
		}
		debug!("add node `{}` at {:?}", keyword.name, position);
		self.nodes.push(Node::from_keyword(keyword, position));
		self.revision += 1;
		Ok(())
	}

	/// Remove a node and every link touching it.
	pub fn remove_node(&mut self, id: &str) -> Result<Node, GraphError> {
		let idx = self
			.nodes
			.iter()
			.position(|n| n.id == id)
			.ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;
		let node = self.nodes.remove(idx);
		let before = self.links.len();
		self.links.retain(|l| !l.touches(id));
		debug!(
			"remove node `{}` and {} link(s)",
			id,
			before - self.links.len()
		);
		self.revision += 1;
		Ok(node)
	}

	/// Connect two distinct existing nodes.
	pub fn add_link(&mut self, source: &str, target: &str) -> Result<LinkId, GraphError> {
		if source == target {
			return Err(GraphError::SelfLink(source.to_string()));
		}
		for id in [source, target] {
			if !self.contains(id) {
				return Err(GraphError::UnknownNode(id.to_string()));
			}
		}
		let id = LinkId(self.next_link);
		self.next_link += 1;
		self.links.push(Link {
			id,
			source: source.to_string(),
			target: target.to_string(),
		});
		debug!("add {} `{}` -> `{}`", id, source, target);
		self.revision += 1;
		Ok(id)
	}

	/// Remove exactly the link with this identity.
	pub fn remove_link(&mut self, id: LinkId) -> Result<Link, GraphError> {
		let idx = self
			.links
			.iter()
			.rposition(|l| l.id == id)
			.ok_or(GraphError::UnknownLink(id))?;
		self.revision += 1;
		Ok(self.links.remove(idx))
	}

	/// Change a node's id, rewriting links that reference it.
	///
	/// The new id is trimmed; an empty result leaves the node unchanged.
	/// Returns the id the node ends up with.
	pub fn rename_node(&mut self, id: &str, new_id: &str) -> Result<String, GraphError> {
		let new_id = new_id.trim();
		if !self.contains(id) {
			return Err(GraphError::UnknownNode(id.to_string()));
		}
		if new_id.is_empty() || new_id == id {
			return Ok(id.to_string());
		}
		if self.contains(new_id) {
			return Err(GraphError::DuplicateNode(new_id.to_string()));
		}
		if let Some(node) = self.node_mut(id) {
			node.id = new_id.to_string();
		}
		for link in &mut self.links {
			if link.source == id {
				link.source = new_id.to_string();
			}
			if link.target == id {
				link.target = new_id.to_string();
			}
		}
		debug!("rename node `{}` -> `{}`", id, new_id);
		self.revision += 1;
		Ok(new_id.to_string())
	}

	/// Change a node's flowchart outline.
	pub fn set_shape(&mut self, id: &str, shape: Shape) -> Result<(), GraphError> {
		let node = self
			.node_mut(id)
			.ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;
		node.shape = shape;
		Ok(())
	}

	/// Move a node. Not a structural change.
	pub fn set_position(&mut self, id: &str, position: Point) {
		if let Some(node) = self.node_mut(id) {
			node.position = Some(position);
		}
	}

	/// Pin or release a node for the physics engine.
	pub fn set_pinned(&mut self, id: &str, pinned: Option<Point>) {
		if let Some(node) = self.node_mut(id) {
			node.pinned = pinned;
			if let Some(p) = pinned {
				node.position = Some(p);
			}
		}
	}

	/// Selected keywords that are not yet on the canvas, without duplicates.
	pub fn keyword_bank(&self, selected: &[Keyword]) -> Vec<Keyword> {
		unplaced(selected, |id| self.contains(id))
	}
}

/// `selected` minus anything `is_placed` reports, first occurrence wins.
pub fn unplaced(selected: &[Keyword], is_placed: impl Fn(&str) -> bool) -> Vec<Keyword> {
	let mut seen = HashSet::new();
	selected
		.iter()
		.filter(|k| !is_placed(&k.name) && seen.insert(k.name.as_str()))
		.cloned()
		.collect()
}
