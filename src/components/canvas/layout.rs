//! Positioning strategies: a force simulation for free-form templates and
//! grid snapping for flowcharts.
//!
//! Charge and velocity integration run through `force_graph`; link rest
//! length, centering, collision, and the canvas boundary are applied as
//! position passes after each integration step, scaled by `alpha`.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use super::graph::GraphStore;
use super::types::{Point, Template};

/// Flowchart grid spacing.
pub const GRID_SIZE: f64 = 20.0;

/// Simulation tuning, in the spirit of `SimulationParameters`.
#[derive(Clone, Debug)]
pub struct ForceConfig {
	/// Pairwise repulsion handed to `force_graph`.
	pub charge: f32,
	/// Per-step force clamp.
	pub force_max: f32,
	/// Velocity scale.
	pub node_speed: f32,
	/// Velocity retained per step.
	pub damping_factor: f32,
	/// Mass assigned to every body.
	pub mass: f32,
	/// Rest length of a link.
	pub link_distance: f64,
	/// Pull of the whole system toward the canvas center, 0..=1.
	pub center_strength: f64,
	/// Minimum separation is twice this.
	pub collide_radius: f64,
	/// Collision correction per step, 0..=1.
	pub collide_strength: f64,
	/// Inset applied by the hard boundary clamp.
	pub bounds_radius: f64,
	/// Below this the simulation idles.
	pub alpha_min: f64,
	/// Fraction of the gap to `alpha_target` closed per tick.
	pub alpha_decay: f64,
	/// Energy held while a node is being dragged.
	pub drag_alpha_target: f64,
}

impl Default for ForceConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			charge: 150.0,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			mass: 10.0,
			link_distance: 150.0,
			center_strength: 1.0,
			collide_radius: 50.0,
			collide_strength: 0.7,
			bounds_radius: 16.0,
			alpha_min,
			// settles in roughly 300 ticks from alpha = 1
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			drag_alpha_target: 0.3,
		}
	}
}

/// Round `value` to the nearest multiple of `unit`.
pub fn snap(value: f64, unit: f64) -> f64 {
	(value / unit).round() * unit
}

/// Snap both axes to [`GRID_SIZE`].
pub fn snap_point(p: Point) -> Point {
	Point::new(snap(p.x, GRID_SIZE), snap(p.y, GRID_SIZE))
}

/// A simulated body for the position passes.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Body {
	pos: Point,
	fixed: bool,
}

fn apply_links(bodies: &mut [Body], links: &[(usize, usize)], distance: f64, alpha: f64) {
	let mut degree = vec![0usize; bodies.len()];
	for &(s, t) in links {
		degree[s] += 1;
		degree[t] += 1;
	}
	for &(s, t) in links {
		let (a, b) = (bodies[s].pos, bodies[t].pos);
		let (mut dx, mut dy) = (b.x - a.x, b.y - a.y);
		if dx == 0.0 && dy == 0.0 {
			dx = 1e-6;
			dy = 1e-6;
		}
		let len = dx.hypot(dy);
		let strength = 1.0 / degree[s].min(degree[t]) as f64;
		let k = (len - distance) / len * alpha * strength;
		let bias = degree[s] as f64 / (degree[s] + degree[t]) as f64;
		let (mx, my) = (dx * k, dy * k);
		if !bodies[t].fixed {
			bodies[t].pos.x -= mx * bias;
			bodies[t].pos.y -= my * bias;
		}
		if !bodies[s].fixed {
			bodies[s].pos.x += mx * (1.0 - bias);
			bodies[s].pos.y += my * (1.0 - bias);
		}
	}
}

fn apply_center(bodies: &mut [Body], center: Point, strength: f64) {
	let free: Vec<_> = bodies.iter().filter(|b| !b.fixed).collect();
	if free.is_empty() {
		return;
	}
	let n = free.len() as f64;
	let (sx, sy) = free
		.iter()
		.fold((0.0, 0.0), |(x, y), b| (x + b.pos.x, y + b.pos.y));
	let (dx, dy) = ((center.x - sx / n) * strength, (center.y - sy / n) * strength);
	for body in bodies.iter_mut().filter(|b| !b.fixed) {
		body.pos.x += dx;
		body.pos.y += dy;
	}
}

fn apply_collide(bodies: &mut [Body], radius: f64, strength: f64) {
	let min = radius * 2.0;
	for i in 0..bodies.len() {
		for j in (i + 1)..bodies.len() {
			let (a, b) = (bodies[i].pos, bodies[j].pos);
			let (mut dx, mut dy) = (b.x - a.x, b.y - a.y);
			let mut dist = dx.hypot(dy);
			if dist >= min {
				continue;
			}
			if dist == 0.0 {
				// deterministic jiggle for coincident bodies
				let angle = (i * 31 + j * 17) as f64;
				(dx, dy) = (angle.cos(), angle.sin());
				dist = 1.0;
			}
			let push = (min - dist) / dist * strength * 0.5;
			let (px, py) = (dx * push, dy * push);
			match (bodies[i].fixed, bodies[j].fixed) {
				(true, true) => {}
				(true, false) => {
					bodies[j].pos.x += px * 2.0;
					bodies[j].pos.y += py * 2.0;
				}
				(false, true) => {
					bodies[i].pos.x -= px * 2.0;
					bodies[i].pos.y -= py * 2.0;
				}
				(false, false) => {
					bodies[i].pos.x -= px;
					bodies[i].pos.y -= py;
					bodies[j].pos.x += px;
					bodies[j].pos.y += py;
				}
			}
		}
	}
}

fn clamp_to_bounds(p: Point, width: f64, height: f64, radius: f64) -> Point {
	let clamp = |v: f64, max: f64| {
		if !v.is_finite() {
			return max / 2.0;
		}
		v.min(max - radius).max(radius)
	};
	Point::new(clamp(p.x, width), clamp(p.y, height))
}

/// Continuous force simulation over the store's nodes and links.
pub struct ForceLayout {
	graph: ForceGraph<String, ()>,
	index: HashMap<String, DefaultNodeIdx>,
	links: Vec<(usize, usize)>,
	order: Vec<String>,
	config: ForceConfig,
	alpha: f64,
	alpha_target: f64,
	revision: Option<u64>,
	width: f64,
	height: f64,
}

impl ForceLayout {
	/// An idle simulation for a `width` x `height` canvas.
	pub fn new(config: ForceConfig, width: f64, height: f64) -> Self {
		Self {
			graph: ForceGraph::new(Self::parameters(&config)),
			index: HashMap::new(),
			links: Vec::new(),
			order: Vec::new(),
			config,
			alpha: 1.0,
			alpha_target: 0.0,
			revision: None,
			width,
			height,
		}
	}

	fn parameters(config: &ForceConfig) -> SimulationParameters {
		SimulationParameters {
			force_charge: config.charge,
			// link rest length is handled by `apply_links`
			force_spring: 0.0,
			force_max: config.force_max,
			node_speed: config.node_speed,
			damping_factor: config.damping_factor,
		}
	}

	/// Current energy.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Whether another tick would move anything.
	pub fn is_running(&self) -> bool {
		self.alpha >= self.config.alpha_min || self.alpha_target >= self.config.alpha_min
	}

	/// Reheat to at least `alpha`.
	pub fn restart(&mut self, alpha: f64) {
		self.alpha = self.alpha.max(alpha);
	}

	/// Energy the simulation converges toward.
	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	/// Canvas center.
	pub fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}

	/// Change the canvas bounds and let the system re-settle.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.restart(0.3);
	}

	/// Rebuild the simulated bodies when the store's structure changed.
	///
	/// Positions are kept; nodes without one are seeded on a spiral around
	/// the center. Returns whether a rebuild happened.
	pub fn sync(&mut self, store: &mut GraphStore) -> bool {
		if self.revision == Some(store.revision()) {
			return false;
		}
		let center = self.center();
		let mut graph = ForceGraph::new(Self::parameters(&self.config));
		let mut index = HashMap::new();
		let mut order = Vec::with_capacity(store.nodes().len());
		let mut seeds = Vec::new();

		for (i, node) in store.nodes().iter().enumerate() {
			let pos = node.position.unwrap_or_else(|| {
				// phyllotaxis spiral, as d3 seeds unplaced nodes
				let radius = 10.0 * (0.5 + i as f64).sqrt();
				let angle = i as f64 * PI * (3.0 - 5f64.sqrt());
				let p = Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin());
				seeds.push((node.id.clone(), p));
				p
			});
			let idx = graph.add_node(NodeData {
				x: pos.x as f32,
				y: pos.y as f32,
				mass: self.config.mass,
				is_anchor: node.pinned.is_some(),
				user_data: node.id.clone(),
			});
			index.insert(node.id.clone(), idx);
			order.push(node.id.clone());
		}
		for (id, p) in seeds {
			store.set_position(&id, p);
		}

		let slot: HashMap<&str, usize> = order
			.iter()
			.enumerate()
			.map(|(i, id)| (id.as_str(), i))
			.collect();
		self.links = store
			.links()
			.iter()
			.filter_map(|l| Some((*slot.get(l.source.as_str())?, *slot.get(l.target.as_str())?)))
			.collect();

		debug!(
			"force layout rebuilt: {} nodes, {} links",
			order.len(),
			self.links.len()
		);
		self.graph = graph;
		self.index = index;
		self.order = order;
		self.revision = Some(store.revision());
		self.alpha = 1.0;
		true
	}

	/// Advance one step of `dt` seconds and write positions back to `store`.
	///
	/// Returns `false` once the simulation has gone idle.
	pub fn tick(&mut self, store: &mut GraphStore, dt: f32) -> bool {
		self.sync(store);
		if !self.is_running() {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

		// pinned positions are authoritative for this step
		let pins: HashMap<&str, Point> = store
			.nodes()
			.iter()
			.filter_map(|n| n.pinned.map(|p| (n.id.as_str(), p)))
			.collect();
		self.graph.visit_nodes_mut(|node| {
			match pins.get(node.data.user_data.as_str()) {
				Some(p) => {
					node.data.x = p.x as f32;
					node.data.y = p.y as f32;
					node.data.is_anchor = true;
				}
				None => node.data.is_anchor = false,
			}
		});

		self.graph.update(dt * self.alpha as f32);

		let mut positions: HashMap<DefaultNodeIdx, Point> = HashMap::new();
		self.graph.visit_nodes(|node| {
			positions.insert(node.index(), Point::new(node.x() as f64, node.y() as f64));
		});
		let mut bodies: Vec<Body> = self
			.order
			.iter()
			.map(|id| {
				let pinned = pins.get(id.as_str()).copied();
				let pos = pinned
					.or_else(|| self.index.get(id).and_then(|idx| positions.get(idx).copied()))
					.unwrap_or_else(|| self.center());
				Body {
					pos,
					fixed: pinned.is_some(),
				}
			})
			.collect();

		apply_links(&mut bodies, &self.links, self.config.link_distance, self.alpha);
		apply_center(&mut bodies, self.center(), self.config.center_strength * self.alpha);
		apply_collide(&mut bodies, self.config.collide_radius, self.config.collide_strength);
		for body in bodies.iter_mut().filter(|b| !b.fixed) {
			body.pos = clamp_to_bounds(body.pos, self.width, self.height, self.config.bounds_radius);
		}

		let by_index: HashMap<DefaultNodeIdx, Point> = self
			.order
			.iter()
			.zip(&bodies)
			.filter_map(|(id, b)| Some((*self.index.get(id)?, b.pos)))
			.collect();
		self.graph.visit_nodes_mut(|node| {
			if let Some(p) = by_index.get(&node.index()) {
				node.data.x = p.x as f32;
				node.data.y = p.y as f32;
			}
		});
		for (id, body) in self.order.iter().zip(&bodies) {
			store.set_position(id, body.pos);
		}
		true
	}
}

/// The positioning strategy active for the current template.
pub enum Layout {
	/// Force simulation for SWOT and generic templates.
	Physics(ForceLayout),
	/// Manual placement snapped to [`GRID_SIZE`].
	Grid {
		/// Canvas width.
		width: f64,
		/// Canvas height.
		height: f64,
	},
}

impl Layout {
	/// Strategy used by `template`.
	pub fn for_template(template: Template, width: f64, height: f64) -> Self {
		match template {
			Template::Flowchart => Layout::Grid { width, height },
			Template::Swot | Template::ForceGeneric => {
				Layout::Physics(ForceLayout::new(ForceConfig::default(), width, height))
			}
		}
	}

	/// Whether this is the grid strategy.
	pub fn is_grid(&self) -> bool {
		matches!(self, Layout::Grid { .. })
	}

	/// Position a newly added node should start at.
	pub fn place(&self, requested: Option<Point>) -> Option<Point> {
		match self {
			Layout::Physics(_) => requested,
			Layout::Grid { width, height } => Some(snap_point(
				requested.unwrap_or(Point::new(width / 2.0, height / 2.0)),
			)),
		}
	}

	/// Track a new canvas size.
	pub fn resize(&mut self, w: f64, h: f64) {
		match self {
			Layout::Physics(sim) => sim.resize(w, h),
			Layout::Grid { width, height } => {
				*width = w;
				*height = h;
			}
		}
	}

	/// A node was grabbed.
	pub fn begin_drag(&mut self, store: &mut GraphStore, id: &str) {
		if let Layout::Physics(sim) = self {
			let at = store.node(id).and_then(|n| n.position);
			store.set_pinned(id, at);
			sim.set_alpha_target(sim.config.drag_alpha_target);
			sim.restart(sim.config.drag_alpha_target);
		}
	}

	/// The grabbed node follows the pointer to `to`.
	pub fn drag_to(&mut self, store: &mut GraphStore, id: &str, to: Point) {
		match self {
			Layout::Physics(sim) => {
				let to = clamp_to_bounds(to, sim.width, sim.height, sim.config.bounds_radius);
				store.set_pinned(id, Some(to));
			}
			Layout::Grid { .. } => store.set_position(id, snap_point(to)),
		}
	}

	/// The grabbed node was released.
	pub fn end_drag(&mut self, store: &mut GraphStore, id: &str) {
		if let Layout::Physics(sim) = self {
			store.set_pinned(id, None);
			sim.set_alpha_target(0.0);
		}
	}

	/// Advance the simulation, if any. Returns whether positions moved.
	pub fn tick(&mut self, store: &mut GraphStore, dt: f32) -> bool {
		match self {
			Layout::Physics(sim) => sim.tick(store, dt),
			Layout::Grid { width, height } => {
				// give unplaced nodes the default slot
				let center = snap_point(Point::new(*width / 2.0, *height / 2.0));
				let unplaced: Vec<String> = store
					.nodes()
					.iter()
					.filter(|n| n.position.is_none())
					.map(|n| n.id.clone())
					.collect();
				for id in &unplaced {
					store.set_position(id, center);
				}
				!unplaced.is_empty()
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::canvas::types::Keyword;

	fn store_with(names: &[&str]) -> GraphStore {
		let mut store = GraphStore::new();
		for name in names {
			store.add_node(&Keyword::new(*name, ""), None).unwrap();
		}
		store
	}

	fn run(sim: &mut ForceLayout, store: &mut GraphStore, ticks: usize) {
		for _ in 0..ticks {
			sim.tick(store, 0.016);
		}
	}

	#[test]
	fn snap_rounds_to_nearest_multiple() {
		assert_eq!(snap(29.0, 20.0), 20.0);
		assert_eq!(snap(31.0, 20.0), 40.0);
		assert_eq!(snap(-11.0, 20.0), -20.0);
		assert_eq!(snap_point(Point::new(101.0, 99.0)), Point::new(100.0, 100.0));
	}

	#[test]
	fn grid_drag_always_lands_on_the_grid() {
		let mut store = store_with(&["a"]);
		let mut layout = Layout::Grid {
			width: 800.0,
			height: 600.0,
		};
		for (x, y) in [(13.7, 88.2), (401.0, 9.9), (-3.0, 250.5)] {
			layout.drag_to(&mut store, "a", Point::new(x, y));
			let p = store.node("a").unwrap().position.unwrap();
			assert_eq!(p.x % GRID_SIZE, 0.0);
			assert_eq!(p.y % GRID_SIZE, 0.0);
		}
	}

	#[test]
	fn grid_places_unpositioned_nodes_at_center() {
		let layout = Layout::Grid {
			width: 800.0,
			height: 600.0,
		};
		assert_eq!(layout.place(None), Some(Point::new(400.0, 300.0)));
		assert_eq!(
			layout.place(Some(Point::new(100.0, 100.0))),
			Some(Point::new(100.0, 100.0))
		);
	}

	#[test]
	fn physics_keeps_requested_position() {
		let layout = Layout::for_template(Template::ForceGeneric, 800.0, 600.0);
		assert_eq!(layout.place(Some(Point::new(3.0, 4.0))), Some(Point::new(3.0, 4.0)));
		assert_eq!(layout.place(None), None);
	}

	#[test]
	fn nodes_stay_inside_the_canvas() {
		let mut store = store_with(&["a", "b", "c", "d", "e"]);
		store.set_position("a", Point::new(-500.0, 5000.0));
		store.add_link("a", "b").unwrap();
		let mut sim = ForceLayout::new(ForceConfig::default(), 400.0, 300.0);
		run(&mut sim, &mut store, 50);

		let r = ForceConfig::default().bounds_radius;
		for node in store.nodes() {
			let p = node.position.unwrap();
			assert!(p.x >= r && p.x <= 400.0 - r, "{} x = {}", node.id, p.x);
			assert!(p.y >= r && p.y <= 300.0 - r, "{} y = {}", node.id, p.y);
		}
	}

	#[test]
	fn simulation_cools_down_and_reheats_on_mutation() {
		let mut store = store_with(&["a", "b"]);
		let mut sim = ForceLayout::new(ForceConfig::default(), 800.0, 600.0);
		run(&mut sim, &mut store, 400);
		assert!(!sim.is_running());
		assert!(!sim.tick(&mut store, 0.016));

		store.add_node(&Keyword::new("c", ""), None).unwrap();
		assert!(sim.tick(&mut store, 0.016));
		assert!(sim.alpha() > 0.9);
	}

	#[test]
	fn pinned_node_is_authoritative() {
		let mut store = store_with(&["a", "b", "c"]);
		let mut layout = Layout::for_template(Template::ForceGeneric, 800.0, 600.0);
		layout.tick(&mut store, 0.016);

		layout.begin_drag(&mut store, "a");
		let grab = Point::new(120.0, 140.0);
		layout.drag_to(&mut store, "a", grab);
		for _ in 0..20 {
			layout.tick(&mut store, 0.016);
			assert_eq!(store.node("a").unwrap().position, Some(grab));
		}

		layout.end_drag(&mut store, "a");
		assert_eq!(store.node("a").unwrap().pinned, None);
	}

	#[test]
	fn dragged_node_stays_inside_the_canvas() {
		let mut store = store_with(&["a", "b"]);
		let mut layout = Layout::for_template(Template::ForceGeneric, 400.0, 300.0);
		layout.tick(&mut store, 0.016);

		layout.begin_drag(&mut store, "a");
		layout.drag_to(&mut store, "a", Point::new(-14.0, 2.0));
		assert_eq!(store.node("a").unwrap().pinned, Some(Point::new(16.0, 16.0)));
		for _ in 0..5 {
			layout.tick(&mut store, 0.016);
			let p = store.node("a").unwrap().position.unwrap();
			assert!((16.0..=384.0).contains(&p.x) && (16.0..=284.0).contains(&p.y));
		}

		layout.drag_to(&mut store, "a", Point::new(900.0, 150.0));
		assert_eq!(store.node("a").unwrap().pinned, Some(Point::new(384.0, 150.0)));
	}

	#[test]
	fn dragging_holds_the_simulation_warm() {
		let mut store = store_with(&["a", "b"]);
		let mut layout = Layout::for_template(Template::ForceGeneric, 800.0, 600.0);
		for _ in 0..400 {
			layout.tick(&mut store, 0.016);
		}
		layout.begin_drag(&mut store, "a");
		for _ in 0..400 {
			assert!(layout.tick(&mut store, 0.016));
		}
		layout.end_drag(&mut store, "a");
		let Layout::Physics(sim) = &layout else {
			panic!("expected physics layout");
		};
		assert!(sim.alpha() >= 0.29);
	}

	#[test]
	fn link_pass_pulls_toward_rest_length() {
		let mut bodies = vec![
			Body {
				pos: Point::new(0.0, 0.0),
				fixed: false,
			},
			Body {
				pos: Point::new(400.0, 0.0),
				fixed: false,
			},
		];
		apply_links(&mut bodies, &[(0, 1)], 150.0, 1.0);
		let d = bodies[0].pos.distance(bodies[1].pos);
		assert!((d - 150.0).abs() < 1e-9, "distance {d}");
	}

	#[test]
	fn collide_pass_separates_overlapping_bodies() {
		let mut bodies = vec![
			Body {
				pos: Point::new(100.0, 100.0),
				fixed: false,
			},
			Body {
				pos: Point::new(110.0, 100.0),
				fixed: true,
			},
		];
		apply_collide(&mut bodies, 50.0, 1.0);
		assert_eq!(bodies[1].pos, Point::new(110.0, 100.0));
		assert!((bodies[0].pos.distance(bodies[1].pos) - 100.0).abs() < 1e-9);
	}

	#[test]
	fn center_pass_moves_centroid() {
		let mut bodies = vec![
			Body {
				pos: Point::new(0.0, 0.0),
				fixed: false,
			},
			Body {
				pos: Point::new(100.0, 0.0),
				fixed: false,
			},
		];
		apply_center(&mut bodies, Point::new(400.0, 300.0), 1.0);
		assert_eq!(bodies[0].pos, Point::new(350.0, 300.0));
		assert_eq!(bodies[1].pos, Point::new(450.0, 300.0));
	}

	mod properties {
		use proptest::prelude::*;

		use super::*;

		proptest! {
			#[test]
			fn grid_drags_land_on_the_grid(
				steps in prop::collection::vec((-1000.0..1000.0f64, -1000.0..1000.0f64), 1..20),
			) {
				let mut store = store_with(&["a"]);
				let mut layout = Layout::for_template(Template::Flowchart, 800.0, 600.0);
				layout.begin_drag(&mut store, "a");
				for (x, y) in steps {
					layout.drag_to(&mut store, "a", Point::new(x, y));
					let p = store.node("a").unwrap().position.unwrap();
					prop_assert_eq!(p.x % GRID_SIZE, 0.0);
					prop_assert_eq!(p.y % GRID_SIZE, 0.0);
				}
			}

			#[test]
			fn physics_drags_stay_on_the_canvas(
				steps in prop::collection::vec((-1000.0..1000.0f64, -1000.0..1000.0f64), 1..10),
			) {
				let mut store = store_with(&["a", "b"]);
				let mut layout = Layout::for_template(Template::ForceGeneric, 400.0, 300.0);
				layout.begin_drag(&mut store, "a");
				for (x, y) in steps {
					layout.drag_to(&mut store, "a", Point::new(x, y));
					layout.tick(&mut store, 0.016);
					for node in store.nodes() {
						let p = node.position.unwrap();
						prop_assert!((16.0..=384.0).contains(&p.x), "{} at {:?}", node.id, p);
						prop_assert!((16.0..=284.0).contains(&p.y), "{} at {:?}", node.id, p);
					}
				}
			}
		}
	}
}
