//! Node positioning. Force and hierarchical layouts run an iterative
//! simulation driven by the animation frame loop; circular and grid layouts
//! fix every position up front. Positions live here and are mutated in
//! place between frames; the render surface only reads them.

use std::collections::HashMap;
use std::f64::consts::PI;

use super::types::{GraphEdge, GraphView, LayoutKind, LayoutSettings, SurfaceSize};

/// Simulation stops once the temperature falls below this.
pub const ALPHA_MIN: f64 = 0.001;

/// Temperature restored when a drag or filter change reheats the layout.
const REHEAT_ALPHA: f64 = 0.5;

/// Spring coefficient for the link force.
const LINK_STRENGTH: f64 = 0.1;

/// Pull toward the surface center.
const CENTER_STRENGTH: f64 = 0.05;

/// Pull toward the per-layer target row in the hierarchical layout.
const LAYER_STRENGTH: f64 = 0.1;

/// Minimum clearance between node discs.
const COLLISION_PADDING: f64 = 2.0;

/// Per-node simulation record. `fx`/`fy`, when set, pin the node: the
/// simulation snaps it back every step until the pin is cleared.
#[derive(Clone, Debug)]
pub struct SimNode {
	/// Graph node id this record tracks.
	pub id: String,
	/// Current x position.
	pub x: f64,
	/// Current y position.
	pub y: f64,
	/// Velocity x component.
	pub vx: f64,
	/// Velocity y component.
	pub vy: f64,
	/// Pinned x position, if any.
	pub fx: Option<f64>,
	/// Pinned y position, if any.
	pub fy: Option<f64>,
	/// Disc radius, used for collision separation.
	pub radius: f64,
}

impl SimNode {
	fn pinned(&self) -> bool {
		self.fx.is_some() && self.fy.is_some()
	}
}

/// Owns positions for the currently visible node set and advances them
/// according to the active layout.
#[derive(Debug, Default)]
pub struct LayoutEngine {
	nodes: Vec<SimNode>,
	index: HashMap<String, usize>,
	depths: HashMap<String, usize>,
	alpha: f64,
	alpha_target: f64,
}

impl LayoutEngine {
	/// New engine with no nodes and a cold simulation.
	pub fn new() -> Self {
		Self::default()
	}

	/// Current simulation records, in visible-node order.
	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	/// Record for one node id.
	pub fn node(&self, id: &str) -> Option<&SimNode> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	/// Whether the simulation still has heat in it.
	pub fn running(&self) -> bool {
		self.alpha >= ALPHA_MIN || self.alpha_target > 0.0
	}

	/// Reconcile the tracked set with the visible nodes. Surviving ids keep
	/// their position, velocity, and pin; new nodes seed on a small ring
	/// around the surface center so they do not all start stacked.
	pub fn sync(&mut self, view: &GraphView, surface: SurfaceSize) {
		let (cx, cy) = surface.center();
		let count = view.nodes.len().max(1);
		let old: HashMap<String, SimNode> = self
			.nodes
			.drain(..)
			.map(|n| (n.id.clone(), n))
			.collect();

		self.nodes = view
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				let radius = node_radius(node.value);
				match old.get(&node.id) {
					Some(prev) => SimNode {
						radius,
						..prev.clone()
					},
					None => {
						let angle = i as f64 * 2.0 * PI / count as f64;
						SimNode {
							id: node.id.clone(),
							x: cx + 100.0 * angle.cos(),
							y: cy + 100.0 * angle.sin(),
							vx: 0.0,
							vy: 0.0,
							fx: None,
							fy: None,
							radius,
						}
					}
				}
			})
			.collect();
		self.index = self
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), i))
			.collect();
		self.depths.retain(|id, _| self.index.contains_key(id));
	}

	/// Recompute hierarchical layer depths against the current visible
	/// edges, leaving positions and pins alone. Without this a filter
	/// change would keep steering nodes toward rows computed for the old
	/// membership.
	pub fn refresh_depths(&mut self, edges: &[GraphEdge]) {
		self.depths = layer_depths(&self.nodes, edges, &self.index);
	}

	/// Apply a layout from scratch. Every prior pin is cleared first so
	/// fixed positions from circular/grid (or user drags) never leak into
	/// the next layout. No-op on an empty node set.
	pub fn apply_layout(
		&mut self,
		settings: &LayoutSettings,
		surface: SurfaceSize,
		edges: &[GraphEdge],
	) {
		if self.nodes.is_empty() {
			return;
		}
		for node in &mut self.nodes {
			node.fx = None;
			node.fy = None;
			node.vx = 0.0;
			node.vy = 0.0;
		}
		self.depths.clear();

		match settings.kind {
			LayoutKind::Force => {
				self.alpha = 1.0;
			}
			LayoutKind::Hierarchical => {
				self.depths = layer_depths(&self.nodes, edges, &self.index);
				self.alpha = 1.0;
			}
			LayoutKind::Circular => {
				let (cx, cy) = surface.center();
				let ring = surface.width.min(surface.height) / 3.0;
				let count = self.nodes.len();
				for (i, node) in self.nodes.iter_mut().enumerate() {
					let angle = i as f64 * 2.0 * PI / count as f64;
					node.x = cx + ring * angle.cos();
					node.y = cy + ring * angle.sin();
					node.fx = Some(node.x);
					node.fy = Some(node.y);
				}
				self.alpha = 0.0;
			}
			LayoutKind::Grid => {
				let count = self.nodes.len();
				let cols = (count as f64).sqrt().ceil().max(1.0) as usize;
				let rows = count.div_ceil(cols);
				let margin = 60.0;
				let cell_w = (surface.width - 2.0 * margin) / cols.max(1) as f64;
				let cell_h = (surface.height - 2.0 * margin) / rows.max(1) as f64;
				for (i, node) in self.nodes.iter_mut().enumerate() {
					let (col, row) = (i % cols, i / cols);
					node.x = margin + cell_w * (col as f64 + 0.5);
					node.y = margin + cell_h * (row as f64 + 0.5);
					node.fx = Some(node.x);
					node.fy = Some(node.y);
				}
				self.alpha = 0.0;
			}
		}
	}

	/// Advance the simulation one step. Returns `false` once settled (or
	/// immediately for fixed layouts and empty node sets), so the frame
	/// loop can treat the layout as idle.
	pub fn tick(
		&mut self,
		settings: &LayoutSettings,
		surface: SurfaceSize,
		edges: &[GraphEdge],
	) -> bool {
		if self.nodes.is_empty() || !settings.kind.simulated() {
			return false;
		}
		if !self.running() {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * settings.alpha_decay;
		let alpha = self.alpha;

		// Link springs toward the configured rest length.
		for edge in edges {
			let (Some(&a), Some(&b)) = (
				self.index.get(edge.source.as_str()),
				self.index.get(edge.target.as_str()),
			) else {
				continue;
			};
			if a == b {
				continue;
			}
			let dx = self.nodes[b].x - self.nodes[a].x;
			let dy = self.nodes[b].y - self.nodes[a].y;
			let dist = (dx * dx + dy * dy).sqrt().max(1e-6);
			let pull = (dist - settings.link_distance) * LINK_STRENGTH * alpha;
			let (ux, uy) = (dx / dist, dy / dist);
			self.nodes[a].vx += ux * pull;
			self.nodes[a].vy += uy * pull;
			self.nodes[b].vx -= ux * pull;
			self.nodes[b].vy -= uy * pull;
		}

		// Pairwise charge. O(n²) is fine at dashboard scale.
		for i in 0..self.nodes.len() {
			for j in (i + 1)..self.nodes.len() {
				let dx = self.nodes[j].x - self.nodes[i].x;
				let dy = self.nodes[j].y - self.nodes[i].y;
				let d2 = (dx * dx + dy * dy).max(1.0);
				let dist = d2.sqrt();
				let push = settings.charge_strength * alpha / d2;
				let (ux, uy) = (dx / dist, dy / dist);
				self.nodes[i].vx += ux * push;
				self.nodes[i].vy += uy * push;
				self.nodes[j].vx -= ux * push;
				self.nodes[j].vy -= uy * push;
			}
		}

		// Centering, plus the layer bias when hierarchical.
		let (cx, cy) = surface.center();
		let max_depth = self.depths.values().copied().max().unwrap_or(0);
		let layer_gap = if max_depth > 0 {
			(surface.height - 120.0) / max_depth as f64
		} else {
			0.0
		};
		for node in &mut self.nodes {
			node.vx += (cx - node.x) * CENTER_STRENGTH * alpha;
			if let Some(&depth) = self.depths.get(&node.id) {
				let target_y = 60.0 + depth as f64 * layer_gap;
				node.vy += (target_y - node.y) * LAYER_STRENGTH * alpha;
			} else {
				node.vy += (cy - node.y) * CENTER_STRENGTH * alpha;
			}
		}

		// Collision: separate overlapping discs directly.
		for i in 0..self.nodes.len() {
			for j in (i + 1)..self.nodes.len() {
				let dx = self.nodes[j].x - self.nodes[i].x;
				let dy = self.nodes[j].y - self.nodes[i].y;
				let dist = (dx * dx + dy * dy).sqrt().max(1e-6);
				let min_sep = self.nodes[i].radius + self.nodes[j].radius + COLLISION_PADDING;
				if dist < min_sep {
					let shift = (min_sep - dist) / 2.0;
					let (ux, uy) = (dx / dist, dy / dist);
					self.nodes[i].x -= ux * shift;
					self.nodes[i].y -= uy * shift;
					self.nodes[j].x += ux * shift;
					self.nodes[j].y += uy * shift;
				}
			}
		}

		// Integrate; pinned nodes snap to their pin.
		let damping = 1.0 - settings.velocity_decay.clamp(0.0, 0.99);
		for node in &mut self.nodes {
			if node.pinned() {
				node.x = node.fx.unwrap_or(node.x);
				node.y = node.fy.unwrap_or(node.y);
				node.vx = 0.0;
				node.vy = 0.0;
				continue;
			}
			node.vx *= damping;
			node.vy *= damping;
			node.x += node.vx;
			node.y += node.vy;
		}
		true
	}

	/// Fix a node at a position, as during and after a drag.
	pub fn pin(&mut self, id: &str, x: f64, y: f64) {
		if let Some(&i) = self.index.get(id) {
			let node = &mut self.nodes[i];
			node.x = x;
			node.y = y;
			node.fx = Some(x);
			node.fy = Some(y);
			node.vx = 0.0;
			node.vy = 0.0;
		}
	}

	/// Release a pin so the simulation controls the node again.
	pub fn unpin(&mut self, id: &str) {
		if let Some(&i) = self.index.get(id) {
			self.nodes[i].fx = None;
			self.nodes[i].fy = None;
		}
	}

	/// Restore temperature so the layout responds to a live interaction.
	pub fn reheat(&mut self) {
		self.alpha = self.alpha.max(REHEAT_ALPHA);
	}

	/// Keep the simulation warm while a drag is in progress.
	pub fn set_drag_active(&mut self, active: bool) {
		self.alpha_target = if active { 0.3 } else { 0.0 };
		if active {
			self.reheat();
		}
	}
}

/// Disc radius for a node, scaled by its importance weight.
pub fn node_radius(value: Option<f64>) -> f64 {
	match value {
		Some(v) => (5.0 + 2.5 * v.max(0.0).sqrt()).min(14.0),
		None => 5.0,
	}
}

/// BFS depth per node id, following edge direction from roots (nodes with
/// no incoming visible edge). Nodes on cycles never reached from a root are
/// left out and fall back to plain centering.
fn layer_depths(
	nodes: &[SimNode],
	edges: &[GraphEdge],
	index: &HashMap<String, usize>,
) -> HashMap<String, usize> {
	let mut incoming: HashMap<&str, usize> = nodes.iter().map(|n| (n.id.as_str(), 0)).collect();
	for edge in edges {
		if index.contains_key(edge.source.as_str()) {
			if let Some(count) = incoming.get_mut(edge.target.as_str()) {
				*count += 1;
			}
		}
	}

	let mut depths: HashMap<String, usize> = HashMap::new();
	let mut queue: std::collections::VecDeque<&str> = incoming
		.iter()
		.filter(|&(_, &count)| count == 0)
		.map(|(&id, _)| id)
		.collect();
	for id in &queue {
		depths.insert((*id).to_string(), 0);
	}
	while let Some(id) = queue.pop_front() {
		let depth = depths[id];
		for edge in edges {
			if edge.source == id && !depths.contains_key(edge.target.as_str()) {
				if index.contains_key(edge.target.as_str()) {
					depths.insert(edge.target.clone(), depth + 1);
					if let Some(&i) = index.get(edge.target.as_str()) {
						queue.push_back(nodes[i].id.as_str());
					}
				}
			}
		}
	}
	depths
}
