//! Transient UI state: selection and hover, the highlight sets derived from
//! them, drag/pan gestures, and the zoom/pan transform. All pure state; the
//! component layer feeds it pointer coordinates and reads it back while
//! drawing.

use std::collections::HashSet;

use super::types::GraphEdge;

/// Zoom scale bounds.
pub const MIN_ZOOM: f64 = 0.1;
/// Upper zoom scale bound.
pub const MAX_ZOOM: f64 = 10.0;
/// Discrete zoom factor used by the toolbar buttons.
pub const ZOOM_STEP: f64 = 1.5;

/// A mousedown that travels less than this stays a click, not a drag.
const DRAG_THRESHOLD: f64 = 3.0;

/// Scene transform: translate by (`x`, `y`), then scale by `k`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
	/// Translation x.
	pub x: f64,
	/// Translation y.
	pub y: f64,
	/// Scale factor.
	pub k: f64,
}

impl Default for Transform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl Transform {
	/// Map a screen point into graph coordinates.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}
}

/// Current selection and the highlight sets derived from it.
#[derive(Clone, Debug, Default)]
pub struct SelectionState {
	/// Clicked node, if any.
	pub selected: Option<String>,
	/// Node under the pointer, if any. Drives the tooltip only.
	pub hovered: Option<String>,
	/// Selected node plus its direct neighbors over visible edges.
	pub highlighted_nodes: HashSet<String>,
	/// Visible edges incident to the selected node.
	pub highlighted_edges: HashSet<String>,
}

/// Target of an in-flight toolbar zoom transition.
#[derive(Clone, Copy, Debug)]
struct ZoomAnim {
	target_k: f64,
	fx: f64,
	fy: f64,
}

/// In-progress node drag.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	/// Whether a mousedown on a node is being tracked.
	pub active: bool,
	/// Node being dragged.
	pub node_id: Option<String>,
	/// Whether the pointer traveled far enough to count as a drag.
	pub moved: bool,
	/// Screen x at mousedown.
	pub start_x: f64,
	/// Screen y at mousedown.
	pub start_y: f64,
}

/// In-progress background pan.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// Whether a background drag is being tracked.
	pub active: bool,
	/// Screen x at mousedown.
	pub start_x: f64,
	/// Screen y at mousedown.
	pub start_y: f64,
	/// Transform x at mousedown.
	pub origin_x: f64,
	/// Transform y at mousedown.
	pub origin_y: f64,
}

/// Owns selection, hover, drag, pan, and zoom state for one graph instance.
#[derive(Clone, Debug, Default)]
pub struct InteractionController {
	/// Selection and highlight sets.
	pub selection: SelectionState,
	/// Scene transform.
	pub transform: Transform,
	/// Node drag gesture state.
	pub drag: DragState,
	/// Pan gesture state.
	pub pan: PanState,
	zoom_anim: Option<ZoomAnim>,
}

impl InteractionController {
	/// Fresh controller with the identity transform and nothing selected.
	pub fn new() -> Self {
		Self::default()
	}

	/// Select a node and rebuild the highlight sets from the visible edges.
	/// Selecting a second node replaces the sets (single-selection model).
	pub fn select(&mut self, node_id: &str, visible_edges: &[GraphEdge]) {
		let mut nodes: HashSet<String> = HashSet::new();
		let mut edges: HashSet<String> = HashSet::new();
		nodes.insert(node_id.to_string());
		for edge in visible_edges {
			if edge.source == node_id {
				nodes.insert(edge.target.clone());
				edges.insert(edge.id.clone());
			} else if edge.target == node_id {
				nodes.insert(edge.source.clone());
				edges.insert(edge.id.clone());
			}
		}
		self.selection.selected = Some(node_id.to_string());
		self.selection.highlighted_nodes = nodes;
		self.selection.highlighted_edges = edges;
	}

	/// Clear the selection (click on empty canvas), restoring full opacity
	/// everywhere.
	pub fn clear_selection(&mut self) {
		self.selection.selected = None;
		self.selection.highlighted_nodes.clear();
		self.selection.highlighted_edges.clear();
	}

	/// Update the hovered node. Orthogonal to selection.
	pub fn hover(&mut self, node_id: Option<String>) {
		self.selection.hovered = node_id;
	}

	/// Whether any selection-driven highlight is active.
	pub fn has_selection(&self) -> bool {
		self.selection.selected.is_some()
	}

	/// Whether a node should render at full emphasis.
	pub fn node_highlighted(&self, id: &str) -> bool {
		self.selection.highlighted_nodes.contains(id)
	}

	/// Whether an edge should render at full emphasis.
	pub fn edge_highlighted(&self, id: &str) -> bool {
		self.selection.highlighted_edges.contains(id)
	}

	/// Scale about a focal screen point, clamped to the zoom bounds. The
	/// graph point under the focal point stays put. Immediate; cancels any
	/// zoom transition in flight.
	pub fn zoom_by(&mut self, factor: f64, fx: f64, fy: f64) {
		self.zoom_anim = None;
		self.apply_zoom(factor, fx, fy);
	}

	fn apply_zoom(&mut self, factor: f64, fx: f64, fy: f64) {
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = fx - (fx - self.transform.x) * ratio;
		self.transform.y = fy - (fy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Start a smooth zoom toward `factor` times the current target scale,
	/// about a focal screen point. Advanced one frame at a time by
	/// [`step_zoom`](Self::step_zoom); a second press before the transition
	/// finishes compounds the target.
	pub fn zoom_toward(&mut self, factor: f64, fx: f64, fy: f64) {
		let base = self.zoom_anim.map_or(self.transform.k, |z| z.target_k);
		self.zoom_anim = Some(ZoomAnim {
			target_k: (base * factor).clamp(MIN_ZOOM, MAX_ZOOM),
			fx,
			fy,
		});
	}

	/// Advance an in-flight zoom transition by one frame, easing the scale
	/// toward its target. Returns whether the transition is still running.
	pub fn step_zoom(&mut self) -> bool {
		let Some(anim) = self.zoom_anim else {
			return false;
		};
		let ratio = anim.target_k / self.transform.k;
		if (ratio - 1.0).abs() < 0.01 {
			// Close enough: land exactly on the target.
			self.apply_zoom(ratio, anim.fx, anim.fy);
			self.zoom_anim = None;
			return false;
		}
		self.apply_zoom(ratio.powf(0.25), anim.fx, anim.fy);
		true
	}

	/// Return to the identity transform.
	pub fn reset_view(&mut self) {
		self.zoom_anim = None;
		self.transform = Transform::default();
	}

	/// Begin tracking a mousedown on a node.
	pub fn begin_drag(&mut self, node_id: &str, sx: f64, sy: f64) {
		self.drag = DragState {
			active: true,
			node_id: Some(node_id.to_string()),
			moved: false,
			start_x: sx,
			start_y: sy,
		};
	}

	/// Feed pointer movement into an active node drag. Returns the dragged
	/// node id and its new graph-space position once the gesture has
	/// crossed the drag threshold.
	pub fn drag_to(&mut self, sx: f64, sy: f64) -> Option<(String, f64, f64)> {
		if !self.drag.active {
			return None;
		}
		if !self.drag.moved {
			let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
			if (dx * dx + dy * dy).sqrt() < DRAG_THRESHOLD {
				return None;
			}
			self.drag.moved = true;
		}
		let id = self.drag.node_id.clone()?;
		let (gx, gy) = self.transform.screen_to_graph(sx, sy);
		Some((id, gx, gy))
	}

	/// Finish a node gesture. Returns the node id and whether the gesture
	/// was a drag (`true`, leaves the node pinned) or a plain click.
	pub fn end_drag(&mut self) -> Option<(String, bool)> {
		if !self.drag.active {
			return None;
		}
		let id = self.drag.node_id.take();
		let was_drag = self.drag.moved;
		self.drag = DragState::default();
		id.map(|id| (id, was_drag))
	}

	/// Begin a background pan.
	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			origin_x: self.transform.x,
			origin_y: self.transform.y,
		};
	}

	/// Feed pointer movement into an active pan.
	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		if self.pan.active {
			self.transform.x = self.pan.origin_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.origin_y + (sy - self.pan.start_y);
		}
	}

	/// Finish a pan. Returns whether the pointer moved; a stationary
	/// background click clears the selection instead.
	pub fn end_pan(&mut self, sx: f64, sy: f64) -> bool {
		if !self.pan.active {
			return false;
		}
		let moved = (sx - self.pan.start_x).hypot(sy - self.pan.start_y) >= DRAG_THRESHOLD;
		self.pan.active = false;
		moved
	}

	/// Re-derive selection and hover against a new visible set. A selection
	/// whose node disappeared is cleared; a surviving one has its highlight
	/// sets rebuilt from the visible edges. Returns whether the highlight
	/// sets changed.
	pub fn refresh_selection(
		&mut self,
		visible_edges: &[GraphEdge],
		node_visible: impl Fn(&str) -> bool,
	) -> bool {
		let before_nodes = self.selection.highlighted_nodes.clone();
		let before_edges = self.selection.highlighted_edges.clone();
		if let Some(selected) = self.selection.selected.clone() {
			if node_visible(&selected) {
				self.select(&selected, visible_edges);
			} else {
				self.clear_selection();
			}
		}
		if self
			.selection
			.hovered
			.as_deref()
			.is_some_and(|h| !node_visible(h))
		{
			self.selection.hovered = None;
		}
		self.selection.highlighted_nodes != before_nodes
			|| self.selection.highlighted_edges != before_edges
	}

	/// Abandon any in-flight gesture (pointer left the surface).
	pub fn cancel_gestures(&mut self) {
		self.drag = DragState::default();
		self.pan.active = false;
		self.selection.hovered = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_explorer::types::EdgeKind;

	fn edge(id: &str, s: &str, t: &str) -> GraphEdge {
		GraphEdge {
			id: id.into(),
			source: s.into(),
			target: t.into(),
			kind: EdgeKind::Investment,
			strength: 0.5,
		}
	}

	#[test]
	fn selecting_highlights_node_and_direct_neighbors_only() {
		let edges = vec![edge("ab", "a", "b"), edge("bc", "b", "c")];
		let mut ctl = InteractionController::new();
		ctl.select("a", &edges);
		assert_eq!(ctl.selection.selected.as_deref(), Some("a"));
		assert!(ctl.node_highlighted("a"));
		assert!(ctl.node_highlighted("b"));
		assert!(!ctl.node_highlighted("c"));
		assert!(ctl.edge_highlighted("ab"));
		assert!(!ctl.edge_highlighted("bc"));
	}

	#[test]
	fn selecting_another_node_replaces_the_highlight_set() {
		let edges = vec![edge("ab", "a", "b"), edge("bc", "b", "c")];
		let mut ctl = InteractionController::new();
		ctl.select("a", &edges);
		ctl.select("c", &edges);
		assert_eq!(ctl.selection.selected.as_deref(), Some("c"));
		assert!(!ctl.node_highlighted("a"));
		assert!(ctl.node_highlighted("b"));
		assert!(ctl.node_highlighted("c"));
		assert!(ctl.edge_highlighted("bc"));
		assert!(!ctl.edge_highlighted("ab"));
	}

	#[test]
	fn background_click_clears_selection() {
		let edges = vec![edge("ab", "a", "b")];
		let mut ctl = InteractionController::new();
		ctl.select("a", &edges);
		ctl.clear_selection();
		assert!(!ctl.has_selection());
		assert!(ctl.selection.highlighted_nodes.is_empty());
		assert!(ctl.selection.highlighted_edges.is_empty());
	}

	#[test]
	fn hover_is_orthogonal_to_selection() {
		let edges = vec![edge("ab", "a", "b")];
		let mut ctl = InteractionController::new();
		ctl.select("a", &edges);
		ctl.hover(Some("c".into()));
		assert_eq!(ctl.selection.selected.as_deref(), Some("a"));
		assert_eq!(ctl.selection.hovered.as_deref(), Some("c"));
		ctl.hover(None);
		assert_eq!(ctl.selection.selected.as_deref(), Some("a"));
	}

	#[test]
	fn zoom_clamps_to_bounds() {
		let mut ctl = InteractionController::new();
		for _ in 0..50 {
			ctl.zoom_by(ZOOM_STEP, 0.0, 0.0);
		}
		assert_eq!(ctl.transform.k, MAX_ZOOM);
		for _ in 0..100 {
			ctl.zoom_by(1.0 / ZOOM_STEP, 0.0, 0.0);
		}
		assert_eq!(ctl.transform.k, MIN_ZOOM);
	}

	#[test]
	fn zoom_keeps_the_focal_point_stationary() {
		let mut ctl = InteractionController::new();
		let (fx, fy) = (200.0, 150.0);
		let before = ctl.transform.screen_to_graph(fx, fy);
		ctl.zoom_by(2.0, fx, fy);
		let after = ctl.transform.screen_to_graph(fx, fy);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
	}

	#[test]
	fn toolbar_zoom_eases_toward_its_target() {
		let mut ctl = InteractionController::new();
		let (fx, fy) = (100.0, 80.0);
		let anchor = ctl.transform.screen_to_graph(fx, fy);
		ctl.zoom_toward(ZOOM_STEP, fx, fy);
		assert_eq!(ctl.transform.k, 1.0); // nothing moves until a frame runs
		assert!(ctl.step_zoom());
		assert!(ctl.transform.k > 1.0 && ctl.transform.k < ZOOM_STEP);
		let mut frames = 1;
		while ctl.step_zoom() {
			frames += 1;
			assert!(frames < 120, "transition never settled");
		}
		assert!((ctl.transform.k - ZOOM_STEP).abs() < 1e-9);
		// The focal point stays put through every intermediate frame.
		let after = ctl.transform.screen_to_graph(fx, fy);
		assert!((anchor.0 - after.0).abs() < 1e-9);
		assert!((anchor.1 - after.1).abs() < 1e-9);
	}

	#[test]
	fn repeated_presses_compound_the_zoom_target() {
		let mut ctl = InteractionController::new();
		ctl.zoom_toward(ZOOM_STEP, 0.0, 0.0);
		ctl.step_zoom();
		ctl.zoom_toward(ZOOM_STEP, 0.0, 0.0);
		while ctl.step_zoom() {}
		assert!((ctl.transform.k - ZOOM_STEP * ZOOM_STEP).abs() < 1e-9);
	}

	#[test]
	fn wheel_zoom_cancels_a_running_transition() {
		let mut ctl = InteractionController::new();
		ctl.zoom_toward(ZOOM_STEP, 0.0, 0.0);
		ctl.zoom_by(0.9, 0.0, 0.0);
		assert!(!ctl.step_zoom());
		assert!((ctl.transform.k - 0.9).abs() < 1e-9);
	}

	#[test]
	fn refresh_selection_reports_a_pruned_selection() {
		let edges = vec![edge("ab", "a", "b"), edge("bc", "b", "c")];
		let mut ctl = InteractionController::new();
		ctl.select("a", &edges);
		// Filtering removed the selected node entirely.
		let remaining = vec![edge("bc", "b", "c")];
		let changed = ctl.refresh_selection(&remaining, |id| id != "a");
		assert!(changed);
		assert!(!ctl.has_selection());
		assert!(ctl.selection.highlighted_nodes.is_empty());
		assert!(ctl.selection.highlighted_edges.is_empty());
	}

	#[test]
	fn refresh_selection_rebuilds_surviving_highlights() {
		let edges = vec![edge("ab", "a", "b"), edge("ac", "a", "c")];
		let mut ctl = InteractionController::new();
		ctl.select("a", &edges);
		assert!(ctl.node_highlighted("c"));
		// The a-c edge fell out of the view; a itself survives.
		let remaining = vec![edge("ab", "a", "b")];
		let changed = ctl.refresh_selection(&remaining, |id| id != "c");
		assert!(changed);
		assert_eq!(ctl.selection.selected.as_deref(), Some("a"));
		assert!(ctl.node_highlighted("b"));
		assert!(!ctl.node_highlighted("c"));
		assert!(!ctl.edge_highlighted("ac"));
	}

	#[test]
	fn refresh_selection_is_quiet_when_nothing_changed() {
		let edges = vec![edge("ab", "a", "b")];
		let mut ctl = InteractionController::new();
		ctl.select("a", &edges);
		assert!(!ctl.refresh_selection(&edges, |_| true));
		assert_eq!(ctl.selection.selected.as_deref(), Some("a"));
	}

	#[test]
	fn short_gesture_stays_a_click() {
		let mut ctl = InteractionController::new();
		ctl.begin_drag("a", 10.0, 10.0);
		assert!(ctl.drag_to(11.0, 11.0).is_none());
		let (id, was_drag) = ctl.end_drag().unwrap();
		assert_eq!(id, "a");
		assert!(!was_drag);
	}

	#[test]
	fn long_gesture_becomes_a_drag_in_graph_coordinates() {
		let mut ctl = InteractionController::new();
		ctl.transform = Transform {
			x: 50.0,
			y: 0.0,
			k: 2.0,
		};
		ctl.begin_drag("a", 10.0, 10.0);
		let (id, gx, gy) = ctl.drag_to(110.0, 10.0).unwrap();
		assert_eq!(id, "a");
		assert!((gx - 30.0).abs() < 1e-9); // (110 - 50) / 2
		assert!((gy - 5.0).abs() < 1e-9);
		let (_, was_drag) = ctl.end_drag().unwrap();
		assert!(was_drag);
	}

	#[test]
	fn pan_translates_and_reset_restores_identity() {
		let mut ctl = InteractionController::new();
		ctl.begin_pan(0.0, 0.0);
		ctl.pan_to(40.0, -25.0);
		assert!(ctl.end_pan(40.0, -25.0));
		assert_eq!(ctl.transform.x, 40.0);
		assert_eq!(ctl.transform.y, -25.0);
		ctl.reset_view();
		assert_eq!(ctl.transform, Transform::default());
	}

	#[test]
	fn stationary_background_press_reports_no_pan() {
		let mut ctl = InteractionController::new();
		ctl.begin_pan(5.0, 5.0);
		assert!(!ctl.end_pan(5.5, 5.5));
	}
}
