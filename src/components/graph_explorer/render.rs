//! Scene assembly and canvas drawing. [`build_scene`] snapshots the visible
//! graph into plain drawable records each frame; [`draw`] paints that
//! snapshot onto the 2D context. Keeping the snapshot free of browser types
//! lets the SVG exporter reuse it unchanged.

use web_sys::CanvasRenderingContext2d;

use super::color::{self, ColorContext, ColorScheme};
use super::interaction::InteractionController;
use super::layout::LayoutEngine;
use super::types::{FilterState, GraphView, NodeKind, RiskLevel, SurfaceSize};

/// Canvas background fill.
pub const BACKGROUND: &str = "#1a1a2e";

/// Arrowhead length in graph units.
const ARROW_SIZE: f64 = 8.0;

/// Opacity for elements outside the highlight set while a selection is
/// active.
const DIM_ALPHA: f64 = 0.15;

/// A node ready to draw.
#[derive(Clone, Debug)]
pub struct SceneNode {
	/// Graph node id.
	pub id: String,
	/// Position x in graph space.
	pub x: f64,
	/// Position y in graph space.
	pub y: f64,
	/// Disc radius.
	pub radius: f64,
	/// Fill color.
	pub color: String,
	/// Label text, present only when labels are enabled.
	pub label: Option<String>,
	/// Draw opacity.
	pub alpha: f64,
	/// Whether this is the selected node (gets an emphasis ring).
	pub selected: bool,
}

/// An edge ready to draw: endpoints already pulled back to the node discs.
#[derive(Clone, Debug)]
pub struct SceneEdge {
	/// Line start x.
	pub x1: f64,
	/// Line start y.
	pub y1: f64,
	/// Line end x.
	pub x2: f64,
	/// Line end y.
	pub y2: f64,
	/// Stroke color.
	pub color: String,
	/// Stroke width, scaled by strength.
	pub width: f64,
	/// Draw opacity.
	pub alpha: f64,
	/// Arrowhead triangle for directed kinds, tip first.
	pub arrow: Option<[(f64, f64); 3]>,
}

/// One legend row.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
	/// Row label.
	pub label: &'static str,
	/// Swatch color.
	pub color: String,
}

/// Everything needed to paint one frame.
#[derive(Clone, Debug, Default)]
pub struct Scene {
	/// Drawable nodes.
	pub nodes: Vec<SceneNode>,
	/// Drawable edges.
	pub edges: Vec<SceneEdge>,
	/// Legend rows; empty when the legend is hidden.
	pub legend: Vec<LegendEntry>,
	/// Scene transform (translate then scale).
	pub transform: (f64, f64, f64),
	/// Surface dimensions.
	pub surface: SurfaceSize,
}

/// Snapshot the current view, positions, colors, and highlight state into a
/// drawable scene.
pub fn build_scene(
	view: &GraphView,
	engine: &LayoutEngine,
	scheme: ColorScheme,
	ctx: &ColorContext,
	controller: &InteractionController,
	filter: &FilterState,
	surface: SurfaceSize,
	show_legend: bool,
) -> Scene {
	let selecting = controller.has_selection();

	let edges = view
		.edges
		.iter()
		.filter_map(|edge| {
			let a = engine.node(&edge.source)?;
			let b = engine.node(&edge.target)?;
			let (dx, dy) = (b.x - a.x, b.y - a.y);
			let dist = (dx * dx + dy * dy).sqrt();
			if dist < 1e-3 {
				return None;
			}
			let (ux, uy) = (dx / dist, dy / dist);
			let alpha = if selecting && !controller.edge_highlighted(&edge.id) {
				DIM_ALPHA
			} else {
				0.7
			};
			let (x1, y1) = (a.x + ux * a.radius, a.y + uy * a.radius);
			let arrow = edge.kind.directed().then(|| {
				let (tip_x, tip_y) = (b.x - ux * b.radius, b.y - uy * b.radius);
				let (back_x, back_y) = (tip_x - ux * ARROW_SIZE, tip_y - uy * ARROW_SIZE);
				let (px, py) = (-uy * ARROW_SIZE * 0.5, ux * ARROW_SIZE * 0.5);
				[
					(tip_x, tip_y),
					(back_x + px, back_y + py),
					(back_x - px, back_y - py),
				]
			});
			let pullback = b.radius + if arrow.is_some() { ARROW_SIZE } else { 0.0 };
			let (x2, y2) = (b.x - ux * pullback, b.y - uy * pullback);
			Some(SceneEdge {
				x1,
				y1,
				x2,
				y2,
				color: color::edge_color(edge.kind).to_string(),
				width: 1.0 + edge.strength * 3.0,
				alpha,
				arrow,
			})
		})
		.collect();

	let nodes = view
		.nodes
		.iter()
		.filter_map(|node| {
			let sim = engine.node(&node.id)?;
			let alpha = if selecting && !controller.node_highlighted(&node.id) {
				DIM_ALPHA
			} else {
				1.0
			};
			Some(SceneNode {
				id: node.id.clone(),
				x: sim.x,
				y: sim.y,
				radius: sim.radius,
				color: color::node_color(node, scheme, ctx),
				label: filter.show_labels.then(|| node.name.clone()),
				alpha,
				selected: controller.selection.selected.as_deref() == Some(node.id.as_str()),
			})
		})
		.collect();

	Scene {
		nodes,
		edges,
		legend: if show_legend { legend_for(scheme) } else { Vec::new() },
		transform: (
			controller.transform.x,
			controller.transform.y,
			controller.transform.k,
		),
		surface,
	}
}

/// Legend rows for the active color scheme.
pub fn legend_for(scheme: ColorScheme) -> Vec<LegendEntry> {
	match scheme {
		ColorScheme::Kind => NodeKind::ALL
			.into_iter()
			.map(|kind| LegendEntry {
				label: match kind {
					NodeKind::Enterprise => "Enterprise",
					NodeKind::Person => "Person",
					NodeKind::Product => "Product",
					NodeKind::Other => "Other",
				},
				color: color::kind_color(kind).to_string(),
			})
			.collect(),
		ColorScheme::Risk => [
			RiskLevel::Low,
			RiskLevel::Medium,
			RiskLevel::High,
			RiskLevel::Critical,
		]
		.into_iter()
		.map(|risk| LegendEntry {
			label: match risk {
				RiskLevel::Low => "Low risk",
				RiskLevel::Medium => "Medium risk",
				RiskLevel::High => "High risk",
				RiskLevel::Critical => "Critical risk",
			},
			color: color::risk_color(risk).to_string(),
		})
		.collect(),
		ColorScheme::Centrality | ColorScheme::Cluster => Vec::new(),
	}
}

/// Paint a scene onto the 2D canvas context.
pub fn draw(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, scene.surface.width, scene.surface.height);

	let (tx, ty, k) = scene.transform;
	ctx.save();
	let _ = ctx.translate(tx, ty);
	let _ = ctx.scale(k, k);
	draw_edges(scene, ctx);
	draw_nodes(scene, ctx, k);
	ctx.restore();
	draw_legend(scene, ctx);
}

fn draw_edges(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	for edge in &scene.edges {
		ctx.set_global_alpha(edge.alpha);
		ctx.set_stroke_style_str(&edge.color);
		ctx.set_line_width(edge.width);
		ctx.begin_path();
		ctx.move_to(edge.x1, edge.y1);
		ctx.line_to(edge.x2, edge.y2);
		ctx.stroke();

		if let Some([tip, left, right]) = edge.arrow {
			ctx.set_fill_style_str(&edge.color);
			ctx.begin_path();
			ctx.move_to(tip.0, tip.1);
			ctx.line_to(left.0, left.1);
			ctx.line_to(right.0, right.1);
			ctx.close_path();
			ctx.fill();
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(scene: &Scene, ctx: &CanvasRenderingContext2d, k: f64) {
	use std::f64::consts::PI;
	for node in &scene.nodes {
		ctx.set_global_alpha(node.alpha);
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, node.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&node.color);
		ctx.fill();

		if node.selected {
			ctx.begin_path();
			let _ = ctx.arc(node.x, node.y, node.radius + 3.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str("#ffffff");
			ctx.set_line_width(2.0 / k);
			ctx.stroke();
		}

		if let Some(label) = &node.label {
			ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", node.alpha * 0.85));
			ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
			let _ = ctx.fill_text(label, node.x + node.radius + 3.0, node.y + 3.0);
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_legend(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	if scene.legend.is_empty() {
		return;
	}
	let (x, mut y) = (16.0, 20.0);
	ctx.set_font("12px sans-serif");
	for entry in &scene.legend {
		ctx.set_fill_style_str(&entry.color);
		ctx.fill_rect(x, y - 8.0, 10.0, 10.0);
		ctx.set_fill_style_str("rgba(255, 255, 255, 0.85)");
		let _ = ctx.fill_text(entry.label, x + 16.0, y);
		y += 18.0;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_explorer::adapter::normalize;
	use crate::components::graph_explorer::filter::filter;
	use crate::components::graph_explorer::types::{
		GraphPayload, LayoutSettings, RawEdge, RawNode,
	};

	fn scene_fixture(selected: Option<&str>, show_labels: bool) -> Scene {
		let payload = GraphPayload {
			nodes: vec![
				RawNode {
					id: "a".into(),
					name: Some("Alpha".into()),
					kind: Some("enterprise".into()),
					value: Some(4.0),
					risk: None,
					metadata: Default::default(),
				},
				RawNode {
					id: "b".into(),
					name: Some("Beta".into()),
					kind: Some("person".into()),
					value: None,
					risk: None,
					metadata: Default::default(),
				},
				RawNode {
					id: "c".into(),
					name: Some("Gamma".into()),
					kind: Some("person".into()),
					value: None,
					risk: None,
					metadata: Default::default(),
				},
			],
			links: vec![
				RawEdge {
					source: "a".into(),
					target: "b".into(),
					kind: Some("ownership".into()),
					strength: Some(1.0),
				},
				RawEdge {
					source: "b".into(),
					target: "c".into(),
					kind: Some("partnership".into()),
					strength: Some(0.5),
				},
			],
		};
		let model = normalize(&payload);
		let state = FilterState {
			show_labels,
			..Default::default()
		};
		let view = filter(&model, &state);
		let surface = SurfaceSize::default();
		let mut engine = LayoutEngine::new();
		engine.sync(&view, surface);
		engine.apply_layout(&LayoutSettings::default(), surface, &view.edges);
		let mut controller = InteractionController::new();
		if let Some(id) = selected {
			controller.select(id, &view.edges);
		}
		build_scene(
			&view,
			&engine,
			ColorScheme::Kind,
			&ColorContext::default(),
			&controller,
			&state,
			surface,
			true,
		)
	}

	#[test]
	fn directed_kinds_get_arrowheads_and_mutual_kinds_do_not() {
		let scene = scene_fixture(None, true);
		assert_eq!(scene.edges.len(), 2);
		assert!(scene.edges[0].arrow.is_some()); // ownership
		assert!(scene.edges[1].arrow.is_none()); // partnership
	}

	#[test]
	fn edge_width_scales_with_strength() {
		let scene = scene_fixture(None, true);
		assert!(scene.edges[0].width > scene.edges[1].width);
	}

	#[test]
	fn selection_dims_everything_outside_the_highlight_set() {
		let scene = scene_fixture(Some("a"), true);
		let by_id = |id: &str| scene.nodes.iter().find(|n| n.id == id).unwrap();
		assert_eq!(by_id("a").alpha, 1.0);
		assert!(by_id("a").selected);
		assert_eq!(by_id("b").alpha, 1.0);
		assert_eq!(by_id("c").alpha, DIM_ALPHA);
		assert_eq!(scene.edges[0].alpha, 0.7); // a->b highlighted
		assert_eq!(scene.edges[1].alpha, DIM_ALPHA); // b->c dimmed
	}

	#[test]
	fn label_toggle_controls_scene_labels() {
		let with = scene_fixture(None, true);
		assert!(with.nodes.iter().all(|n| n.label.is_some()));
		let without = scene_fixture(None, false);
		assert!(without.nodes.iter().all(|n| n.label.is_none()));
	}

	#[test]
	fn value_scales_node_radius() {
		let scene = scene_fixture(None, true);
		let by_id = |id: &str| scene.nodes.iter().find(|n| n.id == id).unwrap();
		assert!(by_id("a").radius > by_id("b").radius);
	}

	#[test]
	fn legend_follows_the_color_scheme() {
		let kinds = legend_for(ColorScheme::Kind);
		assert_eq!(kinds.len(), 4);
		assert_eq!(kinds[0].label, "Enterprise");
		let risk = legend_for(ColorScheme::Risk);
		assert_eq!(risk.len(), 4);
		assert!(legend_for(ColorScheme::Cluster).is_empty());
	}
}
