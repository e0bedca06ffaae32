//! Color schemes for nodes and edges.

use super::types::{EdgeKind, GraphModel, GraphNode, NodeKind, RiskLevel};

/// Fallback for anything no scheme has an answer for.
const NEUTRAL: &str = "#7f7f7f";

/// Categorical palette for the cluster scheme; cluster ids wrap modulo its
/// length.
const CLUSTER_COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

/// Endpoints of the sequential centrality ramp, light to saturated.
const RAMP_LOW: (u8, u8, u8) = (0xde, 0xeb, 0xf7);
const RAMP_HIGH: (u8, u8, u8) = (0x08, 0x45, 0x94);

/// Node color selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorScheme {
	/// Fixed color per entity kind.
	Kind,
	/// Sequential ramp over normalized degree.
	Centrality,
	/// Categorical color per cluster id.
	Cluster,
	/// Semantic color per risk level.
	Risk,
}

impl ColorScheme {
	/// Every scheme, in display order.
	pub const ALL: [ColorScheme; 4] = [
		ColorScheme::Kind,
		ColorScheme::Centrality,
		ColorScheme::Cluster,
		ColorScheme::Risk,
	];

	/// Display label for the scheme selector.
	pub fn label(self) -> &'static str {
		match self {
			ColorScheme::Kind => "By type",
			ColorScheme::Centrality => "Centrality",
			ColorScheme::Cluster => "Cluster",
			ColorScheme::Risk => "Risk",
		}
	}

	/// Parse a selector value back into a scheme.
	pub fn from_label(label: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|s| s.label() == label)
	}
}

/// Context the centrality scheme normalizes against. Computed once per
/// loaded model, over all nodes rather than the visible subset, so colors
/// hold steady while filtering.
#[derive(Clone, Copy, Debug, Default)]
pub struct ColorContext {
	/// Highest degree across the loaded model.
	pub max_degree: u32,
}

impl ColorContext {
	/// Build the context for a loaded model.
	pub fn from_model(model: &GraphModel) -> Self {
		Self {
			max_degree: model
				.nodes
				.iter()
				.filter_map(|n| n.degree)
				.max()
				.unwrap_or(0),
		}
	}
}

/// Fixed color per node kind.
pub fn kind_color(kind: NodeKind) -> &'static str {
	match kind {
		NodeKind::Enterprise => "#4a90d9",
		NodeKind::Person => "#e8913a",
		NodeKind::Product => "#50b483",
		NodeKind::Other => NEUTRAL,
	}
}

/// Semantic color per risk level.
pub fn risk_color(risk: RiskLevel) -> &'static str {
	match risk {
		RiskLevel::Low => "#4caf50",
		RiskLevel::Medium => "#ffb300",
		RiskLevel::High => "#f4511e",
		RiskLevel::Critical => "#b71c1c",
	}
}

/// Display color for a node under the selected scheme.
pub fn node_color(node: &GraphNode, scheme: ColorScheme, ctx: &ColorContext) -> String {
	match scheme {
		ColorScheme::Kind => kind_color(node.kind).to_string(),
		ColorScheme::Centrality => {
			let degree = node.degree.unwrap_or(0);
			let t = if ctx.max_degree > 0 {
				degree as f64 / ctx.max_degree as f64
			} else {
				0.0
			};
			ramp(t)
		}
		ColorScheme::Cluster => match node.cluster {
			Some(cluster) => {
				CLUSTER_COLORS[cluster as usize % CLUSTER_COLORS.len()].to_string()
			}
			None => NEUTRAL.to_string(),
		},
		ColorScheme::Risk => risk_color(node.risk.unwrap_or(RiskLevel::Low)).to_string(),
	}
}

/// Static edge color, keyed only by relationship kind.
pub fn edge_color(kind: EdgeKind) -> &'static str {
	match kind {
		EdgeKind::Investment => "#64b4ff",
		EdgeKind::Guarantee => "#b08de0",
		EdgeKind::Supply => "#6fc7a6",
		EdgeKind::Partnership => "#e0c06a",
		EdgeKind::Ownership => "#e08a8a",
		EdgeKind::Employment => "#8aa6c7",
		EdgeKind::Risk => "#e05c5c",
		EdgeKind::Other => "#9a9a9a",
	}
}

fn ramp(t: f64) -> String {
	let t = t.clamp(0.0, 1.0);
	let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
	format!(
		"#{:02x}{:02x}{:02x}",
		mix(RAMP_LOW.0, RAMP_HIGH.0),
		mix(RAMP_LOW.1, RAMP_HIGH.1),
		mix(RAMP_LOW.2, RAMP_HIGH.2)
	)
}
