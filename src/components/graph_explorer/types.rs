//! Domain model for the graph explorer: wire payload records, normalized
//! node/edge types, and the user-controlled filter/layout state.

use std::collections::HashSet;

use serde::Deserialize;

/// Category of a graph entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
	/// A corporate entity.
	Enterprise,
	/// An individual (owner, executive, employee).
	Person,
	/// A financial product or facility.
	Product,
	/// Anything the payload did not tag or tagged with an unknown kind.
	Other,
}

impl NodeKind {
	/// Every kind, in display order.
	pub const ALL: [NodeKind; 4] = [
		NodeKind::Enterprise,
		NodeKind::Person,
		NodeKind::Product,
		NodeKind::Other,
	];

	/// Lowercase tag as it appears on the wire.
	pub fn tag(self) -> &'static str {
		match self {
			NodeKind::Enterprise => "enterprise",
			NodeKind::Person => "person",
			NodeKind::Product => "product",
			NodeKind::Other => "other",
		}
	}

	/// Parse a wire tag; unknown tags map to `Other`.
	pub fn from_tag(tag: &str) -> Self {
		match tag {
			"enterprise" => NodeKind::Enterprise,
			"person" => NodeKind::Person,
			"product" => NodeKind::Product,
			_ => NodeKind::Other,
		}
	}
}

/// Risk rating carried by some nodes, used by the risk color scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskLevel {
	/// Routine exposure.
	Low,
	/// Elevated exposure.
	Medium,
	/// Significant exposure.
	High,
	/// Requires immediate attention.
	Critical,
}

impl RiskLevel {
	/// Lowercase tag as it appears on the wire.
	pub fn tag(self) -> &'static str {
		match self {
			RiskLevel::Low => "low",
			RiskLevel::Medium => "medium",
			RiskLevel::High => "high",
			RiskLevel::Critical => "critical",
		}
	}

	/// Parse a wire tag; unknown tags map to `None`.
	pub fn from_tag(tag: &str) -> Option<Self> {
		match tag {
			"low" => Some(RiskLevel::Low),
			"medium" => Some(RiskLevel::Medium),
			"high" => Some(RiskLevel::High),
			"critical" => Some(RiskLevel::Critical),
			_ => None,
		}
	}
}

/// Relationship category of an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
	/// Equity or debt investment.
	Investment,
	/// Loan guarantee.
	Guarantee,
	/// Supplier relationship.
	Supply,
	/// Mutual business partnership.
	Partnership,
	/// Ownership stake.
	Ownership,
	/// Employment relation.
	Employment,
	/// Risk transmission link.
	Risk,
	/// Untyped relationship.
	Other,
}

impl EdgeKind {
	/// Every kind, in display order.
	pub const ALL: [EdgeKind; 8] = [
		EdgeKind::Investment,
		EdgeKind::Guarantee,
		EdgeKind::Supply,
		EdgeKind::Partnership,
		EdgeKind::Ownership,
		EdgeKind::Employment,
		EdgeKind::Risk,
		EdgeKind::Other,
	];

	/// Lowercase tag as it appears on the wire.
	pub fn tag(self) -> &'static str {
		match self {
			EdgeKind::Investment => "investment",
			EdgeKind::Guarantee => "guarantee",
			EdgeKind::Supply => "supply",
			EdgeKind::Partnership => "partnership",
			EdgeKind::Ownership => "ownership",
			EdgeKind::Employment => "employment",
			EdgeKind::Risk => "risk",
			EdgeKind::Other => "other",
		}
	}

	/// Parse a wire tag; unknown tags map to `Other`.
	pub fn from_tag(tag: &str) -> Self {
		match tag {
			"investment" => EdgeKind::Investment,
			"guarantee" => EdgeKind::Guarantee,
			"supply" => EdgeKind::Supply,
			"partnership" => EdgeKind::Partnership,
			"ownership" => EdgeKind::Ownership,
			"employment" => EdgeKind::Employment,
			"risk" => EdgeKind::Risk,
			_ => EdgeKind::Other,
		}
	}

	/// Whether the relationship reads source → target. Mutual kinds render
	/// without an arrowhead.
	pub fn directed(self) -> bool {
		!matches!(self, EdgeKind::Partnership | EdgeKind::Other)
	}
}

/// Node record as delivered by the data-fetching layer. Optional fields may
/// be missing or carry unknown tags; normalization fills the gaps.
#[derive(Clone, Debug, Deserialize)]
pub struct RawNode {
	/// Stable unique identifier.
	pub id: String,
	/// Display label; defaults to the id when absent.
	#[serde(default)]
	pub name: Option<String>,
	/// Entity kind tag.
	#[serde(default, rename = "type")]
	pub kind: Option<String>,
	/// Importance weight, scales the rendered radius.
	#[serde(default)]
	pub value: Option<f64>,
	/// Risk rating tag.
	#[serde(default, rename = "riskLevel")]
	pub risk: Option<String>,
	/// Precomputed analytics attached by the backend.
	#[serde(default)]
	pub metadata: RawNodeMeta,
}

/// Precomputed per-node analytics consumed by color schemes and the tooltip.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawNodeMeta {
	/// Connection count across the whole (unpaginated) graph.
	#[serde(default)]
	pub degree: Option<u32>,
	/// Community id from upstream clustering.
	#[serde(default)]
	pub cluster: Option<u32>,
}

/// Edge record as delivered by the data-fetching layer.
#[derive(Clone, Debug, Deserialize)]
pub struct RawEdge {
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Relationship kind tag.
	#[serde(default, rename = "type")]
	pub kind: Option<String>,
	/// Weight in [0, 1]; the wire sometimes calls this `value`.
	#[serde(default, alias = "value")]
	pub strength: Option<f64>,
}

/// The raw `{ nodes, links }` payload returned by the relationship API.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphPayload {
	/// Node records, possibly containing duplicates across pages.
	pub nodes: Vec<RawNode>,
	/// Edge records, possibly referencing nodes outside this page.
	#[serde(default, alias = "edges")]
	pub links: Vec<RawEdge>,
}

/// A normalized node. Invariants: unique `id` within one model,
/// `value` non-negative when present.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	/// Stable unique identifier.
	pub id: String,
	/// Display label.
	pub name: String,
	/// Entity kind.
	pub kind: NodeKind,
	/// Importance weight, scales the rendered radius.
	pub value: Option<f64>,
	/// Risk rating.
	pub risk: Option<RiskLevel>,
	/// Connection count across the whole graph, if precomputed.
	pub degree: Option<u32>,
	/// Community id, if precomputed.
	pub cluster: Option<u32>,
}

/// A normalized edge. Invariants: both endpoints resolve to nodes in the
/// same model, `strength` in [0, 1].
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
	/// Identifier assigned during normalization, stable within one model.
	pub id: String,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Relationship kind.
	pub kind: EdgeKind,
	/// Weight in [0, 1].
	pub strength: f64,
}

/// Normalized graph: every edge resolves to two nodes, node ids unique.
#[derive(Clone, Debug, Default)]
pub struct GraphModel {
	/// Nodes in first-seen payload order.
	pub nodes: Vec<GraphNode>,
	/// Edges that survived normalization, in payload order.
	pub edges: Vec<GraphEdge>,
}

/// The subset of a model currently visible under a [`FilterState`].
#[derive(Clone, Debug, Default)]
pub struct GraphView {
	/// Visible nodes, in model order.
	pub nodes: Vec<GraphNode>,
	/// Visible edges, in model order; endpoints always visible.
	pub edges: Vec<GraphEdge>,
}

/// User-controlled visibility criteria. Created with defaults on mount,
/// mutated in place by the controls overlay, never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterState {
	/// Node kinds to show; empty set shows nothing.
	pub node_kinds: HashSet<NodeKind>,
	/// Edge kinds to show.
	pub edge_kinds: HashSet<EdgeKind>,
	/// Inclusive lower strength bound.
	pub min_strength: f64,
	/// Inclusive upper strength bound.
	pub max_strength: f64,
	/// Case-insensitive substring matched against node names.
	pub query: String,
	/// Rendering toggle only; no effect on visibility.
	pub show_labels: bool,
}

impl Default for FilterState {
	fn default() -> Self {
		Self {
			node_kinds: NodeKind::ALL.into_iter().collect(),
			edge_kinds: EdgeKind::ALL.into_iter().collect(),
			min_strength: 0.0,
			max_strength: 1.0,
			query: String::new(),
			show_labels: true,
		}
	}
}

/// Positioning algorithm selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutKind {
	/// Iterative spring/charge/centering simulation.
	Force,
	/// Simulation with a vertical layering bias.
	Hierarchical,
	/// Fixed ring placement.
	Circular,
	/// Fixed row-major grid placement.
	Grid,
}

impl LayoutKind {
	/// Every kind, in display order.
	pub const ALL: [LayoutKind; 4] = [
		LayoutKind::Force,
		LayoutKind::Hierarchical,
		LayoutKind::Circular,
		LayoutKind::Grid,
	];

	/// Display label for the layout selector.
	pub fn label(self) -> &'static str {
		match self {
			LayoutKind::Force => "Force",
			LayoutKind::Hierarchical => "Hierarchical",
			LayoutKind::Circular => "Circular",
			LayoutKind::Grid => "Grid",
		}
	}

	/// Parse a selector value back into a kind.
	pub fn from_label(label: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|k| k.label() == label)
	}

	/// Whether this layout runs an ongoing simulation rather than fixing
	/// positions up front.
	pub fn simulated(self) -> bool {
		matches!(self, LayoutKind::Force | LayoutKind::Hierarchical)
	}
}

/// Layout selection plus the tunables that apply to simulated layouts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutSettings {
	/// Active positioning algorithm.
	pub kind: LayoutKind,
	/// Target edge length for the spring force.
	pub link_distance: f64,
	/// Pairwise charge; negative repels.
	pub charge_strength: f64,
	/// Per-tick velocity damping fraction in [0, 1).
	pub velocity_decay: f64,
	/// Per-tick geometric decay of the simulation temperature.
	pub alpha_decay: f64,
}

impl Default for LayoutSettings {
	fn default() -> Self {
		Self {
			kind: LayoutKind::Force,
			link_distance: 100.0,
			charge_strength: -300.0,
			velocity_decay: 0.4,
			alpha_decay: 0.0228,
		}
	}
}

/// Draw-surface dimensions in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSize {
	/// Width in pixels.
	pub width: f64,
	/// Height in pixels.
	pub height: f64,
}

impl Default for SurfaceSize {
	fn default() -> Self {
		Self {
			width: 800.0,
			height: 600.0,
		}
	}
}

impl SurfaceSize {
	/// Surface center point.
	pub fn center(self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}
}
