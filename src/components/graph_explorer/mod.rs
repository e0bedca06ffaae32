//! Interactive relationship-graph explorer: payload normalization,
//! filtering, layout, coloring, interaction state, and canvas/SVG
//! rendering behind a single Leptos component.

pub mod adapter;
pub mod color;
mod component;
pub mod filter;
pub mod interaction;
pub mod layout;
pub mod render;
pub mod svg;
mod types;

pub use color::{ColorContext, ColorScheme};
pub use component::GraphExplorer;
pub use types::{
	EdgeKind, FilterState, GraphEdge, GraphModel, GraphNode, GraphPayload, GraphView,
	LayoutKind, LayoutSettings, NodeKind, RawEdge, RawNode, RawNodeMeta, RiskLevel,
	SurfaceSize,
};
