//! Payload normalization: turns the raw `{ nodes, links }` wire records into
//! a [`GraphModel`] the rest of the pipeline can trust.

use std::collections::HashSet;

use log::{debug, warn};
use thiserror::Error;

use super::types::{EdgeKind, GraphEdge, GraphModel, GraphNode, GraphPayload, NodeKind, RiskLevel};

/// Failure decoding the inbound payload. Everything after a successful
/// decode recovers silently.
#[derive(Debug, Error)]
pub enum PayloadError {
	/// The response body was not valid payload JSON.
	#[error("malformed graph payload: {0}")]
	Json(#[from] serde_json::Error),
}

/// Decode a JSON response body into a raw payload.
pub fn parse_payload(body: &str) -> Result<GraphPayload, PayloadError> {
	Ok(serde_json::from_str(body)?)
}

/// Normalize a raw payload.
///
/// Duplicate node ids keep the first occurrence. Edges whose `source` or
/// `target` is not present in the node set are dropped without error, since
/// a paginated fetch can legitimately reference entities outside the current
/// page. Missing kinds default to `other`, missing strength to 0.5, and
/// numeric fields are clamped to their documented ranges.
pub fn normalize(payload: &GraphPayload) -> GraphModel {
	let mut nodes = Vec::with_capacity(payload.nodes.len());
	let mut seen = HashSet::with_capacity(payload.nodes.len());

	for raw in &payload.nodes {
		if !seen.insert(raw.id.as_str()) {
			warn!("duplicate node id {:?} ignored (first occurrence wins)", raw.id);
			continue;
		}
		nodes.push(GraphNode {
			id: raw.id.clone(),
			name: raw.name.clone().unwrap_or_else(|| raw.id.clone()),
			kind: raw
				.kind
				.as_deref()
				.map(NodeKind::from_tag)
				.unwrap_or(NodeKind::Other),
			value: raw.value.map(|v| v.max(0.0)),
			risk: raw.risk.as_deref().and_then(RiskLevel::from_tag),
			degree: raw.metadata.degree,
			cluster: raw.metadata.cluster,
		});
	}

	let mut edges = Vec::with_capacity(payload.links.len());
	let mut dropped = 0usize;
	for (i, raw) in payload.links.iter().enumerate() {
		if !seen.contains(raw.source.as_str()) || !seen.contains(raw.target.as_str()) {
			dropped += 1;
			continue;
		}
		edges.push(GraphEdge {
			id: format!("{}->{}#{}", raw.source, raw.target, i),
			source: raw.source.clone(),
			target: raw.target.clone(),
			kind: raw
				.kind
				.as_deref()
				.map(EdgeKind::from_tag)
				.unwrap_or(EdgeKind::Other),
			strength: raw.strength.unwrap_or(0.5).clamp(0.0, 1.0),
		});
	}
	if dropped > 0 {
		debug!("dropped {dropped} edge(s) referencing nodes outside this payload");
	}

	GraphModel { nodes, edges }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_explorer::types::{EdgeKind, RawEdge, RawNode};

	fn raw_node(id: &str) -> RawNode {
		RawNode {
			id: id.into(),
			name: None,
			kind: None,
			value: None,
			risk: None,
			metadata: Default::default(),
		}
	}

	fn raw_edge(source: &str, target: &str) -> RawEdge {
		RawEdge {
			source: source.into(),
			target: target.into(),
			kind: None,
			strength: None,
		}
	}

	#[test]
	fn drops_edges_with_missing_endpoints() {
		let payload = GraphPayload {
			nodes: vec![raw_node("a"), raw_node("b")],
			links: vec![raw_edge("a", "b"), raw_edge("a", "c")],
		};
		let model = normalize(&payload);
		assert_eq!(model.edges.len(), 1);
		assert_eq!(model.edges[0].source, "a");
		assert_eq!(model.edges[0].target, "b");
	}

	#[test]
	fn first_occurrence_wins_for_duplicate_ids() {
		let mut first = raw_node("a");
		first.name = Some("First".into());
		let mut second = raw_node("a");
		second.name = Some("Second".into());
		let payload = GraphPayload {
			nodes: vec![first, second],
			links: vec![],
		};
		let model = normalize(&payload);
		assert_eq!(model.nodes.len(), 1);
		assert_eq!(model.nodes[0].name, "First");
	}

	#[test]
	fn defaults_kind_strength_and_name() {
		let mut edge = raw_edge("a", "b");
		edge.strength = None;
		let payload = GraphPayload {
			nodes: vec![raw_node("a"), raw_node("b")],
			links: vec![edge],
		};
		let model = normalize(&payload);
		assert_eq!(model.nodes[0].kind, NodeKind::Other);
		assert_eq!(model.nodes[0].name, "a");
		assert_eq!(model.edges[0].kind, EdgeKind::Other);
		assert_eq!(model.edges[0].strength, 0.5);
	}

	#[test]
	fn clamps_out_of_range_numerics() {
		let mut node = raw_node("a");
		node.value = Some(-3.0);
		let mut edge = raw_edge("a", "a");
		edge.strength = Some(7.0);
		let payload = GraphPayload {
			nodes: vec![node],
			links: vec![edge],
		};
		let model = normalize(&payload);
		assert_eq!(model.nodes[0].value, Some(0.0));
		assert_eq!(model.edges[0].strength, 1.0);
	}

	#[test]
	fn parses_wire_payload_with_aliases() {
		let body = r#"{
			"nodes": [
				{"id": "e1", "name": "Acme", "type": "enterprise", "value": 3.0,
				 "riskLevel": "high", "metadata": {"degree": 4, "cluster": 1}},
				{"id": "p1", "type": "person"}
			],
			"links": [
				{"source": "p1", "target": "e1", "type": "ownership", "value": 0.8}
			]
		}"#;
		let model = normalize(&parse_payload(body).unwrap());
		assert_eq!(model.nodes.len(), 2);
		assert_eq!(model.nodes[0].kind, NodeKind::Enterprise);
		assert_eq!(model.nodes[0].risk, Some(RiskLevel::High));
		assert_eq!(model.nodes[0].degree, Some(4));
		assert_eq!(model.edges[0].kind, EdgeKind::Ownership);
		assert_eq!(model.edges[0].strength, 0.8);
	}

	#[test]
	fn unknown_tags_map_to_other() {
		let mut node = raw_node("a");
		node.kind = Some("asteroid".into());
		node.risk = Some("mild".into());
		let payload = GraphPayload {
			nodes: vec![node],
			links: vec![],
		};
		let model = normalize(&payload);
		assert_eq!(model.nodes[0].kind, NodeKind::Other);
		assert_eq!(model.nodes[0].risk, None);
	}
}
