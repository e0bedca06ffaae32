//! Visible-subset computation. Pure and cheap: called on every filter
//! change, including slider drags, so it must stay a single pass over
//! nodes then edges.

use std::collections::HashSet;

use super::types::{FilterState, GraphModel, GraphView};

/// Compute the visible subset of `model` under `state`.
///
/// A node is retained iff its kind is allowed and, when a query is set, its
/// name contains the query case-insensitively. An edge is retained iff both
/// endpoints were retained, its kind is allowed, and its strength lies in
/// the inclusive `[min_strength, max_strength]` range. Input order is
/// preserved, so identical inputs yield identical output.
pub fn filter(model: &GraphModel, state: &FilterState) -> GraphView {
	let query = state.query.trim().to_lowercase();

	let nodes: Vec<_> = model
		.nodes
		.iter()
		.filter(|n| {
			state.node_kinds.contains(&n.kind)
				&& (query.is_empty() || n.name.to_lowercase().contains(&query))
		})
		.cloned()
		.collect();

	let visible_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

	let edges: Vec<_> = model
		.edges
		.iter()
		.filter(|e| {
			visible_ids.contains(e.source.as_str())
				&& visible_ids.contains(e.target.as_str())
				&& state.edge_kinds.contains(&e.kind)
				&& e.strength >= state.min_strength
				&& e.strength <= state.max_strength
		})
		.cloned()
		.collect();

	GraphView { nodes, edges }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_explorer::adapter::normalize;
	use crate::components::graph_explorer::types::{
		EdgeKind, GraphPayload, NodeKind, RawEdge, RawNode,
	};

	fn model() -> GraphModel {
		let node = |id: &str, name: &str, kind: &str| RawNode {
			id: id.into(),
			name: Some(name.into()),
			kind: Some(kind.into()),
			value: None,
			risk: None,
			metadata: Default::default(),
		};
		let edge = |s: &str, t: &str, kind: &str, strength: f64| RawEdge {
			source: s.into(),
			target: t.into(),
			kind: Some(kind.into()),
			strength: Some(strength),
		};
		normalize(&GraphPayload {
			nodes: vec![
				node("e1", "Acme Holdings", "enterprise"),
				node("e2", "Borealis Bank", "enterprise"),
				node("e3", "Cobalt Mining", "enterprise"),
				node("p1", "Dana Reyes", "person"),
				node("p2", "Evan Okafor", "person"),
			],
			links: vec![
				edge("e1", "e2", "investment", 0.9),
				edge("e2", "e3", "supply", 0.4),
				edge("p1", "e1", "ownership", 0.7),
				edge("p2", "e3", "employment", 0.2),
			],
		})
	}

	#[test]
	fn filtering_is_idempotent() {
		let model = model();
		let state = FilterState {
			query: "o".into(),
			min_strength: 0.3,
			..Default::default()
		};
		let a = filter(&model, &state);
		let b = filter(&model, &state);
		let ids = |v: &GraphView| {
			(
				v.nodes.iter().map(|n| n.id.clone()).collect::<Vec<_>>(),
				v.edges.iter().map(|e| e.id.clone()).collect::<Vec<_>>(),
			)
		};
		assert_eq!(ids(&a), ids(&b));
	}

	#[test]
	fn view_is_a_subset_with_resolved_endpoints() {
		let model = model();
		let state = FilterState {
			min_strength: 0.3,
			max_strength: 0.8,
			..Default::default()
		};
		let view = filter(&model, &state);
		let model_node_ids: std::collections::HashSet<_> =
			model.nodes.iter().map(|n| n.id.as_str()).collect();
		let view_node_ids: std::collections::HashSet<_> =
			view.nodes.iter().map(|n| n.id.as_str()).collect();
		assert!(view_node_ids.is_subset(&model_node_ids));
		for e in &view.edges {
			assert!(view_node_ids.contains(e.source.as_str()));
			assert!(view_node_ids.contains(e.target.as_str()));
		}
	}

	#[test]
	fn strength_bounds_are_inclusive() {
		let model = model();
		let at_bound = FilterState {
			min_strength: 0.4,
			max_strength: 0.9,
			..Default::default()
		};
		let view = filter(&model, &at_bound);
		let kinds: Vec<_> = view.edges.iter().map(|e| e.kind).collect();
		assert!(kinds.contains(&EdgeKind::Supply)); // strength exactly 0.4
		assert!(kinds.contains(&EdgeKind::Investment)); // strength exactly 0.9

		let just_above = FilterState {
			min_strength: 0.41,
			..Default::default()
		};
		let view = filter(&model, &just_above);
		assert!(!view.edges.iter().any(|e| e.kind == EdgeKind::Supply));
	}

	#[test]
	fn empty_kind_set_yields_empty_view() {
		let model = model();
		let state = FilterState {
			node_kinds: Default::default(),
			..Default::default()
		};
		let view = filter(&model, &state);
		assert!(view.nodes.is_empty());
		assert!(view.edges.is_empty());
	}

	#[test]
	fn search_is_case_insensitive_substring() {
		let model = model();
		let state = FilterState {
			query: "ACME".into(),
			..Default::default()
		};
		let view = filter(&model, &state);
		assert_eq!(view.nodes.len(), 1);
		assert_eq!(view.nodes[0].id, "e1");
	}

	#[test]
	fn label_toggle_does_not_affect_visibility() {
		let model = model();
		let on = filter(&model, &FilterState::default());
		let off = filter(
			&model,
			&FilterState {
				show_labels: false,
				..Default::default()
			},
		);
		assert_eq!(on.nodes.len(), off.nodes.len());
		assert_eq!(on.edges.len(), off.edges.len());
	}

	#[test]
	fn enterprise_only_scenario() {
		let model = model();
		let state = FilterState {
			node_kinds: [NodeKind::Enterprise].into_iter().collect(),
			..Default::default()
		};
		let view = filter(&model, &state);
		assert_eq!(view.nodes.len(), 3);
		assert_eq!(view.edges.len(), 2);
		for e in &view.edges {
			assert!(e.source.starts_with('e'));
			assert!(e.target.starts_with('e'));
		}
	}
}
