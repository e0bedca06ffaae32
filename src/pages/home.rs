use leptos::prelude::*;
use log::info;

use crate::components::graph_explorer::{
	GraphExplorer, GraphNode, GraphPayload, RawEdge, RawNode, RawNodeMeta,
};

const EDGE_KINDS: &[&str] = &[
	"investment",
	"guarantee",
	"supply",
	"partnership",
	"ownership",
	"employment",
];

/// Generate a sample relationship payload: a handful of enterprises, their
/// owners and key staff, and mixed-type links between them.
fn sample_payload(enterprises: usize, people: usize) -> GraphPayload {
	let mut nodes = Vec::new();
	for i in 0..enterprises {
		nodes.push(RawNode {
			id: format!("ent-{i}"),
			name: Some(format!("Enterprise {i}")),
			kind: Some("enterprise".into()),
			value: Some(1.0 + rand_simple(i) * 8.0),
			risk: Some(
				["low", "medium", "high", "critical"][(rand_simple(i * 3) * 4.0) as usize % 4]
					.into(),
			),
			metadata: RawNodeMeta {
				degree: Some((rand_simple(i * 7) * 10.0) as u32),
				cluster: Some((i % 5) as u32),
			},
		});
	}
	for i in 0..people {
		nodes.push(RawNode {
			id: format!("per-{i}"),
			name: Some(format!("Contact {i}")),
			kind: Some("person".into()),
			value: None,
			risk: None,
			metadata: RawNodeMeta {
				degree: Some((rand_simple(i * 11) * 6.0) as u32),
				cluster: Some((i % 5) as u32),
			},
		});
	}

	let mut links = Vec::new();
	for i in 1..enterprises {
		let target = (rand_simple(i * 13) * i as f64) as usize;
		links.push(RawEdge {
			source: format!("ent-{i}"),
			target: format!("ent-{target}"),
			kind: Some(EDGE_KINDS[i % EDGE_KINDS.len()].into()),
			strength: Some(0.2 + rand_simple(i * 17) * 0.8),
		});
	}
	for i in 0..people {
		let target = (rand_simple(i * 19) * enterprises as f64) as usize % enterprises.max(1);
		links.push(RawEdge {
			source: format!("per-{i}"),
			target: format!("ent-{target}"),
			kind: Some(if i % 3 == 0 { "ownership" } else { "employment" }.into()),
			strength: Some(0.3 + rand_simple(i * 23) * 0.5),
		});
	}

	GraphPayload { nodes, links }
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let payload = Signal::derive(move || Some(sample_payload(24, 16)));

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="explorer-page">
				<GraphExplorer
					data=payload
					width=Some(1100.0)
					height=Some(720.0)
					on_node_click=Callback::new(|node: GraphNode| {
						info!("clicked {} ({})", node.name, node.id);
					})
				/>
			</div>
		</ErrorBoundary>
	}
}
