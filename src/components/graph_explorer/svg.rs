//! On-demand SVG export: serializes the current [`Scene`] to a standalone
//! SVG document and hands it to the browser as a file download. No server
//! round-trip.

use std::fmt::Write as _;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use super::render::{BACKGROUND, Scene};

/// Serialize a scene to an SVG document string. Geometry, colors, and
/// opacity match the canvas rendering frame for frame.
pub fn scene_to_svg(scene: &Scene) -> String {
	let mut out = String::new();
	let _ = write!(
		out,
		r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
		w = scene.surface.width,
		h = scene.surface.height,
	);
	let _ = write!(
		out,
		r#"<rect width="100%" height="100%" fill="{BACKGROUND}"/>"#
	);

	let (tx, ty, k) = scene.transform;
	let _ = write!(out, r#"<g transform="translate({tx} {ty}) scale({k})">"#);

	for edge in &scene.edges {
		let _ = write!(
			out,
			r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.2}" opacity="{}"/>"#,
			edge.x1, edge.y1, edge.x2, edge.y2, edge.color, edge.width, edge.alpha,
		);
		if let Some([tip, left, right]) = edge.arrow {
			let _ = write!(
				out,
				r#"<polygon points="{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}" fill="{}" opacity="{}"/>"#,
				tip.0, tip.1, left.0, left.1, right.0, right.1, edge.color, edge.alpha,
			);
		}
	}

	for node in &scene.nodes {
		let _ = write!(
			out,
			r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" opacity="{}"/>"#,
			node.x, node.y, node.radius, node.color, node.alpha,
		);
		if node.selected {
			let _ = write!(
				out,
				r##"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="none" stroke="#ffffff" stroke-width="{:.2}"/>"##,
				node.x,
				node.y,
				node.radius + 3.0 / k,
				2.0 / k,
			);
		}
		if let Some(label) = &node.label {
			let _ = write!(
				out,
				r##"<text x="{:.2}" y="{:.2}" font-size="{:.1}" font-family="sans-serif" fill="#ffffff" opacity="{}">{}</text>"##,
				node.x + node.radius + 3.0,
				node.y + 3.0,
				10.0 / k.max(0.5),
				node.alpha * 0.85,
				escape(label),
			);
		}
	}
	out.push_str("</g>");

	let (lx, mut ly) = (16.0, 20.0);
	for entry in &scene.legend {
		let _ = write!(
			out,
			r#"<rect x="{lx}" y="{}" width="10" height="10" fill="{}"/>"#,
			ly - 8.0,
			entry.color,
		);
		let _ = write!(
			out,
			r##"<text x="{}" y="{ly}" font-size="12" font-family="sans-serif" fill="#ffffff">{}</text>"##,
			lx + 16.0,
			escape(entry.label),
		);
		ly += 18.0;
	}

	out.push_str("</svg>");
	out
}

/// Trigger a client-side download of the serialized scene.
pub fn download_svg(filename: &str, svg: &str) -> Result<(), JsValue> {
	let parts = js_sys::Array::of1(&JsValue::from_str(svg));
	let options = BlobPropertyBag::new();
	options.set_type("image/svg+xml");
	let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
	let url = Url::create_object_url_with_blob(&blob)?;

	let document = web_sys::window()
		.ok_or_else(|| JsValue::from_str("no window"))?
		.document()
		.ok_or_else(|| JsValue::from_str("no document"))?;
	let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
	anchor.set_href(&url);
	anchor.set_download(filename);
	anchor.click();
	Url::revoke_object_url(&url)?;
	Ok(())
}

fn escape(text: &str) -> String {
	text.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_explorer::render::{LegendEntry, SceneEdge, SceneNode};
	use crate::components::graph_explorer::types::SurfaceSize;

	fn scene() -> Scene {
		Scene {
			nodes: vec![SceneNode {
				id: "a".into(),
				x: 100.0,
				y: 80.0,
				radius: 5.0,
				color: "#4a90d9".into(),
				label: Some("Smith & Sons".into()),
				alpha: 1.0,
				selected: true,
			}],
			edges: vec![SceneEdge {
				x1: 0.0,
				y1: 0.0,
				x2: 90.0,
				y2: 80.0,
				color: "#64b4ff".into(),
				width: 2.5,
				alpha: 0.7,
				arrow: Some([(95.0, 80.0), (90.0, 77.0), (90.0, 83.0)]),
			}],
			legend: vec![LegendEntry {
				label: "Enterprise",
				color: "#4a90d9".into(),
			}],
			transform: (10.0, 20.0, 2.0),
			surface: SurfaceSize::default(),
		}
	}

	#[test]
	fn serializes_a_complete_document() {
		let svg = scene_to_svg(&scene());
		assert!(svg.starts_with("<svg"));
		assert!(svg.ends_with("</svg>"));
		assert!(svg.contains(r#"translate(10 20) scale(2)"#));
		assert!(svg.contains("<circle"));
		assert!(svg.contains("<line"));
		assert!(svg.contains("<polygon"));
		assert!(svg.contains("Enterprise"));
	}

	#[test]
	fn escapes_label_markup() {
		let svg = scene_to_svg(&scene());
		assert!(svg.contains("Smith &amp; Sons"));
		assert!(!svg.contains("Smith & Sons"));
	}

	#[test]
	fn selected_node_gets_an_emphasis_ring() {
		let svg = scene_to_svg(&scene());
		assert!(svg.contains(r##"fill="none" stroke="#ffffff""##));
	}
}
