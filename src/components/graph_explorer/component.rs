//! The `GraphExplorer` Leptos component: canvas wiring, pointer handlers,
//! filter/layout/color controls, tooltip, toolbar, and teardown.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::adapter;
use super::color::{ColorContext, ColorScheme};
use super::filter;
use super::interaction::{InteractionController, ZOOM_STEP};
use super::layout::LayoutEngine;
use super::render::{self, Scene};
use super::svg;
use super::types::{
	EdgeKind, FilterState, GraphEdge, GraphModel, GraphNode, GraphPayload, GraphView,
	LayoutKind, LayoutSettings, NodeKind, SurfaceSize,
};

/// Pointer hit slop around a node, in graph units.
const HIT_RADIUS: f64 = 12.0;

/// Everything the frame loop and pointer handlers share for one mounted
/// graph instance.
struct ExplorerState {
	model: GraphModel,
	view: GraphView,
	engine: LayoutEngine,
	controller: InteractionController,
	color_ctx: ColorContext,
	filter: FilterState,
	layout: LayoutSettings,
	scheme: ColorScheme,
	surface: SurfaceSize,
	ctx2d: CanvasRenderingContext2d,
}

impl ExplorerState {
	fn new(
		payload: &GraphPayload,
		filter_state: FilterState,
		layout: LayoutSettings,
		scheme: ColorScheme,
		surface: SurfaceSize,
		ctx2d: CanvasRenderingContext2d,
	) -> Self {
		let model = adapter::normalize(payload);
		let color_ctx = ColorContext::from_model(&model);
		let view = filter::filter(&model, &filter_state);
		let mut engine = LayoutEngine::new();
		engine.sync(&view, surface);
		engine.apply_layout(&layout, surface, &view.edges);
		Self {
			model,
			view,
			engine,
			controller: InteractionController::new(),
			color_ctx,
			filter: filter_state,
			layout,
			scheme,
			surface,
			ctx2d,
		}
	}

	/// Apply changed filter/layout/color settings. A layout-kind change
	/// re-applies positions from scratch; a membership change under a
	/// simulated layout recomputes the layer depths and reheats so the
	/// surviving nodes re-settle. Returns whether the highlighted selection
	/// changed as a result.
	fn refresh(
		&mut self,
		filter_state: FilterState,
		layout: LayoutSettings,
		scheme: ColorScheme,
	) -> bool {
		// The label toggle is render-only; it must not resync or reheat.
		let membership_changed = filter_state.node_kinds != self.filter.node_kinds
			|| filter_state.edge_kinds != self.filter.edge_kinds
			|| filter_state.min_strength != self.filter.min_strength
			|| filter_state.max_strength != self.filter.max_strength
			|| filter_state.query != self.filter.query;
		let layout_changed = layout.kind != self.layout.kind;
		self.scheme = scheme;
		self.layout = layout;
		self.filter = filter_state;
		let mut selection_changed = false;
		if membership_changed {
			self.view = filter::filter(&self.model, &self.filter);
			self.engine.sync(&self.view, self.surface);
			selection_changed = self.prune_selection();
		}
		if layout_changed || (membership_changed && !layout.kind.simulated()) {
			self.engine.apply_layout(&self.layout, self.surface, &self.view.edges);
		} else if membership_changed {
			if self.layout.kind == LayoutKind::Hierarchical {
				self.engine.refresh_depths(&self.view.edges);
			}
			self.engine.reheat();
		}
		selection_changed
	}

	/// Re-derive selection and hover against the filtered view. Returns
	/// whether the highlight sets changed.
	fn prune_selection(&mut self) -> bool {
		let view = &self.view;
		self.controller
			.refresh_selection(&view.edges, |id| view.nodes.iter().any(|n| n.id == id))
	}

	fn node_by_id(&self, id: &str) -> Option<&GraphNode> {
		self.view.nodes.iter().find(|n| n.id == id)
	}

	/// Topmost node under a screen point, if any.
	fn node_at(&self, sx: f64, sy: f64) -> Option<String> {
		let (gx, gy) = self.controller.transform.screen_to_graph(sx, sy);
		let mut found = None;
		for node in self.engine.nodes() {
			let (dx, dy) = (node.x - gx, node.y - gy);
			if (dx * dx + dy * dy).sqrt() < node.radius.max(HIT_RADIUS) {
				found = Some(node.id.clone());
			}
		}
		found
	}

	/// Highlighted nodes and edges, resolved for the selection-change hook.
	fn selection_payload(&self) -> (Vec<GraphNode>, Vec<GraphEdge>) {
		let nodes = self
			.view
			.nodes
			.iter()
			.filter(|n| self.controller.node_highlighted(&n.id))
			.cloned()
			.collect();
		let edges = self
			.view
			.edges
			.iter()
			.filter(|e| self.controller.edge_highlighted(&e.id))
			.cloned()
			.collect();
		(nodes, edges)
	}

	fn scene(&self, show_legend: bool) -> Scene {
		render::build_scene(
			&self.view,
			&self.engine,
			self.scheme,
			&self.color_ctx,
			&self.controller,
			&self.filter,
			self.surface,
			show_legend,
		)
	}
}

/// Tooltip contents and screen anchor.
#[derive(Clone, Debug, PartialEq)]
struct TooltipData {
	x: f64,
	y: f64,
	name: String,
	kind: &'static str,
	degree: Option<u32>,
	risk: Option<&'static str>,
}

/// Interactive relationship-graph explorer.
///
/// Renders the payload's nodes and edges to a canvas with filtering,
/// selectable layouts and color schemes, selection highlighting, drag
/// pinning, zoom/pan, and SVG export. `data` of `None` shows the loading
/// state; an empty node set shows the no-data state.
#[component]
pub fn GraphExplorer(
	/// Graph payload; `None` while the fetch is in flight.
	#[prop(into)]
	data: Signal<Option<GraphPayload>>,
	/// Fixed surface width; defaults to the parent element's width.
	#[prop(default = None)]
	width: Option<f64>,
	/// Fixed surface height; defaults to the parent element's height.
	#[prop(default = None)]
	height: Option<f64>,
	/// Initial layout selection and tunables.
	#[prop(optional)]
	layout: Option<LayoutSettings>,
	/// Initial node color scheme.
	#[prop(optional)]
	color_scheme: Option<ColorScheme>,
	/// Whether to draw the fixed legend overlay.
	#[prop(default = true)]
	show_legend: bool,
	/// Invoked when a node is clicked.
	#[prop(optional, into)]
	on_node_click: Option<Callback<GraphNode>>,
	/// Invoked when the hovered node changes.
	#[prop(optional, into)]
	on_node_hover: Option<Callback<Option<GraphNode>>>,
	/// Invoked with the highlighted nodes and edges when selection changes.
	#[prop(optional, into)]
	on_selection_change: Option<Callback<(Vec<GraphNode>, Vec<GraphEdge>)>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<ExplorerState>>> = Rc::new(RefCell::new(None));
	// `on_cleanup` closures must be Send + Sync; arena handles are, while the
	// frame callback itself stays thread-local.
	let animate = StoredValue::new_local(None::<Closure<dyn FnMut()>>);
	let raf_handle = StoredValue::new(None::<i32>);
	let alive = StoredValue::new(true);

	let filter_sig = RwSignal::new(FilterState::default());
	let layout_sig = RwSignal::new(layout.unwrap_or_default());
	let scheme_sig = RwSignal::new(color_scheme.unwrap_or(ColorScheme::Kind));
	let paused = RwSignal::new(false);
	let sim_active = RwSignal::new(true);
	let tooltip: RwSignal<Option<TooltipData>> = RwSignal::new(None);

	let loading = move || data.get().is_none();
	let empty = move || data.get().is_some_and(|p| p.nodes.is_empty());

	// Mount: size the canvas, build the state once the payload is in, and
	// start the frame loop.
	let state_init = state.clone();
	Effect::new(move |_| {
		let Some(payload) = data.get() else {
			*state_init.borrow_mut() = None;
			return;
		};
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();

		let w = width.unwrap_or_else(|| {
			canvas
				.parent_element()
				.map(|p| p.client_width() as f64)
				.unwrap_or(800.0)
		});
		let h = height.unwrap_or_else(|| {
			canvas
				.parent_element()
				.map(|p| p.client_height() as f64)
				.unwrap_or(600.0)
		});
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx2d: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();

		*state_init.borrow_mut() = Some(ExplorerState::new(
			&payload,
			filter_sig.get_untracked(),
			layout_sig.get_untracked(),
			scheme_sig.get_untracked(),
			SurfaceSize {
				width: w,
				height: h,
			},
			ctx2d,
		));

		if animate.with_value(|cb| cb.is_some()) {
			return; // frame loop already running from a previous payload
		}
		let state_anim = state_init.clone();
		animate.set_value(Some(Closure::new(move || {
			// A frame can fire after teardown; never touch the surface then.
			if !alive.try_get_value().unwrap_or(false) {
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if !paused.get_untracked() {
					s.engine.tick(&s.layout, s.surface, &s.view.edges);
				}
				s.controller.step_zoom();
				let running = s.engine.running() && s.layout.kind.simulated();
				if sim_active.get_untracked() != running {
					sim_active.set(running);
				}
				render::draw(&s.scene(show_legend), &s.ctx2d);
			}
			let _ = animate.try_with_value(|cb| {
				if let Some(cb) = cb {
					if let Ok(handle) = web_sys::window()
						.unwrap()
						.request_animation_frame(cb.as_ref().unchecked_ref())
					{
						raf_handle.set_value(Some(handle));
					}
				}
			});
		})));
		animate.with_value(|cb| {
			if let Some(cb) = cb {
				if let Ok(handle) = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref())
				{
					raf_handle.set_value(Some(handle));
				}
			}
		});
	});

	// Push filter/layout/color changes into the state. Filtering can prune
	// the highlighted selection, which the hook must hear about.
	let state_settings = state.clone();
	Effect::new(move |_| {
		let (f, l, sc) = (filter_sig.get(), layout_sig.get(), scheme_sig.get());
		let mut pruned = None;
		if let Some(ref mut state) = *state_settings.borrow_mut() {
			if state.refresh(f, l, sc) {
				pruned = Some(state.selection_payload());
			}
		}
		if let (Some(payload), Some(cb)) = (pruned, on_selection_change) {
			cb.run(payload);
		}
	});

	// Stop the frame loop and drop the pending callback when the component
	// goes away, so no tick fires against a detached surface.
	on_cleanup(move || {
		alive.set_value(false);
		if let Some(handle) = raf_handle.get_value() {
			if let Some(window) = web_sys::window() {
				let _ = window.cancel_animation_frame(handle);
			}
		}
		raf_handle.set_value(None);
		animate.update_value(|cb| {
			cb.take();
		});
	});

	let mouse_pos = |ev: &MouseEvent, canvas_ref: &NodeRef<leptos::html::Canvas>| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		)
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let (x, y) = mouse_pos(&ev, &canvas_ref);
		if let Some(ref mut s) = *state_md.borrow_mut() {
			match s.node_at(x, y) {
				Some(id) => {
					s.controller.begin_drag(&id, x, y);
					if s.layout.kind.simulated() {
						s.engine.set_drag_active(true);
					}
				}
				None => s.controller.begin_pan(x, y),
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let (x, y) = mouse_pos(&ev, &canvas_ref);
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if let Some((id, gx, gy)) = s.controller.drag_to(x, y) {
				s.engine.pin(&id, gx, gy);
				return;
			}
			if s.controller.pan.active {
				s.controller.pan_to(x, y);
				return;
			}

			let hit = s.node_at(x, y);
			if hit != s.controller.selection.hovered {
				s.controller.hover(hit.clone());
				let node = hit.as_deref().and_then(|id| s.node_by_id(id)).cloned();
				if let Some(cb) = on_node_hover {
					cb.run(node.clone());
				}
				tooltip.set(node.map(|n| TooltipData {
					x: x + 14.0,
					y: y + 14.0,
					name: n.name.clone(),
					kind: n.kind.tag(),
					degree: n.degree,
					risk: n.risk.map(|r| r.tag()),
				}));
			} else if hit.is_some() {
				// Tooltip follows the pointer.
				tooltip.update(|t| {
					if let Some(t) = t {
						t.x = x + 14.0;
						t.y = y + 14.0;
					}
				});
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let (x, y) = mouse_pos(&ev, &canvas_ref);
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			if let Some((id, was_drag)) = s.controller.end_drag() {
				s.engine.set_drag_active(false);
				if !was_drag {
					// A stationary press is a click: select and notify.
					s.controller.select(&id, &s.view.edges);
					if let Some(node) = s.node_by_id(&id).cloned() {
						if let Some(cb) = on_node_click {
							cb.run(node);
						}
					}
					if let Some(cb) = on_selection_change {
						cb.run(s.selection_payload());
					}
				}
				return;
			}
			if s.controller.pan.active && !s.controller.end_pan(x, y) {
				// Background click with no pan clears the selection.
				s.controller.clear_selection();
				if let Some(cb) = on_selection_change {
					cb.run((Vec::new(), Vec::new()));
				}
			}
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.controller.cancel_gestures();
			s.engine.set_drag_active(false);
		}
		tooltip.set(None);
		if let Some(cb) = on_node_hover {
			cb.run(None);
		}
	};

	// Double-click releases a pin so the simulation takes the node back.
	let state_dc = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let (x, y) = mouse_pos(&ev, &canvas_ref);
		if let Some(ref mut s) = *state_dc.borrow_mut() {
			if let Some(id) = s.node_at(x, y) {
				s.engine.unpin(&id);
				s.engine.reheat();
			}
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let (x, y) = mouse_pos(ev.as_ref(), &canvas_ref);
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			s.controller.zoom_by(factor, x, y);
		}
	};

	// Toolbar zoom eases toward its target over a few frames; the wheel
	// stays immediate.
	let zoom_button = {
		let state = state.clone();
		move |factor: f64| {
			let state = state.clone();
			move |_: MouseEvent| {
				if let Some(ref mut s) = *state.borrow_mut() {
					let (cx, cy) = s.surface.center();
					s.controller.zoom_toward(factor, cx, cy);
				}
			}
		}
	};
	let zoom_in = zoom_button(ZOOM_STEP);
	let zoom_out = zoom_button(1.0 / ZOOM_STEP);

	let state_reset = state.clone();
	let on_reset_view = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_reset.borrow_mut() {
			s.controller.reset_view();
		}
	};

	let state_export = state.clone();
	let on_export = move |_: MouseEvent| {
		if let Some(ref s) = *state_export.borrow() {
			let markup = svg::scene_to_svg(&s.scene(show_legend));
			if let Err(err) = svg::download_svg("graph-explorer.svg", &markup) {
				warn!("svg export failed: {err:?}");
			}
		}
	};

	view! {
		<div class="graph-explorer" style="position: relative;">
			<canvas
				node_ref=canvas_ref
				class="graph-explorer-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:dblclick=on_dblclick
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>

			<Show when=loading>
				<div class="graph-explorer-status">"Loading graph..."</div>
			</Show>
			<Show when=empty>
				<div class="graph-explorer-status">"No relationships to display"</div>
			</Show>

			<div class="graph-explorer-toolbar">
				<button on:click=zoom_in.clone() title="Zoom in">"+"</button>
				<button on:click=zoom_out.clone() title="Zoom out">"-"</button>
				<button on:click=on_reset_view title="Reset view">"Reset"</button>
				<button
					on:click=move |_| paused.update(|p| *p = !*p)
					disabled=move || !sim_active.get()
					title="Pause or resume the layout"
				>
					{move || if paused.get() { "Play" } else { "Pause" }}
				</button>
				<button on:click=on_export title="Download as SVG">"Export"</button>
			</div>

			<div class="graph-explorer-controls">
				<input
					type="search"
					placeholder="Search by name"
					prop:value=move || filter_sig.get().query
					on:input=move |ev| {
						let q = event_target_value(&ev);
						filter_sig.update(|f| f.query = q);
					}
				/>

				<fieldset>
					<legend>"Node types"</legend>
					{NodeKind::ALL
						.into_iter()
						.map(|kind| {
							view! {
								<label>
									<input
										type="checkbox"
										prop:checked=move || filter_sig.get().node_kinds.contains(&kind)
										on:change=move |_| {
											filter_sig.update(|f| {
												if !f.node_kinds.remove(&kind) {
													f.node_kinds.insert(kind);
												}
											});
										}
									/>
									{kind.tag()}
								</label>
							}
						})
						.collect_view()}
				</fieldset>

				<fieldset>
					<legend>"Link types"</legend>
					{EdgeKind::ALL
						.into_iter()
						.map(|kind| {
							view! {
								<label>
									<input
										type="checkbox"
										prop:checked=move || filter_sig.get().edge_kinds.contains(&kind)
										on:change=move |_| {
											filter_sig.update(|f| {
												if !f.edge_kinds.remove(&kind) {
													f.edge_kinds.insert(kind);
												}
											});
										}
									/>
									{kind.tag()}
								</label>
							}
						})
						.collect_view()}
				</fieldset>

				<label>
					"Min strength"
					<input
						type="range"
						min="0"
						max="1"
						step="0.05"
						prop:value=move || filter_sig.get().min_strength.to_string()
						on:input=move |ev| {
							if let Ok(v) = event_target_value(&ev).parse::<f64>() {
								filter_sig.update(|f| f.min_strength = v.min(f.max_strength));
							}
						}
					/>
				</label>
				<label>
					"Max strength"
					<input
						type="range"
						min="0"
						max="1"
						step="0.05"
						prop:value=move || filter_sig.get().max_strength.to_string()
						on:input=move |ev| {
							if let Ok(v) = event_target_value(&ev).parse::<f64>() {
								filter_sig.update(|f| f.max_strength = v.max(f.min_strength));
							}
						}
					/>
				</label>

				<label>
					<input
						type="checkbox"
						prop:checked=move || filter_sig.get().show_labels
						on:change=move |_| filter_sig.update(|f| f.show_labels = !f.show_labels)
					/>
					"Labels"
				</label>

				<label>
					"Layout"
					<select on:change=move |ev| {
						if let Some(kind) = LayoutKind::from_label(&event_target_value(&ev)) {
							layout_sig.update(|l| l.kind = kind);
						}
					}>
						{LayoutKind::ALL
							.into_iter()
							.map(|kind| {
								view! {
									<option
										value=kind.label()
										selected=move || layout_sig.get().kind == kind
									>
										{kind.label()}
									</option>
								}
							})
							.collect_view()}
					</select>
				</label>

				<label>
					"Color"
					<select on:change=move |ev| {
						if let Some(scheme) = ColorScheme::from_label(&event_target_value(&ev)) {
							scheme_sig.set(scheme);
						}
					}>
						{ColorScheme::ALL
							.into_iter()
							.map(|scheme| {
								view! {
									<option
										value=scheme.label()
										selected=move || scheme_sig.get() == scheme
									>
										{scheme.label()}
									</option>
								}
							})
							.collect_view()}
					</select>
				</label>
			</div>

			{move || {
				tooltip.get().map(|t| {
					let style = format!(
						"position: absolute; left: {}px; top: {}px; pointer-events: none;",
						t.x, t.y
					);
					view! {
						<div class="graph-explorer-tooltip" style=style>
							<strong>{t.name}</strong>
							<div>{t.kind}</div>
							{t.degree.map(|d| view! { <div>{format!("{d} connections")}</div> })}
							{t.risk.map(|r| view! { <div>{format!("{r} risk")}</div> })}
						</div>
					}
				})
			}}
		</div>
	}
}
