use std::cell::RefCell;
use std::rc::Rc;

use leptos::html::Canvas;
use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, DragEvent, Event, HtmlCanvasElement, HtmlInputElement,
	HtmlTextAreaElement, KeyboardEvent, MouseEvent,
};

use super::drop::{DropOutcome, JSON_FORMAT, TEXT_FORMAT, TransferPayload, start_drag};
use super::graph::unplaced;
use super::interaction::{CanvasEvent, Key, Target};
use super::listener::{LoopHandle, WindowListener, keep_running};
use super::render::{self, CanvasMeasure};
use super::scene::EditOverlay;
use super::state::CanvasState;
use super::types::{DiagramType, Keyword, Point, Shape, Template};

/// Signals the view reads, refreshed from the engine once per frame.
#[derive(Clone, Copy)]
struct Mirror {
	placed: RwSignal<Vec<String>>,
	editing: RwSignal<Option<EditOverlay>>,
	shape: RwSignal<Option<Shape>>,
}

impl Mirror {
	fn new() -> Self {
		Self {
			placed: RwSignal::new(Vec::new()),
			editing: RwSignal::new(None),
			shape: RwSignal::new(None),
		}
	}

	fn publish(self, placed: Vec<String>, editing: Option<EditOverlay>, shape: Option<Shape>) {
		if self.placed.with_untracked(|p| *p != placed) {
			self.placed.set(placed);
		}
		if self.editing.with_untracked(|e| *e != editing) {
			self.editing.set(editing);
		}
		if self.shape.get_untracked() != shape {
			self.shape.set(shape);
		}
	}
}

fn canvas_size(canvas: &HtmlCanvasElement, width: Option<f64>, height: Option<f64>) -> (f64, f64) {
	let parent = canvas.parent_element();
	let measured = |f: fn(&web_sys::Element) -> i32, fallback: f64| {
		parent
			.as_ref()
			.map(f)
			.filter(|v| *v > 0)
			.map_or(fallback, f64::from)
	};
	(
		width.unwrap_or_else(|| measured(web_sys::Element::client_width, 800.0)),
		height.unwrap_or_else(|| measured(web_sys::Element::client_height, 600.0)),
	)
}

fn local_point(canvas_ref: NodeRef<Canvas>, ev: &MouseEvent) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?;
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn typing_into_field(ev: &Event) -> bool {
	ev.target().is_some_and(|t| {
		t.has_type::<HtmlInputElement>() || t.has_type::<HtmlTextAreaElement>()
	})
}

/// Interactive diagram surface plus the bank of keywords still to place.
///
/// Each mount owns a fresh, empty diagram; the host remounts it to start
/// over. Switching `diagram_type` keeps the nodes and links.
#[component]
pub fn DiagramCanvas(
	/// Selected keywords, in extraction order.
	#[prop(into)]
	keywords: Signal<Vec<Keyword>>,
	#[prop(into)] diagram_type: Signal<DiagramType>,
	#[prop(into, default = false.into())] loading: Signal<bool>,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<Canvas>::new();
	let edit_ref = NodeRef::<leptos::html::Input>::new();
	let state: Rc<RefCell<Option<CanvasState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let mirror = Mirror::new();

	let frames = LoopHandle::new();
	let (state_init, animate_init, alive) = (state.clone(), animate.clone(), frames.alive());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if state_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let (w, h) = canvas_size(&canvas, width, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("canvas has no 2d context");
			return;
		};
		debug!("mounting {} canvas at {}x{}", diagram_type.get_untracked().label(), w, h);
		*state_init.borrow_mut() = Some(CanvasState::new(diagram_type.get_untracked(), w, h));

		let (state_anim, animate_inner, alive) =
			(state_init.clone(), animate_init.clone(), alive.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !keep_running(&alive, &animate_inner) {
				return;
			}
			let frame = state_anim.borrow_mut().as_mut().map(|s| {
				s.tick(0.016);
				let scene = s.scene(&CanvasMeasure::new(&ctx));
				render::render(&scene, &ctx);
				let placed: Vec<String> = s.store.nodes().iter().map(|n| n.id.clone()).collect();
				let shape = (s.template() == Template::Flowchart)
					.then(|| s.interaction.selected_node())
					.flatten()
					.and_then(|id| s.store.node(id))
					.map(|n| n.shape);
				(placed, scene.edit_overlay, shape)
			});
			if let Some((placed, editing, shape)) = frame {
				mirror.publish(placed, editing, shape);
			}
			if let Some(window) = web_sys::window()
				&& let Some(ref cb) = *animate_inner.borrow()
			{
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(window) = web_sys::window()
			&& let Some(ref cb) = *animate_init.borrow()
		{
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_dt = state.clone();
	Effect::new(move |_| {
		let diagram = diagram_type.get();
		if let Some(s) = state_dt.borrow_mut().as_mut() {
			s.set_diagram(diagram);
		}
	});

	let state_key = state.clone();
	let keys = WindowListener::new("keydown", move |ev: Event| {
		if typing_into_field(&ev) {
			return;
		}
		let Some(ev) = ev.dyn_ref::<KeyboardEvent>() else {
			return;
		};
		if let Some(s) = state_key.borrow_mut().as_mut() {
			s.dispatch(CanvasEvent::KeyDown(Key::from_name(&ev.key())));
		}
	});

	let state_resize = state.clone();
	let resize = (width.is_none() || height.is_none())
		.then(|| {
			WindowListener::new("resize", move |_| {
				let Some(canvas) = canvas_ref.get() else {
					return;
				};
				let canvas: HtmlCanvasElement = canvas.into();
				let (w, h) = canvas_size(&canvas, width, height);
				canvas.set_width(w as u32);
				canvas.set_height(h as u32);
				if let Some(s) = state_resize.borrow_mut().as_mut() {
					s.resize(w, h);
				}
			})
		})
		.flatten();
	// Released with the component: unsubscribes and stops the frame loop.
	let _guards = StoredValue::new_local((keys, resize, frames));

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(at) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(s) = state_md.borrow_mut().as_mut()
			&& let Some(node) = s.node_at_position(at)
		{
			s.dispatch(CanvasEvent::PointerDown { node, at });
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(at) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(s) = state_mm.borrow_mut().as_mut() {
			s.dispatch(CanvasEvent::PointerMove(at));
			let hovered = s.node_at_position(at);
			s.set_hover(hovered);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(s) = state_mu.borrow_mut().as_mut() {
			s.dispatch(CanvasEvent::PointerUp);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(s) = state_ml.borrow_mut().as_mut() {
			s.dispatch(CanvasEvent::PointerLeave);
			s.set_hover(None);
		}
	};

	let state_cl = state.clone();
	let on_click = move |ev: MouseEvent| {
		let Some(at) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(s) = state_cl.borrow_mut().as_mut() {
			let target = s.target_at(at);
			s.dispatch(CanvasEvent::Click(target));
		}
	};

	let state_dc = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some(at) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(s) = state_dc.borrow_mut().as_mut()
			&& let Target::Node(node) = s.target_at(at)
		{
			s.dispatch(CanvasEvent::DoubleClick {
				node,
				edit_modifier: ev.shift_key(),
			});
		}
	};

	let state_dr = state.clone();
	let on_drop = move |ev: DragEvent| {
		ev.prevent_default();
		let Some(transfer) = ev.data_transfer() else {
			return;
		};
		let payload = TransferPayload {
			json: transfer.get_data(JSON_FORMAT).ok(),
			text: transfer.get_data(TEXT_FORMAT).ok(),
		};
		let Some(at) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(s) = state_dr.borrow_mut().as_mut()
			&& let DropOutcome::Placed(id) = s.drop_keyword(&payload, at)
		{
			debug!("dropped `{}` at ({:.0}, {:.0})", id, at.x, at.y);
		}
	};

	let state_ed = state.clone();
	let commit = move |text: String| {
		if let Some(s) = state_ed.borrow_mut().as_mut() {
			s.dispatch(CanvasEvent::CommitEdit(text));
		}
	};
	let commit_enter = commit.clone();

	Effect::new(move |_| {
		if mirror.editing.with(Option::is_some)
			&& let Some(input) = edit_ref.get()
		{
			let _ = input.focus();
			input.select();
		}
	});

	let palette = Shape::ALL
		.into_iter()
		.map(|shape| {
			let state_sh = state.clone();
			view! {
				<button
					class="shape-option"
					class:active=move || mirror.shape.get() == Some(shape)
					on:click=move |_| {
						if let Some(s) = state_sh.borrow_mut().as_mut() {
							s.set_selected_shape(shape);
						}
					}
				>
					{shape.label()}
				</button>
			}
		})
		.collect_view();

	let bank = Memo::new(move |_| {
		mirror
			.placed
			.with(|placed| keywords.with(|k| unplaced(k, |id| placed.iter().any(|p| p == id))))
	});

	let editor_style = move || {
		mirror.editing.with(|e| match e {
			Some(o) => format!(
				"position: absolute; left: {}px; top: {}px; width: {}px; height: {}px;",
				o.origin.x, o.origin.y, o.width, o.height
			),
			None => "display: none;".to_string(),
		})
	};

	view! {
		<div class="diagram">
			<div class="keyword-bank">
				{move || {
					bank.get()
						.into_iter()
						.map(|keyword| {
							let title = keyword.description.clone();
							let name = keyword.name.clone();
							view! {
								<span
									class="keyword-chip"
									draggable="true"
									title=title
									on:dragstart=move |ev: DragEvent| {
										let Some(transfer) = ev.data_transfer() else {
											return;
										};
										match start_drag(&keyword) {
											Ok(data) => {
												let _ = transfer.set_data(JSON_FORMAT, &data);
												let _ = transfer.set_data(TEXT_FORMAT, &data);
											}
											Err(e) => {
												error!("could not serialize `{}` for dragging: {}", keyword.name, e)
											}
										}
									}
								>
									{name}
								</span>
							}
						})
						.collect_view()
				}}
			</div>
			<div class="canvas-wrap" style="position: relative;">
				<canvas
					node_ref=canvas_ref
					class="diagram-canvas"
					on:mousedown=on_mousedown
					on:mousemove=on_mousemove
					on:mouseup=on_mouseup
					on:mouseleave=on_mouseleave
					on:click=on_click
					on:dblclick=on_dblclick
					on:dragover=|ev: DragEvent| ev.prevent_default()
					on:drop=on_drop
					style="display: block; cursor: default;"
				/>
				<input
					node_ref=edit_ref
					type="text"
					class="node-editor"
					style=editor_style
					prop:value=move || mirror.editing.with(|e| e.as_ref().map(|o| o.text.clone()).unwrap_or_default())
					on:keydown=move |ev: KeyboardEvent| {
						if ev.key() == "Enter" {
							commit_enter(event_target_value(&ev));
						}
					}
					on:blur=move |ev| commit(event_target_value(&ev))
				/>
				<div
					class="shape-palette"
					style:display=move || if mirror.shape.with(Option::is_some) { "flex" } else { "none" }
				>
					{palette}
				</div>
				<Show when=move || keywords.with(Vec::is_empty) && !loading.get()>
					<p class="canvas-hint">"Your interactive canvas is ready."</p>
				</Show>
			</div>
		</div>
	}
}
