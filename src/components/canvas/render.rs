use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scene::{Align, Primitive, Scene, Stroke};
use super::text::TextMeasure;
use super::types::Point;

/// Measures labels with the context's current font metrics.
pub struct CanvasMeasure<'a> {
	ctx: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasMeasure<'a> {
	pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
		Self { ctx }
	}
}

impl TextMeasure for CanvasMeasure<'_> {
	fn width(&self, text: &str, font_size: f64) -> f64 {
		self.ctx.set_font(&font(font_size, false));
		self.ctx
			.measure_text(text)
			.map(|m| m.width())
			.unwrap_or_else(|_| text.chars().count() as f64 * font_size * 0.6)
	}
}

fn font(size: f64, bold: bool) -> String {
	format!("{}{}px sans-serif", if bold { "bold " } else { "" }, size)
}

pub fn render(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(scene.background);
	ctx.fill_rect(0.0, 0.0, scene.width, scene.height);
	for primitive in &scene.primitives {
		draw(primitive, ctx);
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn apply_stroke(ctx: &CanvasRenderingContext2d, stroke: &Stroke) {
	ctx.set_stroke_style_str(stroke.color);
	ctx.set_line_width(stroke.width);
	let dash = match stroke.dash {
		Some((dash, gap)) => js_sys::Array::of2(&JsValue::from_f64(dash), &JsValue::from_f64(gap)),
		None => js_sys::Array::new(),
	};
	let _ = ctx.set_line_dash(&dash);
}

fn finish(ctx: &CanvasRenderingContext2d, fill: Option<&str>, stroke: Option<&Stroke>) {
	if let Some(fill) = fill {
		ctx.set_fill_style_str(fill);
		ctx.fill();
	}
	if let Some(stroke) = stroke {
		apply_stroke(ctx, stroke);
		ctx.stroke();
	}
}

fn trace_polygon(ctx: &CanvasRenderingContext2d, points: &[Point]) {
	let Some((first, rest)) = points.split_first() else {
		return;
	};
	ctx.begin_path();
	ctx.move_to(first.x, first.y);
	for p in rest {
		ctx.line_to(p.x, p.y);
	}
	ctx.close_path();
}

fn trace_rounded_rect(ctx: &CanvasRenderingContext2d, o: Point, w: f64, h: f64, r: f64) {
	let r = r.min(w / 2.0).min(h / 2.0);
	ctx.begin_path();
	ctx.move_to(o.x + r, o.y);
	let _ = ctx.arc_to(o.x + w, o.y, o.x + w, o.y + h, r);
	let _ = ctx.arc_to(o.x + w, o.y + h, o.x, o.y + h, r);
	let _ = ctx.arc_to(o.x, o.y + h, o.x, o.y, r);
	let _ = ctx.arc_to(o.x, o.y, o.x + w, o.y, r);
	ctx.close_path();
}

fn draw(primitive: &Primitive, ctx: &CanvasRenderingContext2d) {
	match primitive {
		Primitive::Rect {
			origin,
			width,
			height,
			radius,
			fill,
			stroke,
		} => {
			trace_rounded_rect(ctx, *origin, *width, *height, *radius);
			finish(ctx, *fill, stroke.as_ref());
		}
		Primitive::Circle {
			center,
			radius,
			fill,
			stroke,
		} => {
			ctx.begin_path();
			let _ = ctx.arc(center.x, center.y, *radius, 0.0, 2.0 * PI);
			finish(ctx, Some(*fill), Some(stroke));
		}
		Primitive::Ellipse {
			center,
			rx,
			ry,
			fill,
			stroke,
		} => {
			ctx.begin_path();
			let _ = ctx.ellipse(center.x, center.y, *rx, *ry, 0.0, 0.0, 2.0 * PI);
			finish(ctx, Some(*fill), Some(stroke));
		}
		Primitive::Polygon {
			points,
			fill,
			stroke,
		} => {
			trace_polygon(ctx, points);
			finish(ctx, *fill, stroke.as_ref());
		}
		Primitive::Line { from, to, stroke } => {
			apply_stroke(ctx, stroke);
			ctx.begin_path();
			ctx.move_to(from.x, from.y);
			ctx.line_to(to.x, to.y);
			ctx.stroke();
		}
		Primitive::Text {
			at,
			text,
			color,
			size,
			bold,
			align,
		} => {
			ctx.set_fill_style_str(color);
			ctx.set_font(&font(*size, *bold));
			ctx.set_text_align(match align {
				Align::Left => "left",
				Align::Center => "center",
			});
			let _ = ctx.fill_text(text, at.x, at.y);
		}
	}
}
