//! Canvas rendering for the force graph.
//!
//! Rendering uses multiple passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Edges with arrowheads (world space)
//! 3. Dimmed nodes, then the hovered neighbourhood on top

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::{ForceGraphState, NodeInfo};
use super::theme::{Color, GraphStyle};

/// Renders the complete graph to the canvas.
pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, style: &GraphStyle) {
	ctx.set_fill_style_str(&style.background.to_css());
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	draw_edges(state, ctx, style);
	draw_nodes(state, ctx, style);

	ctx.restore();
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, style: &GraphStyle) {
	let k = state.transform.k;
	let dimming = state.highlight.is_active();

	state.graph.visit_edges(|n1, n2, _| {
		let (x1, y1, x2, y2) = (n1.x() as f64, n1.y() as f64, n2.x() as f64, n2.y() as f64);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 2.0 * style.node_radius + style.arrow_size {
			return;
		}

		let highlighted = state.highlight.edge_highlighted(n1.index(), n2.index());
		let color = if highlighted {
			style.link_highlight_color
		} else if dimming {
			let c = style.link_color;
			c.with_alpha(c.a * style.highlight_opacity)
		} else {
			style.link_color
		};
		let width = if highlighted {
			style.link_width * 1.5
		} else {
			style.link_width
		};

		let (ux, uy) = (dx / dist, dy / dist);
		let (tip_x, tip_y) = (x2 - ux * style.node_radius, y2 - uy * style.node_radius);
		let (back_x, back_y) = (tip_x - ux * style.arrow_size, tip_y - uy * style.arrow_size);

		ctx.set_stroke_style_str(&color.to_css());
		ctx.set_line_width(width / k.max(1.0));
		ctx.begin_path();
		ctx.move_to(x1 + ux * style.node_radius, y1 + uy * style.node_radius);
		ctx.line_to(back_x, back_y);
		ctx.stroke();

		let (px, py) = (-uy * style.arrow_size * 0.5, ux * style.arrow_size * 0.5);
		ctx.set_fill_style_str(&color.to_css());
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	});
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, style: &GraphStyle) {
	let highlight = &state.highlight;

	if !highlight.is_active() {
		state.graph.visit_nodes(|node| {
			draw_node(ctx, node, style, state.transform.k, 1.0, false);
		});
		return;
	}

	state.graph.visit_nodes(|node| {
		if !highlight.contains(node.index()) {
			draw_node(ctx, node, style, state.transform.k, style.highlight_opacity, false);
		}
	});
	state.graph.visit_nodes(|node| {
		if highlight.contains(node.index()) {
			let hovered = highlight.hovered() == Some(node.index());
			draw_node(ctx, node, style, state.transform.k, 1.0, hovered);
		}
	});
}

fn draw_node(
	ctx: &CanvasRenderingContext2d,
	node: &force_graph::Node<NodeInfo>,
	style: &GraphStyle,
	k: f64,
	alpha: f64,
	hovered: bool,
) {
	let (x, y) = (node.x() as f64, node.y() as f64);
	let info = &node.data.user_data;
	let radius = if hovered {
		style.node_radius * 1.2
	} else {
		style.node_radius
	};
	let fill = Color::from_hex(&info.color).unwrap_or(Color::rgb(211, 211, 211));

	ctx.set_global_alpha(alpha);

	hexagon(ctx, x, y, radius);
	ctx.set_fill_style_str(&fill.to_css());
	ctx.fill();
	ctx.set_stroke_style_str(&if hovered {
		Color::rgb(255, 255, 255).to_css()
	} else {
		fill.darken(0.35).to_css()
	});
	ctx.set_line_width(style.node_stroke_width / k);
	ctx.stroke();

	let font_size = style.label_size / k;
	ctx.set_font(&format!(
		"{}{}px sans-serif",
		if hovered { "bold " } else { "" },
		font_size
	));
	ctx.set_fill_style_str(&style.label_color.to_css());
	let _ = ctx.fill_text(&info.label, x + radius + 4.0 / k, y + font_size / 3.0);

	ctx.set_global_alpha(1.0);
}

/// Pointy-top hexagon centered on `(x, y)` with circumradius `r`.
fn hexagon(ctx: &CanvasRenderingContext2d, x: f64, y: f64, r: f64) {
	ctx.begin_path();
	for i in 0..6 {
		let angle = PI / 3.0 * i as f64 - PI / 2.0;
		let (px, py) = (x + r * angle.cos(), y + r * angle.sin());
		if i == 0 {
			ctx.move_to(px, py);
		} else {
			ctx.line_to(px, py);
		}
	}
	ctx.close_path();
}
