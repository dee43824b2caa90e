//! Visual styling for the force graph.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Alpha, 0.0 to 1.0.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with explicit alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color, different alpha.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		let up = |c: u8| (c as f64 + (255.0 - c as f64) * f) as u8;
		Self {
			r: up(self.r),
			g: up(self.g),
			b: up(self.b),
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		let down = |c: u8| (c as f64 * f) as u8;
		Self {
			r: down(self.r),
			g: down(self.g),
			b: down(self.b),
			a: self.a,
		}
	}

	/// CSS notation, hex when opaque and `rgba()` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			self.to_css_rgb()
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}

	/// `#rrggbb`, ignoring alpha.
	pub fn to_css_rgb(self) -> String {
		format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
	}

	/// Parse `#rrggbb`. Other notations are not produced by this crate.
	pub fn from_hex(s: &str) -> Option<Self> {
		let hex = s.strip_prefix('#').filter(|h| h.len() == 6)?;
		let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
		Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
	}
}

/// Fill colors handed out to cells, in order of first appearance.
pub fn cell_palette() -> Vec<Color> {
	vec![
		Color::rgb(94, 129, 172),  // Steel blue
		Color::rgb(180, 136, 100), // Tan
		Color::rgb(100, 145, 135), // Eucalyptus
		Color::rgb(130, 120, 150), // Wisteria
		Color::rgb(180, 120, 100), // Terracotta
		Color::rgb(119, 158, 165), // Desaturated cyan
		Color::rgb(185, 145, 110), // Amber
		Color::rgb(120, 130, 160), // Periwinkle
		Color::rgb(190, 200, 180), // Sage
		Color::rgb(200, 180, 190), // Dusty rose
	]
}

/// Sizes, colors and interaction limits of the rendered graph.
///
/// Lengths are in graph units unless noted; they grow and shrink with zoom.
#[derive(Clone, Debug)]
pub struct GraphStyle {
	/// Canvas fill behind the graph.
	pub background: Color,
	/// Circumradius of the hexagon drawn for each node.
	pub node_radius: f64,
	/// Outline width in screen pixels.
	pub node_stroke_width: f64,
	/// Link stroke at rest.
	pub link_color: Color,
	/// Link stroke when touching the hovered node.
	pub link_highlight_color: Color,
	/// Link stroke width in screen pixels.
	pub link_width: f64,
	/// Arrowhead length.
	pub arrow_size: f64,
	/// Node label text color.
	pub label_color: Color,
	/// Label font size in screen pixels.
	pub label_size: f64,
	/// Opacity of everything outside the hovered neighbourhood.
	pub highlight_opacity: f64,
	/// Smallest zoom factor the wheel can reach.
	pub min_zoom: f64,
	/// Largest zoom factor the wheel can reach.
	pub max_zoom: f64,
	/// Pointer travel (screen pixels) below which a press-release on a node is a click.
	pub click_tolerance: f64,
}

impl Default for GraphStyle {
	fn default() -> Self {
		Self {
			background: Color::rgb(22, 27, 34),
			node_radius: 14.0,
			node_stroke_width: 1.5,
			link_color: Color::rgba(211, 211, 211, 0.6),
			link_highlight_color: Color::rgb(255, 255, 255),
			link_width: 2.0,
			arrow_size: 8.0,
			label_color: Color::rgba(255, 255, 255, 0.9),
			label_size: 13.0,
			highlight_opacity: 0.2,
			min_zoom: 0.25,
			max_zoom: 8.0,
			click_tolerance: 4.0,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hex_round_trips_through_css() {
		let c = Color::rgb(94, 129, 172);
		assert_eq!(c.to_css(), "#5e81ac");
		assert_eq!(Color::from_hex(&c.to_css_rgb()), Some(c));
	}

	#[test]
	fn translucent_colors_use_rgba() {
		assert_eq!(
			Color::rgb(10, 20, 30).with_alpha(0.5).to_css(),
			"rgba(10, 20, 30, 0.5)"
		);
	}

	#[test]
	fn from_hex_rejects_other_notations() {
		assert_eq!(Color::from_hex("#fff"), None);
		assert_eq!(Color::from_hex("rgb(1, 2, 3)"), None);
		assert_eq!(Color::from_hex("#gg0000"), None);
	}

	#[test]
	fn lighten_and_darken_hit_extremes() {
		let c = Color::rgb(100, 100, 100);
		assert_eq!(c.lighten(1.0), Color::rgb(255, 255, 255));
		assert_eq!(c.darken(1.0), Color::rgb(0, 0, 0));
		assert_eq!(c.lighten(0.0), c);
	}
}
