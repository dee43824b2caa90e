//! Stable color assignment for graph nodes.

use std::collections::HashMap;

use crate::components::force_graph::theme::{Color, cell_palette};

/// Hands out one color per key and remembers it.
///
/// Keys get palette entries in order of first appearance. Once the palette is
/// exhausted it is reused in successively lighter variants, so a cell keeps
/// its color across refreshes and no two of the first `palette.len()` keys
/// collide.
#[derive(Clone, Debug)]
pub struct ColorGenerator {
	palette: Vec<Color>,
	assigned: HashMap<String, Color>,
}

impl Default for ColorGenerator {
	fn default() -> Self {
		Self::new(cell_palette())
	}
}

impl ColorGenerator {
	/// Falls back to a neutral gray when `palette` is empty.
	pub fn new(palette: Vec<Color>) -> Self {
		let palette = if palette.is_empty() {
			vec![Color::rgb(211, 211, 211)]
		} else {
			palette
		};
		Self {
			palette,
			assigned: HashMap::new(),
		}
	}

	/// Color of `key`, assigning the next one on first sight.
	pub fn color(&mut self, key: &str) -> Color {
		if let Some(&color) = self.assigned.get(key) {
			return color;
		}
		let n = self.assigned.len();
		let base = self.palette[n % self.palette.len()];
		let round = (n / self.palette.len()) % 4;
		let color = base.lighten(0.18 * round as f64);
		self.assigned.insert(key.to_string(), color);
		color
	}

	#[cfg(test)]
	fn len(&self) -> usize {
		self.assigned.len()
	}
}
