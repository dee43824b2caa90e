//! Graph simulation state and interaction tracking.
//!
//! Wraps the `force_graph` physics simulation with per-node metadata, the
//! pan/zoom transform, pointer gestures and the hover neighbourhood.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::types::GraphData;

/// Per-node display metadata attached to each node in the simulation.
#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	pub label: String,
	pub color: String,
}

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%).
	pub k: f64,
}

/// Tracks an in-progress node drag, which may still turn out to be a click.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	/// Set once the pointer leaves the click tolerance.
	pub moved: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// The hovered node and its direct neighbours, in either edge direction.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	hovered: Option<DefaultNodeIdx>,
	neighbourhood: HashSet<DefaultNodeIdx>,
}

impl HighlightState {
	pub fn set_hover(
		&mut self,
		node: Option<DefaultNodeIdx>,
		edges: &[(DefaultNodeIdx, DefaultNodeIdx)],
	) {
		if self.hovered == node {
			return;
		}

		self.hovered = node;
		self.neighbourhood.clear();

		if let Some(idx) = node {
			self.neighbourhood.insert(idx);
			for &(src, tgt) in edges {
				if src == idx {
					self.neighbourhood.insert(tgt);
				} else if tgt == idx {
					self.neighbourhood.insert(src);
				}
			}
		}
	}

	pub fn hovered(&self) -> Option<DefaultNodeIdx> {
		self.hovered
	}

	pub fn is_active(&self) -> bool {
		self.hovered.is_some()
	}

	pub fn contains(&self, idx: DefaultNodeIdx) -> bool {
		self.neighbourhood.contains(&idx)
	}

	/// An edge is highlighted when it touches the hovered node.
	pub fn edge_highlighted(&self, a: DefaultNodeIdx, b: DefaultNodeIdx) -> bool {
		self.hovered.is_some_and(|h| h == a || h == b)
	}
}

/// Core graph state combining physics simulation with interaction tracking.
///
/// Created when the canvas mounts and mutated each frame by the animation
/// loop. New data goes through [`reload`](Self::reload), which rebuilds the
/// simulation but keeps nodes that are still present where they were.
pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub highlight: HighlightState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	index: HashMap<String, DefaultNodeIdx>,
	edges: Vec<(DefaultNodeIdx, DefaultNodeIdx)>,
}

/// Position and pinned flag carried across a reload.
type Placement = (f32, f32, bool);

impl ForceGraphState {
	pub fn new(data: &GraphData, width: f64, height: f64) -> Self {
		let mut state = Self {
			graph: simulation(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			highlight: HighlightState::default(),
			width,
			height,
			animation_running: true,
			index: HashMap::new(),
			edges: Vec::new(),
		};
		state.populate(data, &HashMap::new());
		state
	}

	/// Replace the graph contents. The view transform is left alone.
	pub fn reload(&mut self, data: &GraphData) {
		let mut previous: HashMap<String, Placement> = HashMap::new();
		self.graph.visit_nodes(|node| {
			previous.insert(
				node.data.user_data.id.clone(),
				(node.x(), node.y(), node.data.is_anchor),
			);
		});

		self.graph = simulation();
		self.index.clear();
		self.edges.clear();
		self.highlight = HighlightState::default();
		self.drag = DragState::default();
		self.animation_running = true;
		self.populate(data, &previous);
	}

	fn populate(&mut self, data: &GraphData, previous: &HashMap<String, Placement>) {
		let count = data.nodes.len().max(1) as f64;
		for (i, node) in data.nodes.iter().enumerate() {
			let (x, y, is_anchor) = previous.get(&node.id).copied().unwrap_or_else(|| {
				let angle = (i as f64) * 2.0 * PI / count;
				((100.0 * angle.cos()) as f32, (100.0 * angle.sin()) as f32, false)
			});
			let idx = self.graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor,
				user_data: NodeInfo {
					id: node.id.clone(),
					label: node.label.clone(),
					color: node.color.clone(),
				},
			});
			self.index.insert(node.id.clone(), idx);
		}

		for link in &data.links {
			if let (Some(&src), Some(&tgt)) =
				(self.index.get(&link.source), self.index.get(&link.target))
			{
				self.graph.add_edge(src, tgt, EdgeData::default());
				self.edges.push((src, tgt));
			}
		}
	}

	#[cfg(test)]
	fn node_count(&self) -> usize {
		self.index.len()
	}

	/// Number of links whose endpoints both exist.
	#[cfg(test)]
	fn edge_count(&self) -> usize {
		self.edges.len()
	}

	pub fn node_id(&self, idx: DefaultNodeIdx) -> Option<String> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some(node.data.user_data.id.clone());
			}
		});
		found
	}

	#[cfg(test)]
	fn node_index(&self, id: &str) -> Option<DefaultNodeIdx> {
		self.index.get(id).copied()
	}

	#[cfg(test)]
	fn node_position(&self, id: &str) -> Option<(f32, f32)> {
		let idx = self.node_index(id)?;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x(), node.y()));
			}
		});
		found
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node within `radius` graph units of the screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64, radius: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if (dx * dx + dy * dy).sqrt() < radius {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		self.highlight.set_hover(node, &self.edges);
	}

	/// Zoom by `factor` around a fixed screen point, keeping `k` within bounds.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64, min_k: f64, max_k: f64) {
		let new_k = (self.transform.k * factor).clamp(min_k, max_k);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

fn simulation() -> ForceGraph<NodeInfo, ()> {
	ForceGraph::new(SimulationParameters {
		force_charge: 150.0,
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	})
}
