//! Graph data structures for input to the force graph component.

/// A node in the graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in links.
	pub id: String,
	/// Text drawn beside the node.
	pub label: String,
	/// CSS fill color (`#rrggbb`).
	pub color: String,
}

/// A directed edge between two nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphLink {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
}

/// Complete graph data: nodes and links.
///
/// Links may name ids absent from `nodes`; the renderer skips those.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphData {
	/// All nodes to display.
	pub nodes: Vec<GraphNode>,
	/// Directed edges between nodes.
	pub links: Vec<GraphLink>,
}
