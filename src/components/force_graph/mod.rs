//! Force-directed graph visualization component.
//!
//! Renders an interactive force-directed graph on an HTML canvas with:
//! - Physics-based node positioning via force simulation
//! - Pan, zoom, node dragging and node clicks
//! - Hexagonal nodes and directed, arrow-headed links
//! - Highlight of the hovered node's direct neighbourhood
//!
//! # Example
//!
//! ```ignore
//! use cell_view::{ForceGraphCanvas, GraphData, GraphNode, GraphLink};
//!
//! let data = GraphData {
//!     nodes: vec![
//!         GraphNode { id: "a".into(), label: "Node A".into(), color: "#5e81ac".into() },
//!         GraphNode { id: "b".into(), label: "Node B".into(), color: "#b48864".into() },
//!     ],
//!     links: vec![
//!         GraphLink { source: "a".into(), target: "b".into() },
//!     ],
//! };
//!
//! view! { <ForceGraphCanvas data=data.into() fullscreen=true /> }
//! ```

mod component;
mod render;
mod state;
pub mod theme;
mod types;

pub use component::ForceGraphCanvas;
pub use theme::{Color, GraphStyle};
pub use types::{GraphData, GraphLink, GraphNode};
