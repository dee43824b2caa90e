//! Wire format of `GET /dependency-model/cells/{cellId}` and its mapping onto
//! the renderer's [`GraphData`].

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::color::ColorGenerator;
use crate::components::force_graph::{GraphData, GraphLink, GraphNode};

/// Free-form attributes the API attaches to a node.
pub type NodeAttributes = Map<String, Value>;

/// Name of the mesh cell being inspected.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CellId(String);

impl CellId {
	/// Returns `None` for blank names.
	pub fn new(name: impl Into<String>) -> Option<Self> {
		let name = name.into();
		let trimmed = name.trim();
		if trimmed.is_empty() {
			None
		} else if trimmed.len() == name.len() {
			Some(Self(name))
		} else {
			Some(Self(trimmed.to_string()))
		}
	}

	/// The identifier as sent to the API.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for CellId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// An observed call from `source` to `target`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Edge {
	/// Calling node id.
	pub source: String,
	/// Called node id.
	pub target: String,
}

/// Response body of the dependency-model endpoint.
///
/// Only `nodes` and `edges` are read. Both are required; anything else in the
/// body is ignored.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct DependencyModel {
	/// Node id to attributes.
	#[serde(deserialize_with = "deserialize_nodes")]
	pub nodes: BTreeMap<String, NodeAttributes>,
	/// Observed calls, in response order.
	pub edges: Vec<Edge>,
}

/// `nodes` arrives either keyed by id or as a list of objects carrying `id`.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireNodes {
	Keyed(BTreeMap<String, NodeAttributes>),
	Listed(Vec<NodeAttributes>),
}

fn deserialize_nodes<'de, D>(deserializer: D) -> Result<BTreeMap<String, NodeAttributes>, D::Error>
where
	D: Deserializer<'de>,
{
	match WireNodes::deserialize(deserializer)? {
		WireNodes::Keyed(nodes) => Ok(nodes),
		WireNodes::Listed(nodes) => nodes
			.into_iter()
			.map(|attributes| {
				let id = attributes
					.get("id")
					.and_then(Value::as_str)
					.ok_or_else(|| D::Error::custom("node entry without a string `id`"))?
					.to_string();
				Ok((id, attributes))
			})
			.collect(),
	}
}

impl DependencyModel {
	/// Display label of a node: its `name` attribute, falling back to the id.
	pub fn label<'a>(id: &'a str, attributes: &'a NodeAttributes) -> &'a str {
		attributes
			.get("name")
			.and_then(Value::as_str)
			.filter(|name| !name.is_empty())
			.unwrap_or(id)
	}

	/// Map the response onto renderer input.
	///
	/// Every node and every edge is carried over. Nodes come out in id order;
	/// links keep the order the API sent them in.
	pub fn into_graph(self, colors: &mut ColorGenerator) -> GraphData {
		let nodes = self
			.nodes
			.iter()
			.map(|(id, attributes)| GraphNode {
				id: id.clone(),
				label: Self::label(id, attributes).to_string(),
				color: colors.color(id).to_css_rgb(),
			})
			.collect();

		let links = self
			.edges
			.into_iter()
			.map(|Edge { source, target }| GraphLink { source, target })
			.collect();

		GraphData { nodes, links }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(body: &str) -> serde_json::Result<DependencyModel> {
		serde_json::from_str(body)
	}

	#[test]
	fn keyed_nodes_map_onto_graph() {
		let model = parse(
			r#"{
				"nodes": {
					"hr": {"name": "HR cell"},
					"employee": {"name": "Employee"},
					"stock": {}
				},
				"edges": [
					{"source": "hr", "target": "employee", "callCount": 12},
					{"source": "hr", "target": "stock"}
				],
				"generatedAt": 1552651200000
			}"#,
		)
		.unwrap();

		let graph = model.into_graph(&mut ColorGenerator::default());

		let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["employee", "hr", "stock"]);
		let labels: Vec<_> = graph.nodes.iter().map(|n| n.label.as_str()).collect();
		assert_eq!(labels, ["Employee", "HR cell", "stock"]);
		assert_eq!(
			graph.links,
			vec![
				GraphLink {
					source: "hr".into(),
					target: "employee".into(),
				},
				GraphLink {
					source: "hr".into(),
					target: "stock".into(),
				},
			]
		);
	}

	#[test]
	fn listed_nodes_are_keyed_by_id() {
		let model = parse(
			r#"{
				"nodes": [{"id": "a", "name": "Alpha"}, {"id": "b"}],
				"edges": [{"source": "a", "target": "b"}]
			}"#,
		)
		.unwrap();

		assert_eq!(model.nodes.len(), 2);
		assert_eq!(DependencyModel::label("a", &model.nodes["a"]), "Alpha");
		assert_eq!(DependencyModel::label("b", &model.nodes["b"]), "b");
	}

	#[test]
	fn dangling_edges_survive_conversion() {
		let model = parse(r#"{"nodes": {"a": {}}, "edges": [{"source": "a", "target": "ghost"}]}"#)
			.unwrap();
		let graph = model.into_graph(&mut ColorGenerator::default());
		assert_eq!(graph.nodes.len(), 1);
		assert_eq!(graph.links.len(), 1);
	}

	#[test]
	fn colors_are_stable_per_node() {
		let mut colors = ColorGenerator::default();
		let first = parse(r#"{"nodes": {"a": {}, "b": {}}, "edges": []}"#)
			.unwrap()
			.into_graph(&mut colors);
		let second = parse(r#"{"nodes": {"b": {}, "c": {}}, "edges": []}"#)
			.unwrap()
			.into_graph(&mut colors);

		assert_eq!(first.nodes[1].color, second.nodes[0].color);
		assert_ne!(second.nodes[0].color, second.nodes[1].color);
	}

	#[test]
	fn shape_mismatches_are_rejected() {
		assert!(parse(r#"{"edges": []}"#).is_err());
		assert!(parse(r#"{"nodes": {}}"#).is_err());
		assert!(parse(r#"{"nodes": [{"name": "no id"}], "edges": []}"#).is_err());
		assert!(parse(r#"{"nodes": {}, "edges": [{"source": "a"}]}"#).is_err());
		assert!(parse(r#"[]"#).is_err());
	}

	#[test]
	fn blank_cell_names_are_rejected() {
		assert_eq!(CellId::new("  "), None);
		assert_eq!(CellId::new(" hr ").unwrap().as_str(), "hr");
		assert_eq!(CellId::new("hr").unwrap().to_string(), "hr");
	}
}
