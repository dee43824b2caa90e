//! Client side of the observability API's dependency-model endpoint.
//!
//! - [`model`]: wire types of the response and their conversion into [`GraphData`](crate::GraphData)
//! - [`query`]: request URL construction
//! - [`client`]: the HTTP call itself
//! - [`error`]: what can go wrong along the way

pub mod client;
pub mod error;
pub mod model;
pub mod query;

pub use client::ObservabilityClient;
pub use error::FetchError;
pub use model::{CellId, DependencyModel, Edge, NodeAttributes};
