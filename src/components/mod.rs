//! Leptos components of the cell dependency page.

pub mod cell_dependency_view;
pub mod force_graph;
pub mod time_range_picker;
