//! cell-view: dependency graph of a service-mesh cell.
//!
//! This crate provides a WASM-based page that asks the observability API for
//! the dependency model of one cell over a time window and renders it as an
//! interactive force-directed graph, with loading and error notifications.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, error, info};

pub mod color;
pub mod components;
pub mod config;
pub mod fetcher;
pub mod notifications;
pub mod observability;
pub mod time_range;

pub use components::cell_dependency_view::CellDependencyView;
pub use components::force_graph::{ForceGraphCanvas, GraphData, GraphLink, GraphNode};
pub use config::AppConfig;
pub use fetcher::{DependencyFetcher, FetchOutcome, FetchTicket, Interaction};
pub use time_range::{GlobalFilter, TimeRange};

use components::time_range_picker::TimeRangePicker;
use notifications::{NotificationCenter, NotificationOverlay};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("cell-view: logging initialized");
}

/// Main application component.
/// Reads the page configuration and renders the dependency view of the configured cell.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = AppConfig::load();
	let notifications = NotificationCenter::new(config.notification_timeout_ms);
	provide_context(notifications);
	provide_context(RwSignal::new(config.global_filter()));

	let selected = RwSignal::new(None::<String>);
	let on_node_click = Callback::new(move |id: String| {
		info!("cell-view: selected {}", id);
		selected.set(Some(id));
	});

	let origin = config::page_origin().unwrap_or_default();
	let title = config
		.cell
		.clone()
		.unwrap_or_else(|| "No cell selected".to_string());

	let body = match (config.cell_id(), config.client(&origin)) {
		(Some(cell), Ok(client)) => view! {
			<CellDependencyView
				cell=cell
				client=client
				refresh_interval_ms=config.refresh_interval_ms()
				on_node_click=on_node_click
			/>
		}
		.into_any(),
		(None, _) => view! {
			<p class="empty-state">"Open this page with ?cell=<name> to inspect a cell."</p>
		}
		.into_any(),
		(_, Err(e)) => {
			error!("cell-view: {}", e);
			view! { <p class="empty-state">"The observability API address is misconfigured."</p> }
				.into_any()
		}
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text=format!("{} | Cell Dependencies", title) />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			{body}
			<div class="graph-overlay">
				<h1>{title}</h1>
				<p class="subtitle">"Hover a cell to see its dependencies. Drag to reposition, scroll to zoom."</p>
				<TimeRangePicker />
				{move || {
					selected
						.get()
						.map(|id| view! { <p class="selected-node">"Selected: " {id}</p> })
				}}
			</div>
			<NotificationOverlay />
		</div>
	}
}
