//! Dependency graph of one cell, following the page's global filter.
//!
//! The view fetches on mount, again whenever the global filter is published,
//! and optionally on a timer. Results go through a [`DependencyFetcher`], so
//! only the newest request can change what is drawn and a failed request
//! leaves the previous graph on screen.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::warn;
use wasm_bindgen::prelude::*;

use super::force_graph::{ForceGraphCanvas, GraphData};
use crate::fetcher::{DependencyFetcher, FetchOutcome, Interaction};
use crate::notifications::{Level, NotificationCenter};
use crate::observability::{CellId, ObservabilityClient};
use crate::time_range::{GlobalFilter, now_ms, timer_delay};

const LOADING_MESSAGE: &str = "Loading Cell Dependency Graph";
const FAILURE_MESSAGE: &str = "Failed to load cell dependency view";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Trigger {
	Mount,
	FilterChange,
	Timer,
}

impl Trigger {
	fn interaction(self) -> Interaction {
		match self {
			Trigger::Mount | Trigger::FilterChange => Interaction::User,
			Trigger::Timer => Interaction::Background,
		}
	}
}

/// What the page does once a fetch has completed.
#[derive(Debug, PartialEq, Eq)]
struct Reaction {
	/// Push the fetcher's graph to the canvas.
	publish_graph: bool,
	/// Error notification to show.
	notice: Option<&'static str>,
	/// Loading overlay text, `None` to release it.
	overlay: Option<&'static str>,
}

fn react(outcome: &FetchOutcome, loading: bool) -> Reaction {
	Reaction {
		publish_graph: matches!(outcome, FetchOutcome::Applied { .. }),
		notice: match outcome {
			FetchOutcome::Failed { notify: true, .. } => Some(FAILURE_MESSAGE),
			_ => None,
		},
		overlay: overlay_text(loading),
	}
}

fn overlay_text(loading: bool) -> Option<&'static str> {
	loading.then_some(LOADING_MESSAGE)
}

/// Everything a fetch needs, shared between the filter effect and the timer.
#[derive(Clone)]
struct Loader {
	cell: CellId,
	client: Rc<ObservabilityClient>,
	fetcher: Rc<RefCell<DependencyFetcher>>,
	graph: RwSignal<GraphData>,
	notifications: NotificationCenter,
	overlay_owner: Rc<str>,
}

impl Loader {
	fn start(&self, filter: &GlobalFilter, trigger: Trigger) {
		let interaction = trigger.interaction();
		let range = match filter.resolve(now_ms()) {
			Ok(range) => range,
			Err(e) => {
				warn!("cell-view: not fetching cell {}: {}", self.cell, e);
				if interaction == Interaction::User {
					self.notifications
						.show_notification(format!("Invalid time range: {}", e), Level::Error);
				}
				return;
			}
		};

		let ticket = {
			let mut fetcher = self.fetcher.borrow_mut();
			match trigger {
				Trigger::Mount => fetcher.initialize(range),
				Trigger::FilterChange | Trigger::Timer => fetcher.refresh(range, interaction),
			}
		};
		self.sync_overlay();

		let loader = self.clone();
		spawn_local(async move {
			let result = loader.client.dependency_model(&loader.cell, &ticket.range).await;
			let reaction = {
				let mut fetcher = loader.fetcher.borrow_mut();
				let outcome = fetcher.complete(&ticket, result);
				react(&outcome, fetcher.is_loading())
			};
			if reaction.publish_graph {
				let data = loader.fetcher.borrow().graph().clone();
				loader.graph.set(data);
			}
			if let Some(notice) = reaction.notice {
				loader.notifications.show_notification(notice, Level::Error);
			}
			loader.show_overlay(reaction.overlay);
		});
	}

	fn sync_overlay(&self) {
		let loading = self.fetcher.borrow().is_loading();
		self.show_overlay(overlay_text(loading));
	}

	fn show_overlay(&self, text: Option<&str>) {
		match text {
			Some(text) => self
				.notifications
				.show_loading_overlay(&self.overlay_owner, text),
			None => self.notifications.hide_loading_overlay(&self.overlay_owner),
		}
	}
}

/// Fetches and draws the dependency graph of `cell`.
///
/// Expects a [`NotificationCenter`] and an `RwSignal<GlobalFilter>` in context.
/// With `refresh_interval_ms` set, the graph is also refreshed in the
/// background; those refreshes show no loading indicator and fail silently.
#[component]
pub fn CellDependencyView(
	cell: CellId,
	client: ObservabilityClient,
	#[prop(default = None)] refresh_interval_ms: Option<u32>,
	#[prop(optional)] on_node_click: Option<Callback<String>>,
) -> impl IntoView {
	let notifications = expect_context::<NotificationCenter>();
	let filter = expect_context::<RwSignal<GlobalFilter>>();
	let graph = RwSignal::new(GraphData::default());
	let overlay_owner = format!("cell-dependency-view:{}", cell);

	let loader = Loader {
		fetcher: Rc::new(RefCell::new(DependencyFetcher::new(cell.clone()))),
		cell,
		client: Rc::new(client),
		graph,
		notifications,
		overlay_owner: overlay_owner.as_str().into(),
	};

	let on_filter = loader.clone();
	Effect::new(move |mounted: Option<()>| {
		let current = filter.get();
		let trigger = if mounted.is_none() {
			Trigger::Mount
		} else {
			Trigger::FilterChange
		};
		on_filter.start(&current, trigger);
	});

	if let Some(ms) = refresh_interval_ms {
		let on_tick = loader.clone();
		let tick = Closure::<dyn FnMut()>::new(move || {
			on_tick.start(&filter.get_untracked(), Trigger::Timer);
		})
		.into_js_value();
		let handle = web_sys::window().map(|w| {
			w.set_interval_with_callback_and_timeout_and_arguments_0(
				tick.unchecked_ref(),
				timer_delay(ms),
			)
		});
		match handle {
			Some(Ok(handle)) => on_cleanup(move || {
				if let Some(w) = web_sys::window() {
					w.clear_interval_with_handle(handle);
				}
			}),
			_ => warn!("cell-view: could not start background refresh"),
		}
	}

	on_cleanup(move || notifications.hide_loading_overlay(&overlay_owner));

	let stats = move || {
		graph.with(|g| format!("{} nodes, {} links", g.nodes.len(), g.links.len()))
	};

	view! {
		<div class="cell-dependency-view">
			<ForceGraphCanvas data=graph fullscreen=true on_node_click=on_node_click />
			<p class="graph-stats">{stats}</p>
		</div>
	}
}
