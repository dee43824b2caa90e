//! Fetch bookkeeping for one cell's dependency graph.
//!
//! [`DependencyFetcher`] performs no I/O: callers take a
//! [`FetchTicket`], perform the request however they like, and hand the result
//! back through [`DependencyFetcher::complete`]. Every ticket carries a
//! monotonically increasing sequence number. A result is applied only when its
//! ticket is newer than the last applied one, so responses that resolve out of
//! order cannot overwrite fresher data while overlapping fetches still land.

use std::collections::BTreeSet;

use log::{debug, info, warn};

use crate::color::ColorGenerator;
use crate::components::force_graph::GraphData;
use crate::observability::{CellId, DependencyModel, FetchError};
use crate::time_range::TimeRange;

/// Who asked for a fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interaction {
	/// Mount, filter change or manual refresh. Shows the loading indicator and
	/// notifies on failure.
	User,
	/// Periodic refresh. Silent.
	Background,
}

/// A fetch that has been started and not yet completed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
	/// Position of this fetch in issue order, starting at 1.
	pub seq: u64,
	/// Window the request asks for.
	pub range: TimeRange,
	/// Who started it.
	pub interaction: Interaction,
}

/// What [`DependencyFetcher::complete`] did with a result.
#[derive(Debug)]
pub enum FetchOutcome {
	/// The graph was replaced.
	Applied {
		/// Node count of the new graph.
		nodes: usize,
		/// Link count of the new graph.
		links: usize,
	},
	/// The fetch failed and the previous graph was kept. `notify` is set when
	/// the user should be told.
	Failed {
		/// Whether the failure should be shown to the user.
		notify: bool,
		/// What went wrong.
		error: FetchError,
	},
	/// A newer result was already applied; this one was discarded.
	Superseded {
		/// Sequence number of the discarded ticket.
		seq: u64,
		/// Sequence number of the result on display.
		applied: u64,
	},
}

/// Dependency graph of one cell, as of the newest applied fetch.
#[derive(Debug)]
pub struct DependencyFetcher {
	cell: CellId,
	colors: ColorGenerator,
	graph: GraphData,
	latest_seq: u64,
	applied_seq: u64,
	pending_user: BTreeSet<u64>,
	requested_range: Option<TimeRange>,
	current_range: Option<TimeRange>,
}

impl DependencyFetcher {
	/// Empty graph, nothing in flight.
	pub fn new(cell: CellId) -> Self {
		Self {
			cell,
			colors: ColorGenerator::default(),
			graph: GraphData::default(),
			latest_seq: 0,
			applied_seq: 0,
			pending_user: BTreeSet::new(),
			requested_range: None,
			current_range: None,
		}
	}

	/// The cell whose dependencies are fetched.
	pub fn cell(&self) -> &CellId {
		&self.cell
	}

	/// The graph to display. Empty until the first successful fetch.
	pub fn graph(&self) -> &GraphData {
		&self.graph
	}

	/// Whether some user-initiated fetch is still waiting for a result.
	pub fn is_loading(&self) -> bool {
		!self.pending_user.is_empty()
	}

	/// Window of the displayed graph.
	pub fn current_range(&self) -> Option<TimeRange> {
		self.current_range
	}

	/// Window of the newest request, completed or not.
	pub fn requested_range(&self) -> Option<TimeRange> {
		self.requested_range
	}

	/// Start the first fetch. Counts as a user action.
	pub fn initialize(&mut self, range: TimeRange) -> FetchTicket {
		info!(
			"cell-view: loading dependencies of cell {} over a {}s window",
			self.cell,
			range.duration_ms() / 1_000
		);
		self.refresh(range, Interaction::User)
	}

	/// Start a fetch for `range`.
	pub fn refresh(&mut self, range: TimeRange, interaction: Interaction) -> FetchTicket {
		self.latest_seq += 1;
		self.requested_range = Some(range);
		if interaction == Interaction::User {
			self.pending_user.insert(self.latest_seq);
		}
		debug!(
			"cell-view: fetch #{} for cell {} ({:?})",
			self.latest_seq, self.cell, interaction
		);
		FetchTicket {
			seq: self.latest_seq,
			range,
			interaction,
		}
	}

	/// Feed back the result of the request made for `ticket`.
	pub fn complete(
		&mut self,
		ticket: &FetchTicket,
		result: Result<DependencyModel, FetchError>,
	) -> FetchOutcome {
		self.pending_user.remove(&ticket.seq);

		if ticket.seq <= self.applied_seq {
			match &result {
				Ok(_) => debug!(
					"cell-view: dropping response of fetch #{}, #{} is on display",
					ticket.seq, self.applied_seq
				),
				Err(e) => debug!(
					"cell-view: ignoring failure of fetch #{}, #{} is on display: {}",
					ticket.seq, self.applied_seq, e
				),
			}
			return FetchOutcome::Superseded {
				seq: ticket.seq,
				applied: self.applied_seq,
			};
		}

		match result {
			Ok(model) => {
				self.graph = model.into_graph(&mut self.colors);
				self.applied_seq = ticket.seq;
				self.current_range = Some(ticket.range);
				// Earlier user fetches are answered by this newer graph.
				self.pending_user.retain(|&seq| seq > ticket.seq);
				let (nodes, links) = (self.graph.nodes.len(), self.graph.links.len());
				info!(
					"cell-view: cell {} has {} nodes, {} links",
					self.cell, nodes, links
				);
				FetchOutcome::Applied { nodes, links }
			}
			Err(error) => {
				warn!(
					"cell-view: failed to load dependencies of cell {}: {}",
					self.cell, error
				);
				let newer_user_pending = self.pending_user.iter().any(|&seq| seq > ticket.seq);
				FetchOutcome::Failed {
					notify: ticket.interaction == Interaction::User && !newer_user_pending,
					error,
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fetcher() -> DependencyFetcher {
		DependencyFetcher::new(CellId::new("hr").unwrap())
	}

	fn range(start: i64) -> TimeRange {
		TimeRange::new(start, start + 3_600_000).unwrap()
	}

	fn model(body: &str) -> Result<DependencyModel, FetchError> {
		Ok(serde_json::from_str(body).unwrap())
	}

	const TWO_NODES: &str =
		r#"{"nodes": {"hr": {}, "employee": {}}, "edges": [{"source": "hr", "target": "employee"}]}"#;
	const THREE_NODES: &str = r#"{
		"nodes": {"hr": {}, "employee": {}, "stock": {}},
		"edges": [
			{"source": "hr", "target": "employee"},
			{"source": "hr", "target": "stock"},
			{"source": "employee", "target": "stock"}
		]
	}"#;

	#[test]
	fn success_replaces_graph_wholesale() {
		let mut f = fetcher();
		let t1 = f.initialize(range(0));
		assert!(matches!(
			f.complete(&t1, model(THREE_NODES)),
			FetchOutcome::Applied { nodes: 3, links: 3 }
		));

		let t2 = f.refresh(range(10), Interaction::User);
		assert!(matches!(
			f.complete(&t2, model(TWO_NODES)),
			FetchOutcome::Applied { nodes: 2, links: 1 }
		));
		assert_eq!(f.graph().nodes.len(), 2);
		assert_eq!(f.graph().links.len(), 1);
		assert_eq!(f.current_range(), Some(range(10)));
	}

	#[test]
	fn failure_keeps_previous_graph() {
		let mut f = fetcher();
		let t1 = f.initialize(range(0));
		f.complete(&t1, model(THREE_NODES));
		let before = f.graph().clone();

		let t2 = f.refresh(range(10), Interaction::User);
		let outcome = f.complete(&t2, Err(FetchError::Status(500)));

		assert!(matches!(
			outcome,
			FetchOutcome::Failed {
				notify: true,
				error: FetchError::Status(500)
			}
		));
		assert_eq!(f.graph(), &before);
		assert_eq!(f.current_range(), Some(range(0)));
		assert_eq!(f.requested_range(), Some(range(10)));
		assert!(!f.is_loading());
	}

	#[test]
	fn malformed_payload_keeps_previous_graph() {
		let mut f = fetcher();
		let t1 = f.initialize(range(0));
		f.complete(&t1, model(TWO_NODES));
		let before = f.graph().clone();

		let t2 = f.refresh(range(10), Interaction::User);
		let err = serde_json::from_str::<DependencyModel>("{}").unwrap_err();
		f.complete(&t2, Err(FetchError::Payload(err)));
		assert_eq!(f.graph(), &before);
	}

	#[test]
	fn first_failure_leaves_graph_empty() {
		let mut f = fetcher();
		let t = f.initialize(range(0));
		f.complete(&t, Err(FetchError::Transport("offline".into())));
		assert_eq!(f.graph(), &GraphData::default());
		assert_eq!(f.current_range(), None);
	}

	#[test]
	fn loading_only_for_user_fetches() {
		let mut f = fetcher();
		assert!(!f.is_loading());

		let t = f.initialize(range(0));
		assert!(f.is_loading());
		f.complete(&t, model(TWO_NODES));
		assert!(!f.is_loading());

		let t = f.refresh(range(10), Interaction::Background);
		assert!(!f.is_loading());
		f.complete(&t, model(TWO_NODES));
		assert!(!f.is_loading());

		let t = f.refresh(range(20), Interaction::User);
		assert!(f.is_loading());
		f.complete(&t, Err(FetchError::Status(502)));
		assert!(!f.is_loading());
	}

	#[test]
	fn background_failures_do_not_notify() {
		let mut f = fetcher();
		let t = f.refresh(range(0), Interaction::Background);
		assert!(matches!(
			f.complete(&t, Err(FetchError::Status(503))),
			FetchOutcome::Failed { notify: false, .. }
		));
	}

	#[test]
	fn late_response_of_older_fetch_is_discarded() {
		let mut f = fetcher();
		let first = f.initialize(range(0));
		let second = f.refresh(range(10), Interaction::User);
		assert!(second.seq > first.seq);

		assert!(matches!(
			f.complete(&second, model(TWO_NODES)),
			FetchOutcome::Applied { nodes: 2, .. }
		));
		assert!(!f.is_loading());
		assert!(matches!(
			f.complete(&first, model(THREE_NODES)),
			FetchOutcome::Superseded { seq: 1, applied: 2 }
		));

		assert_eq!(f.graph().nodes.len(), 2);
		assert_eq!(f.current_range(), Some(range(10)));
	}

	#[test]
	fn background_tick_does_not_swallow_user_fetch() {
		let mut f = fetcher();
		let user = f.initialize(range(0));
		let tick = f.refresh(range(0), Interaction::Background);

		assert!(matches!(
			f.complete(&user, model(THREE_NODES)),
			FetchOutcome::Applied { nodes: 3, .. }
		));
		assert!(!f.is_loading());

		assert!(matches!(
			f.complete(&tick, Err(FetchError::Status(503))),
			FetchOutcome::Failed { notify: false, .. }
		));
		assert_eq!(f.graph().nodes.len(), 3);
	}

	#[test]
	fn user_failure_reports_even_with_background_tick_in_flight() {
		let mut f = fetcher();
		let user = f.initialize(range(0));
		let tick = f.refresh(range(0), Interaction::Background);

		assert!(matches!(
			f.complete(&tick, Err(FetchError::Status(503))),
			FetchOutcome::Failed { notify: false, .. }
		));
		assert!(f.is_loading());
		assert!(matches!(
			f.complete(&user, Err(FetchError::Status(500))),
			FetchOutcome::Failed { notify: true, .. }
		));
		assert!(!f.is_loading());
	}

	#[test]
	fn newer_background_result_settles_pending_user_fetch() {
		let mut f = fetcher();
		let user = f.initialize(range(0));
		let tick = f.refresh(range(10), Interaction::Background);

		f.complete(&tick, model(TWO_NODES));
		assert!(!f.is_loading());
		assert!(matches!(
			f.complete(&user, model(THREE_NODES)),
			FetchOutcome::Superseded { seq: 1, applied: 2 }
		));
		assert_eq!(f.graph().nodes.len(), 2);
	}

	#[test]
	fn overlapping_ticks_still_apply() {
		let mut f = fetcher();
		let mut previous = f.refresh(range(0), Interaction::Background);
		for i in 1..=20 {
			let next = f.refresh(range(i), Interaction::Background);
			assert!(matches!(
				f.complete(&previous, model(TWO_NODES)),
				FetchOutcome::Applied { nodes: 2, .. }
			));
			assert_eq!(f.current_range(), Some(range(i - 1)));
			previous = next;
		}
		assert_eq!(f.graph().nodes.len(), 2);
	}

	#[test]
	fn older_user_failure_defers_to_newer_user_fetch() {
		let mut f = fetcher();
		let first = f.initialize(range(0));
		let second = f.refresh(range(10), Interaction::User);

		assert!(matches!(
			f.complete(&first, Err(FetchError::Status(500))),
			FetchOutcome::Failed { notify: false, .. }
		));
		assert!(f.is_loading());
		assert!(matches!(
			f.complete(&second, Err(FetchError::Status(500))),
			FetchOutcome::Failed { notify: true, .. }
		));
		assert!(!f.is_loading());
	}
}
