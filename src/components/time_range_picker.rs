//! Toolbar editing the page-wide observation window.

use leptos::prelude::*;

use crate::time_range::GlobalFilter;

/// Button label and window start of each preset. All presets end `now`.
const PRESETS: &[(&str, &str)] = &[
	("5m", "now - 5 minutes"),
	("15m", "now - 15 minutes"),
	("1h", "now - 1 hour"),
	("6h", "now - 6 hours"),
	("24h", "now - 24 hours"),
	("7d", "now - 7 days"),
];

/// Preset buttons and a refresh button for the `RwSignal<GlobalFilter>` in context.
///
/// Refresh re-publishes the current filter unchanged, which makes every view
/// listening to it fetch again as a user action.
#[component]
pub fn TimeRangePicker() -> impl IntoView {
	let filter = expect_context::<RwSignal<GlobalFilter>>();

	let presets = PRESETS
		.iter()
		.map(|&(label, start)| {
			let is_active = move || filter.with(|f| *f == GlobalFilter::last(start));
			view! {
				<button
					class="preset"
					class:active=is_active
					title=start
					on:click=move |_| filter.set(GlobalFilter::last(start))
				>
					{label}
				</button>
			}
		})
		.collect_view();

	view! {
		<div class="time-range-picker">
			{presets}
			<button class="refresh" on:click=move |_| filter.update(|_| {})>
				"Refresh"
			</button>
			<span class="time-range">
				{move || filter.with(|f| format!("{} to {}", f.start_time, f.end_time))}
			</span>
		</div>
	}
}
