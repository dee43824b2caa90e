//! Loading overlay and transient notifications shared by the whole page.
//!
//! [`NotificationState`] holds the data; [`NotificationCenter`] wraps it in a
//! signal, provides it as context and schedules auto-dismissal;
//! [`NotificationOverlay`] draws it.

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;

use crate::time_range::timer_delay;

/// Severity of a notification, mapped onto a CSS class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
	/// Neutral information.
	Info,
	/// Something completed.
	Success,
	/// Something degraded.
	Warning,
	/// Something failed.
	Error,
}

impl Level {
	/// Classes applied to the notification element.
	pub fn css_class(self) -> &'static str {
		match self {
			Level::Info => "notification info",
			Level::Success => "notification success",
			Level::Warning => "notification warning",
			Level::Error => "notification error",
		}
	}
}

/// One visible notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
	/// Unique within the page.
	pub id: u64,
	/// Severity.
	pub level: Level,
	/// Text shown to the user.
	pub message: String,
}

/// Overlay holders and the visible notifications.
///
/// The overlay is keyed by owner so independent views can hold it at the same
/// time; it stays up until the last owner releases it and shows the message of
/// the most recent holder.
#[derive(Clone, Debug, Default)]
pub struct NotificationState {
	overlay: Vec<(String, String)>,
	notifications: Vec<Notification>,
	next_id: u64,
}

impl NotificationState {
	/// Show the overlay with `message` on behalf of `owner`.
	pub fn hold_overlay(&mut self, owner: &str, message: &str) {
		self.overlay.retain(|(o, _)| o != owner);
		self.overlay.push((owner.to_string(), message.to_string()));
	}

	/// Drop `owner`'s hold on the overlay.
	pub fn release_overlay(&mut self, owner: &str) {
		self.overlay.retain(|(o, _)| o != owner);
	}

	/// Text of the overlay, `None` when hidden.
	pub fn overlay_message(&self) -> Option<&str> {
		self.overlay.last().map(|(_, message)| message.as_str())
	}

	/// Add a notification and return its id.
	pub fn push(&mut self, level: Level, message: impl Into<String>) -> u64 {
		self.next_id += 1;
		self.notifications.push(Notification {
			id: self.next_id,
			level,
			message: message.into(),
		});
		self.next_id
	}

	/// Remove a notification. Unknown ids are ignored.
	pub fn dismiss(&mut self, id: u64) {
		self.notifications.retain(|n| n.id != id);
	}

	/// Visible notifications, oldest first.
	pub fn notifications(&self) -> &[Notification] {
		&self.notifications
	}
}

/// Reactive handle to the page's [`NotificationState`].
#[derive(Clone, Copy)]
pub struct NotificationCenter {
	state: RwSignal<NotificationState>,
	timeout_ms: u32,
}

impl NotificationCenter {
	/// Notifications disappear after `timeout_ms`; `0` keeps them until clicked.
	pub fn new(timeout_ms: u32) -> Self {
		Self {
			state: RwSignal::new(NotificationState::default()),
			timeout_ms,
		}
	}

	/// Hold the loading overlay for `owner`.
	pub fn show_loading_overlay(&self, owner: &str, message: &str) {
		self.state.try_update(|s| s.hold_overlay(owner, message));
	}

	/// Release `owner`'s hold on the loading overlay.
	pub fn hide_loading_overlay(&self, owner: &str) {
		self.state.try_update(|s| s.release_overlay(owner));
	}

	/// Reactive read of the overlay text.
	pub fn overlay_message(&self) -> Option<String> {
		self.state.with(|s| s.overlay_message().map(str::to_string))
	}

	/// Reactive read of the visible notifications.
	pub fn notifications(&self) -> Vec<Notification> {
		self.state.with(|s| s.notifications().to_vec())
	}

	/// Show `message` and schedule its dismissal.
	pub fn show_notification(&self, message: impl Into<String>, level: Level) {
		let Some(id) = self.state.try_update(|s| s.push(level, message)) else {
			return;
		};
		if self.timeout_ms > 0 {
			self.dismiss_after(id, self.timeout_ms);
		}
	}

	/// Remove a notification before its timeout.
	pub fn dismiss(&self, id: u64) {
		self.state.try_update(|s| s.dismiss(id));
	}

	fn dismiss_after(&self, id: u64, ms: u32) {
		let center = *self;
		let cb = Closure::once_into_js(move || center.dismiss(id));
		let scheduled = web_sys::window().map(|w| {
			w.set_timeout_with_callback_and_timeout_and_arguments_0(
				cb.unchecked_ref(),
				timer_delay(ms),
			)
		});
		if !matches!(scheduled, Some(Ok(_))) {
			warn!("cell-view: could not schedule dismissal of notification {}", id);
		}
	}
}

/// Spinner overlay plus the stack of notifications. Click a notification to
/// dismiss it.
#[component]
pub fn NotificationOverlay() -> impl IntoView {
	let center = expect_context::<NotificationCenter>();

	view! {
		<Show when=move || center.overlay_message().is_some()>
			<div class="loading-overlay">
				<div class="spinner"></div>
				<span>{move || center.overlay_message().unwrap_or_default()}</span>
			</div>
		</Show>
		<ul class="notifications">
			<For
				each=move || center.notifications()
				key=|n| n.id
				children=move |n: Notification| {
					let id = n.id;
					view! {
						<li class=n.level.css_class() on:click=move |_| center.dismiss(id)>
							{n.message}
						</li>
					}
				}
			/>
		</ul>
	}
}
