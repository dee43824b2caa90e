//! Page configuration.
//!
//! The hosting page embeds a JSON object in
//! `<script id="app-config" type="application/json">`. Every field is
//! optional. The page's query string may then override the inspected cell
//! (`?cell=`) and the initial window (`?from=`, `?to=`).

use log::warn;
use serde::Deserialize;
use thiserror::Error;
use url::Url;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

use crate::observability::{CellId, ObservabilityClient};
use crate::time_range::GlobalFilter;

/// Why the page configuration could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The embedded configuration is not valid JSON for [`AppConfig`].
	#[error("invalid configuration JSON: {0}")]
	Json(#[from] serde_json::Error),
	/// `observability_url` does not resolve to an absolute URL.
	#[error("invalid observability URL {url:?}: {source}")]
	Url {
		/// The configured value.
		url: String,
		/// Parser error.
		#[source]
		source: url::ParseError,
	},
}

/// Settings of the page, with defaults for everything.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
	/// Base URL of the observability API, absolute or relative to the page origin.
	pub observability_url: String,
	/// Cell to inspect.
	pub cell: Option<String>,
	/// Sent as a bearer token with every API request.
	pub access_token: Option<String>,
	/// Initial start of the global filter, as a time expression.
	pub start_time: String,
	/// Initial end of the global filter, as a time expression.
	pub end_time: String,
	/// Background refresh period. Absent or zero disables it.
	pub refresh_interval_secs: Option<u32>,
	/// Lifetime of a notification; zero keeps notifications until clicked.
	pub notification_timeout_ms: u32,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			observability_url: "/api".into(),
			cell: None,
			access_token: None,
			start_time: "now - 24 hours".into(),
			end_time: "now".into(),
			refresh_interval_secs: None,
			notification_timeout_ms: 5_000,
		}
	}
}

impl AppConfig {
	/// Parse the embedded configuration object.
	pub fn from_json(text: &str) -> Result<Self, ConfigError> {
		Ok(serde_json::from_str(text)?)
	}

	/// Apply `cell`, `from` and `to` from a query string (leading `?` optional).
	/// Empty values are ignored.
	pub fn apply_query(&mut self, search: &str) {
		let query = search.strip_prefix('?').unwrap_or(search);
		for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
			if value.trim().is_empty() {
				continue;
			}
			match key.as_ref() {
				"cell" => self.cell = Some(value.into_owned()),
				"from" => self.start_time = value.into_owned(),
				"to" => self.end_time = value.into_owned(),
				_ => {}
			}
		}
	}

	/// The configured cell, if any and not blank.
	pub fn cell_id(&self) -> Option<CellId> {
		self.cell.clone().and_then(CellId::new)
	}

	/// Initial observation window.
	pub fn global_filter(&self) -> GlobalFilter {
		GlobalFilter {
			start_time: self.start_time.clone(),
			end_time: self.end_time.clone(),
		}
	}

	/// Background refresh period in milliseconds, if enabled.
	pub fn refresh_interval_ms(&self) -> Option<u32> {
		self.refresh_interval_secs
			.filter(|&secs| secs > 0)
			.map(|secs| secs.saturating_mul(1_000))
	}

	/// Resolve `observability_url` against the page origin.
	pub fn api_base(&self, origin: &str) -> Result<Url, ConfigError> {
		let url_error = |source| ConfigError::Url {
			url: self.observability_url.clone(),
			source,
		};
		match Url::parse(&self.observability_url) {
			Ok(url) => Ok(url),
			Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(origin)
				.and_then(|base| base.join(&self.observability_url))
				.map_err(url_error),
			Err(e) => Err(url_error(e)),
		}
	}

	/// API client for the configured deployment.
	pub fn client(&self, origin: &str) -> Result<ObservabilityClient, ConfigError> {
		Ok(ObservabilityClient::new(
			self.api_base(origin)?,
			self.access_token.clone(),
		))
	}

	/// Read the embedded configuration and the page query string.
	///
	/// A missing or malformed configuration element falls back to defaults.
	pub fn load() -> Self {
		let window = web_sys::window();
		let mut config = match window.as_ref().and_then(embedded_config) {
			Some(text) => Self::from_json(&text).unwrap_or_else(|e| {
				warn!("cell-view: {}, using defaults", e);
				Self::default()
			}),
			None => {
				warn!("cell-view: no #app-config element, using defaults");
				Self::default()
			}
		};
		if let Some(search) = window.and_then(|w| w.location().search().ok()) {
			config.apply_query(&search);
		}
		config
	}
}

fn embedded_config(window: &Window) -> Option<String> {
	let element = window.document()?.get_element_by_id("app-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Origin of the current page, e.g. `https://dashboard.example`.
pub fn page_origin() -> Option<String> {
	web_sys::window()?.location().origin().ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_fields_take_defaults() {
		let config = AppConfig::from_json(r#"{"cell": "hr"}"#).unwrap();
		assert_eq!(config.cell.as_deref(), Some("hr"));
		assert_eq!(config.observability_url, "/api");
		assert_eq!(config.start_time, "now - 24 hours");
		assert_eq!(config.end_time, "now");
		assert_eq!(config.refresh_interval_ms(), None);
		assert_eq!(config.notification_timeout_ms, 5_000);
	}

	#[test]
	fn full_config_parses() {
		let config = AppConfig::from_json(
			r#"{
				"observability_url": "http://localhost:9123/api",
				"cell": "stock",
				"access_token": "t0ken",
				"start_time": "now - 1 hour",
				"end_time": "now",
				"refresh_interval_secs": 30,
				"notification_timeout_ms": 0
			}"#,
		)
		.unwrap();
		assert_eq!(config.refresh_interval_ms(), Some(30_000));
		assert_eq!(config.access_token.as_deref(), Some("t0ken"));
		assert_eq!(config.notification_timeout_ms, 0);
	}

	#[test]
	fn malformed_json_is_an_error() {
		assert!(matches!(
			AppConfig::from_json("{cell: hr}"),
			Err(ConfigError::Json(_))
		));
		assert!(AppConfig::from_json(r#"{"refresh_interval_secs": "soon"}"#).is_err());
	}

	#[test]
	fn zero_interval_disables_refresh() {
		let config = AppConfig {
			refresh_interval_secs: Some(0),
			..AppConfig::default()
		};
		assert_eq!(config.refresh_interval_ms(), None);
	}

	#[test]
	fn query_overrides_cell_and_window() {
		let mut config = AppConfig::default();
		config.apply_query("?cell=my%20cell&from=now%20-%201%20hour&to=&debug=1");
		assert_eq!(config.cell.as_deref(), Some("my cell"));
		assert_eq!(config.start_time, "now - 1 hour");
		assert_eq!(config.end_time, "now");
		assert_eq!(
			config.global_filter(),
			GlobalFilter {
				start_time: "now - 1 hour".into(),
				end_time: "now".into(),
			}
		);
	}

	#[test]
	fn blank_cell_means_none() {
		let config = AppConfig {
			cell: Some("   ".into()),
			..AppConfig::default()
		};
		assert_eq!(config.cell_id(), None);
	}

	#[test]
	fn relative_api_url_resolves_against_origin() {
		let config = AppConfig::default();
		assert_eq!(
			config.api_base("https://dashboard.example").unwrap().as_str(),
			"https://dashboard.example/api"
		);

		let absolute = AppConfig {
			observability_url: "http://localhost:9123/api".into(),
			..AppConfig::default()
		};
		assert_eq!(
			absolute.api_base("https://ignored.example").unwrap().as_str(),
			"http://localhost:9123/api"
		);
	}

	#[test]
	fn unusable_api_url_is_an_error() {
		let config = AppConfig {
			observability_url: "http://[::1".into(),
			..AppConfig::default()
		};
		assert!(matches!(
			config.api_base("https://dashboard.example"),
			Err(ConfigError::Url { .. })
		));

		let no_origin = AppConfig::default();
		assert!(no_origin.api_base("").is_err());
	}
}
