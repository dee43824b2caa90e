//! HTTP access to the observability API through the browser's `fetch`.

use log::debug;
use url::Url;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

use super::error::FetchError;
use super::model::{CellId, DependencyModel};
use super::query::dependency_model_url;
use crate::time_range::TimeRange;

/// Issues requests against one observability API deployment.
#[derive(Clone, Debug)]
pub struct ObservabilityClient {
	base_url: Url,
	access_token: Option<String>,
}

impl ObservabilityClient {
	/// `access_token`, when set, is sent as a bearer token.
	pub fn new(base_url: Url, access_token: Option<String>) -> Self {
		Self {
			base_url,
			access_token,
		}
	}

	/// Root every request path is appended to.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Fetch the dependency model of `cell` observed within `range`.
	pub async fn dependency_model(
		&self,
		cell: &CellId,
		range: &TimeRange,
	) -> Result<DependencyModel, FetchError> {
		let url = dependency_model_url(&self.base_url, cell, range)?;
		debug!("cell-view: GET {}", url);
		let (status, body) = self.get_text(url.as_str()).await?;
		decode_response(status, &body)
	}

	async fn get_text(&self, url: &str) -> Result<(u16, String), FetchError> {
		let opts = RequestInit::new();
		opts.set_method("GET");
		opts.set_mode(RequestMode::Cors);

		let headers = Headers::new().map_err(transport)?;
		headers.set("Accept", "application/json").map_err(transport)?;
		if let Some(token) = &self.access_token {
			headers
				.set("Authorization", &format!("Bearer {}", token))
				.map_err(transport)?;
		}
		opts.set_headers(&headers);

		let request = Request::new_with_str_and_init(url, &opts).map_err(transport)?;
		let window = web_sys::window().ok_or_else(|| FetchError::Transport("no window".into()))?;
		let response: Response = JsFuture::from(window.fetch_with_request(&request))
			.await
			.map_err(transport)?
			.dyn_into()
			.map_err(|_| FetchError::Transport("fetch did not resolve to a Response".into()))?;

		let body = JsFuture::from(response.text().map_err(transport)?)
			.await
			.map_err(transport)?
			.as_string()
			.unwrap_or_default();

		Ok((response.status(), body))
	}
}

fn transport(err: wasm_bindgen::JsValue) -> FetchError {
	FetchError::Transport(format!("{:?}", err))
}

/// Turn a raw status and body into a model, classifying the failure.
pub fn decode_response(status: u16, body: &str) -> Result<DependencyModel, FetchError> {
	if !(200..300).contains(&status) {
		return Err(FetchError::Status(status));
	}
	Ok(serde_json::from_str(body)?)
}
