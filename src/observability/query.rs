//! Request URL for the dependency-model endpoint.

use url::Url;

use super::error::FetchError;
use super::model::CellId;
use crate::time_range::TimeRange;

/// `{base}/dependency-model/cells/{cell}?fromTime={ms}&toTime={ms}`
///
/// The cell name is percent-encoded as a single path segment, so names
/// containing `/` or `?` cannot escape it. Any query already present on the
/// base is dropped.
pub fn dependency_model_url(
	base: &Url,
	cell: &CellId,
	range: &TimeRange,
) -> Result<Url, FetchError> {
	let mut url = base.clone();
	url.set_query(None);
	url.set_fragment(None);

	url.path_segments_mut()
		.map_err(|_| FetchError::BaseUrl(base.to_string()))?
		.pop_if_empty()
		.extend(["dependency-model", "cells", cell.as_str()]);

	url.query_pairs_mut()
		.append_pair("fromTime", &range.start_ms.to_string())
		.append_pair("toTime", &range.end_ms.to_string());

	Ok(url)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn range() -> TimeRange {
		TimeRange::new(1_552_564_800_000, 1_552_651_200_000).unwrap()
	}

	fn cell(name: &str) -> CellId {
		CellId::new(name).unwrap()
	}

	#[test]
	fn builds_endpoint_under_base_path() {
		let base = Url::parse("http://localhost:9123/api").unwrap();
		let url = dependency_model_url(&base, &cell("hr"), &range()).unwrap();
		assert_eq!(
			url.as_str(),
			"http://localhost:9123/api/dependency-model/cells/hr?fromTime=1552564800000&toTime=1552651200000"
		);
	}

	#[test]
	fn trailing_slash_and_stale_query_are_ignored() {
		let base = Url::parse("https://dashboard.example/api/?debug=1#top").unwrap();
		let url = dependency_model_url(&base, &cell("hr"), &range()).unwrap();
		assert_eq!(url.path(), "/api/dependency-model/cells/hr");
		assert_eq!(url.query(), Some("fromTime=1552564800000&toTime=1552651200000"));
		assert_eq!(url.fragment(), None);
	}

	#[test]
	fn cell_name_stays_one_segment() {
		let base = Url::parse("http://localhost:9123").unwrap();
		let url = dependency_model_url(&base, &cell("a/b?c"), &range()).unwrap();
		assert_eq!(url.path(), "/dependency-model/cells/a%2Fb%3Fc");
	}

	#[test]
	fn opaque_base_is_rejected() {
		let base = Url::parse("mailto:ops@example.com").unwrap();
		assert!(matches!(
			dependency_model_url(&base, &cell("hr"), &range()),
			Err(FetchError::BaseUrl(_))
		));
	}
}
