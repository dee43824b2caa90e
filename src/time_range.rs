//! Observation windows and the time expressions the global filter is written in.
//!
//! The filter stores its bounds as text (`"now - 24 hours"`, `"now"`, epoch
//! milliseconds or RFC 3339 timestamps). They are resolved against a clock
//! reading each time a fetch is issued, so relative windows slide forward on
//! every refresh.

use chrono::{DateTime, Months, Utc};
use thiserror::Error;

/// Errors produced while resolving time expressions into a [`TimeRange`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeRangeError {
	/// The expression matches none of the accepted forms.
	#[error("unrecognized time expression {0:?}")]
	Unrecognized(String),
	/// The expression is well-formed but resolves outside the representable range.
	#[error("time expression {0:?} is out of range")]
	OutOfRange(String),
	/// The start of the window lies after its end.
	#[error("start time {start} is after end time {end}")]
	Inverted {
		/// Resolved start.
		start: i64,
		/// Resolved end.
		end: i64,
	},
}

/// A closed observation window in Unix epoch milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeRange {
	/// Inclusive start.
	pub start_ms: i64,
	/// Inclusive end.
	pub end_ms: i64,
}

impl TimeRange {
	/// Rejects windows whose start lies after their end.
	pub fn new(start_ms: i64, end_ms: i64) -> Result<Self, TimeRangeError> {
		if start_ms > end_ms {
			return Err(TimeRangeError::Inverted {
				start: start_ms,
				end: end_ms,
			});
		}
		Ok(Self { start_ms, end_ms })
	}

	/// Resolve a pair of filter expressions against `now_ms`.
	pub fn parse(start: &str, end: &str, now_ms: i64) -> Result<Self, TimeRangeError> {
		Self::new(parse_time(start, now_ms)?, parse_time(end, now_ms)?)
	}

	/// Length of the window.
	pub fn duration_ms(&self) -> i64 {
		self.end_ms - self.start_ms
	}
}

/// The page-wide observation window, still in expression form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalFilter {
	/// Start of the window, as a time expression.
	pub start_time: String,
	/// End of the window, as a time expression.
	pub end_time: String,
}

impl GlobalFilter {
	/// A window ending now.
	pub fn last(start_time: &str) -> Self {
		Self {
			start_time: start_time.to_string(),
			end_time: "now".to_string(),
		}
	}

	/// Evaluate both bounds against `now_ms`.
	pub fn resolve(&self, now_ms: i64) -> Result<TimeRange, TimeRangeError> {
		TimeRange::parse(&self.start_time, &self.end_time, now_ms)
	}
}

/// Current wall-clock time from the browser.
pub fn now_ms() -> i64 {
	js_sys::Date::now() as i64
}

/// Delay argument for `setTimeout`/`setInterval`, which take a signed 32-bit
/// count. Longer delays are capped instead of wrapping negative.
pub(crate) fn timer_delay(ms: u32) -> i32 {
	i32::try_from(ms).unwrap_or(i32::MAX)
}

/// Resolve one time expression to epoch milliseconds.
///
/// Accepted forms:
/// - `now`
/// - `now - <n> <unit>` where unit is one of `s`, `m`, `h`, `d`, `w`, `M`, `y`
///   or their spelled-out names (`seconds`, `minutes`, ..., singular or plural)
/// - an integer, taken as epoch milliseconds
/// - an RFC 3339 timestamp
pub fn parse_time(expr: &str, now_ms: i64) -> Result<i64, TimeRangeError> {
	let trimmed = expr.trim();
	let unrecognized = || TimeRangeError::Unrecognized(expr.to_string());

	if let Some(rest) = strip_prefix_ignore_case(trimmed, "now") {
		let rest = rest.trim_start();
		if rest.is_empty() {
			return Ok(now_ms);
		}
		let offset = rest.strip_prefix('-').ok_or_else(unrecognized)?.trim();
		return subtract_offset(offset, now_ms).ok_or_else(|| match split_amount(offset) {
			Some(_) => TimeRangeError::OutOfRange(expr.to_string()),
			None => unrecognized(),
		});
	}

	if let Ok(ms) = trimmed.parse::<i64>() {
		return Ok(ms);
	}

	DateTime::parse_from_rfc3339(trimmed)
		.map(|dt| dt.timestamp_millis())
		.map_err(|_| unrecognized())
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
	let head = s.get(..prefix.len())?;
	head.eq_ignore_ascii_case(prefix)
		.then(|| &s[prefix.len()..])
}

/// Split `"6 hours"` / `"6h"` into `(6, Unit::Hour)`.
fn split_amount(offset: &str) -> Option<(u32, Unit)> {
	let digits_end = offset
		.find(|c: char| !c.is_ascii_digit())
		.unwrap_or(offset.len());
	if digits_end == 0 {
		return None;
	}
	let amount = offset[..digits_end].parse().ok()?;
	let unit = Unit::parse(offset[digits_end..].trim())?;
	Some((amount, unit))
}

fn subtract_offset(offset: &str, now_ms: i64) -> Option<i64> {
	let (amount, unit) = split_amount(offset)?;
	match unit.fixed_ms() {
		Some(unit_ms) => now_ms.checked_sub(unit_ms.checked_mul(amount as i64)?),
		None => {
			let months = match unit {
				Unit::Year => amount.checked_mul(12)?,
				_ => amount,
			};
			let now = DateTime::<Utc>::from_timestamp_millis(now_ms)?;
			now.checked_sub_months(Months::new(months))
				.map(|dt| dt.timestamp_millis())
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Unit {
	Second,
	Minute,
	Hour,
	Day,
	Week,
	Month,
	Year,
}

impl Unit {
	fn parse(s: &str) -> Option<Self> {
		// Single letters are case sensitive: `m` is minutes, `M` is months.
		match s {
			"s" => return Some(Unit::Second),
			"m" => return Some(Unit::Minute),
			"h" => return Some(Unit::Hour),
			"d" => return Some(Unit::Day),
			"w" => return Some(Unit::Week),
			"M" => return Some(Unit::Month),
			"y" => return Some(Unit::Year),
			_ => {}
		}
		let lower = s.to_ascii_lowercase();
		let word = lower.strip_suffix('s').unwrap_or(&lower);
		match word {
			"sec" | "second" => Some(Unit::Second),
			"min" | "minute" => Some(Unit::Minute),
			"hour" => Some(Unit::Hour),
			"day" => Some(Unit::Day),
			"week" => Some(Unit::Week),
			"month" => Some(Unit::Month),
			"year" => Some(Unit::Year),
			_ => None,
		}
	}

	/// Length in milliseconds for units of fixed length. Months and years
	/// follow the calendar instead.
	fn fixed_ms(self) -> Option<i64> {
		const SECOND: i64 = 1_000;
		match self {
			Unit::Second => Some(SECOND),
			Unit::Minute => Some(60 * SECOND),
			Unit::Hour => Some(3_600 * SECOND),
			Unit::Day => Some(86_400 * SECOND),
			Unit::Week => Some(7 * 86_400 * SECOND),
			Unit::Month | Unit::Year => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	// 2019-03-15T12:00:00Z
	const NOW: i64 = 1_552_651_200_000;

	#[test]
	fn now_resolves_to_clock() {
		assert_eq!(parse_time("now", NOW), Ok(NOW));
		assert_eq!(parse_time("  NOW ", NOW), Ok(NOW));
	}

	#[test]
	fn relative_offsets() {
		assert_eq!(parse_time("now - 5 minutes", NOW), Ok(NOW - 300_000));
		assert_eq!(parse_time("now - 1 hour", NOW), Ok(NOW - 3_600_000));
		assert_eq!(parse_time("now-24h", NOW), Ok(NOW - 86_400_000));
		assert_eq!(parse_time("now - 7 days", NOW), Ok(NOW - 7 * 86_400_000));
		assert_eq!(parse_time("now - 30s", NOW), Ok(NOW - 30_000));
	}

	#[test]
	fn month_and_year_offsets_follow_calendar() {
		// 2019-02-15T12:00:00Z
		assert_eq!(parse_time("now - 1 month", NOW), Ok(1_550_232_000_000));
		assert_eq!(parse_time("now - 1M", NOW), Ok(1_550_232_000_000));
		// 2018-03-15T12:00:00Z
		assert_eq!(parse_time("now - 1 year", NOW), Ok(1_521_115_200_000));
	}

	#[test]
	fn absolute_forms() {
		assert_eq!(parse_time("1552651200000", NOW), Ok(NOW));
		assert_eq!(parse_time("2019-03-15T12:00:00Z", 0), Ok(NOW));
		assert_eq!(parse_time("2019-03-15T17:30:00+05:30", 0), Ok(NOW));
	}

	#[test]
	fn rejects_garbage() {
		assert!(matches!(
			parse_time("yesterday", NOW),
			Err(TimeRangeError::Unrecognized(_))
		));
		assert!(matches!(
			parse_time("now + 5 minutes", NOW),
			Err(TimeRangeError::Unrecognized(_))
		));
		assert!(matches!(
			parse_time("now - 5 fortnights", NOW),
			Err(TimeRangeError::Unrecognized(_))
		));
		assert!(matches!(
			parse_time("now - 5000000000 weeks", NOW),
			Err(TimeRangeError::Unrecognized(_))
		));
	}

	#[test]
	fn huge_offsets_are_out_of_range() {
		assert!(matches!(
			parse_time("now - 4000000 years", NOW),
			Err(TimeRangeError::OutOfRange(_))
		));
	}

	#[test]
	fn relative_filter_slides_with_clock() {
		let filter = GlobalFilter::last("now - 15 minutes");
		let earlier = filter.resolve(NOW).unwrap();
		let later = filter.resolve(NOW + 60_000).unwrap();
		assert_eq!(earlier.duration_ms(), 900_000);
		assert_eq!(later.start_ms - earlier.start_ms, 60_000);
	}

	#[test]
	fn timer_delay_is_capped() {
		assert_eq!(timer_delay(30_000), 30_000);
		assert_eq!(timer_delay(i32::MAX as u32), i32::MAX);
		assert_eq!(timer_delay(3_000_000_000), i32::MAX);
	}

	#[test]
	fn range_must_not_be_inverted() {
		let range = TimeRange::parse("now - 1 hour", "now", NOW).unwrap();
		assert_eq!(range.duration_ms(), 3_600_000);
		assert_eq!(range.end_ms, NOW);

		assert_eq!(
			TimeRange::parse("now", "now - 1 hour", NOW),
			Err(TimeRangeError::Inverted {
				start: NOW,
				end: NOW - 3_600_000,
			})
		);
	}
}
