//! Range bucket naming and boundary handling.

use std::sync::LazyLock;

use regex::Regex;

use crate::Error;

const UNBOUNDED: &str = "*";

static RANGE_EXPRESSION: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"^[\[{]\s*(\S+)\s+TO\s+(\S+)\s*[\]}]$").ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBucketKind {
	Before,
	InRange,
	After,
}

/// Boundary with its decimal part cut off: "119.95" becomes "119".
pub fn truncate_decimals(value: &str) -> &str {
	match value.find('.') {
		Some(index) => &value[..index],
		None => value,
	}
}

/// Truncated boundary, validated as `*` or a number.
pub fn normalize_bound(field: &str, value: &str) -> crate::Result<String> {
	let trimmed = value.trim();

	if trimmed == UNBOUNDED {
		return Ok(trimmed.to_string());
	}

	let truncated = truncate_decimals(trimmed);

	if trimmed.parse::<f64>().is_err() || truncated.trim_start_matches('-').is_empty() {
		return Err(Error::InvalidRange {
			field: field.to_string(),
			message: format!("'{value}' is not a numeric boundary"),
		});
	}

	Ok(truncated.to_string())
}

/// Upper bound of the last synthesized bucket when the range is not hardened.
pub fn open_upper_bound(field: &str, last_lower: &str, gap: i64) -> crate::Result<i64> {
	let value: f64 = last_lower.trim().parse().map_err(|_| Error::InvalidRange {
		field: field.to_string(),
		message: format!("'{last_lower}' is not a numeric boundary"),
	})?;

	if !value.is_finite() {
		return Err(Error::InvalidRange {
			field: field.to_string(),
			message: format!("'{last_lower}' is not a finite boundary"),
		});
	}

	let floor = value.floor();
	let upper = (floor >= i64::MIN as f64 && floor < i64::MAX as f64)
		.then(|| (floor as i64).checked_add(gap))
		.flatten();

	upper.ok_or_else(|| Error::InvalidRange {
		field: field.to_string(),
		message: format!("'{last_lower}' plus gap {gap} is out of range"),
	})
}

pub fn range_name(kind: RangeBucketKind, lower: &str, upper: &str) -> String {
	match kind {
		RangeBucketKind::Before => format!("Under {upper}"),
		RangeBucketKind::InRange => format!("{lower} - {upper}"),
		RangeBucketKind::After => format!("{lower} and up"),
	}
}

pub fn range_expression(lower: &str, upper: &str) -> String {
	format!("[{lower} TO {upper}]")
}

/// Display name for a query facet expression. Range expressions get a range name;
/// anything else is returned as-is.
pub fn expression_name(field: &str, expression: &str) -> crate::Result<String> {
	let trimmed = expression.trim();

	if !(trimmed.starts_with('[') || trimmed.starts_with('{')) {
		return Ok(trimmed.to_string());
	}

	let captures = RANGE_EXPRESSION.as_ref().and_then(|re| re.captures(trimmed)).ok_or_else(
		|| Error::InvalidRange {
			field: field.to_string(),
			message: format!("'{expression}' is not a range expression"),
		},
	)?;
	let lower = normalize_bound(field, &captures[1])?;
	let upper = normalize_bound(field, &captures[2])?;
	let kind = match (lower.as_str(), upper.as_str()) {
		(UNBOUNDED, UNBOUNDED) => {
			return Err(Error::InvalidRange {
				field: field.to_string(),
				message: "range must have at least one bound".to_string(),
			});
		},
		(UNBOUNDED, _) => RangeBucketKind::Before,
		(_, UNBOUNDED) => RangeBucketKind::After,
		_ => RangeBucketKind::InRange,
	};

	Ok(range_name(kind, &lower, &upper))
}
