use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

const QUERY_SPECIAL_CHARS: &[char] = &[
	'\\', '+', '-', '!', '(', ')', ':', '^', '[', ']', '"', '{', '}', '~', '*', '?', '|', '&', ';',
	'/',
];

/// A `field:expression` clause the caller has applied, e.g. `brandId:88` or
/// `salePriceUS:[100 TO 200]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterQuery {
	pub field_name: String,
	pub expression: String,
}
impl FilterQuery {
	pub fn new(field_name: impl Into<String>, expression: impl Into<String>) -> Self {
		Self { field_name: field_name.into(), expression: expression.into() }
	}

	/// Clause for a literal facet value, escaped so the backend reads it verbatim.
	pub fn for_value(field_name: impl Into<String>, value: &str) -> Self {
		Self::new(field_name, escape_query_chars(value))
	}

	pub fn parse(raw: &str) -> crate::Result<Self> {
		let trimmed = strip_local_params(raw.trim());
		let Some((field, expression)) = trimmed.split_once(':') else {
			return Err(Error::InvalidFilterQuery {
				raw: raw.to_string(),
				message: "expected field:expression".to_string(),
			});
		};

		if field.trim().is_empty() || expression.trim().is_empty() {
			return Err(Error::InvalidFilterQuery {
				raw: raw.to_string(),
				message: "field and expression must be non-empty".to_string(),
			});
		}

		Ok(Self::new(field.trim(), expression.trim()))
	}

	/// Rendering tagged with the field name, used for multi-select fields.
	pub fn tagged(&self) -> String {
		format!("{{!tag={}}}{self}", self.field_name)
	}

	pub fn unescaped_expression(&self) -> String {
		unescape_query_chars(&self.expression)
	}

	/// Whether this clause selects `value` on `field`. The value may arrive raw, escaped,
	/// or as the range expression itself.
	pub fn selects(&self, field: &str, value: &str) -> bool {
		self.field_name == field
			&& (self.expression == value
				|| self.unescaped_expression() == value
				|| self.expression == escape_query_chars(value))
	}
}
impl FromStr for FilterQuery {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		Self::parse(raw)
	}
}
impl fmt::Display for FilterQuery {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.field_name, self.expression)
	}
}

pub fn is_selected(field: &str, value: &str, active: &[FilterQuery]) -> bool {
	active.iter().any(|filter_query| filter_query.selects(field, value))
}

/// Re-appliable path for a filter: the active clauses (minus those on the same field
/// unless the field is multi-select) followed by the filter's own clause. Never empty.
pub fn count_path(own: &FilterQuery, active: &[FilterQuery], multi_select: bool) -> Vec<String> {
	let own_rendered = own.to_string();
	let mut path: Vec<String> = Vec::with_capacity(active.len() + 1);

	for filter_query in active {
		if !multi_select && filter_query.field_name == own.field_name {
			continue;
		}

		let rendered = filter_query.to_string();

		if !path.contains(&rendered) {
			path.push(rendered);
		}
	}

	if !path.contains(&own_rendered) {
		path.push(own_rendered);
	}

	path
}

/// Drops a leading `{...}` local-parameter block such as `{!ex=brand}`.
pub fn strip_local_params(raw: &str) -> &str {
	if raw.starts_with('{')
		&& let Some(index) = raw.find('}')
	{
		return &raw[index + 1..];
	}

	raw
}

pub fn escape_query_chars(value: &str) -> String {
	let mut out = String::with_capacity(value.len());

	for ch in value.chars() {
		if QUERY_SPECIAL_CHARS.contains(&ch) || ch.is_whitespace() {
			out.push('\\');
		}
		out.push(ch);
	}

	out
}

pub fn unescape_query_chars(value: &str) -> String {
	let mut out = String::with_capacity(value.len());
	let mut chars = value.chars();

	while let Some(ch) = chars.next() {
		if ch == '\\' {
			if let Some(next) = chars.next() {
				out.push(next);
			}
			continue;
		}
		out.push(ch);
	}

	out
}
