use serde::{Deserialize, Serialize};

pub type Document = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocGroup {
	pub group_value: Option<String>,
	pub num_found: u64,
	pub docs: Vec<Document>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupCommand {
	pub field: String,
	pub matches: u64,
	pub ngroups: u64,
	pub groups: Vec<DocGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
	pub name: String,
	pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFacet {
	pub name: String,
	pub values: Vec<FacetCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeCount {
	/// Lower bound of the bucket as the backend reports it, e.g. "119.95".
	pub value: String,
	pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeFacet {
	pub name: String,
	pub counts: Vec<RangeCount>,
	pub before: Option<u64>,
	pub after: Option<u64>,
	pub start: Option<String>,
	pub end: Option<String>,
	pub gap: Option<String>,
}
impl RangeFacet {
	pub fn is_empty(&self) -> bool {
		self.counts.is_empty() && self.before.unwrap_or(0) == 0 && self.after.unwrap_or(0) == 0
	}
}

/// Snapshot of one backend response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
	pub groups: Vec<GroupCommand>,
	pub facet_fields: Vec<FieldFacet>,
	pub facet_ranges: Vec<RangeFacet>,
	/// Query facet keys in the order the backend returned them.
	pub facet_queries: Vec<(String, u64)>,
	pub spelling_suggestion: Option<String>,
	pub qtime_ms: u64,
}
impl ResultSet {
	/// No group command reports a positive number of groups.
	pub fn is_empty(&self) -> bool {
		!self.groups.iter().any(|command| command.ngroups > 0)
	}

	pub fn facet_field(&self, name: &str) -> Option<&FieldFacet> {
		self.facet_fields.iter().find(|facet| facet.name == name)
	}

	/// Suggestion only when it carries non-blank text.
	pub fn suggestion(&self) -> Option<&str> {
		self.spelling_suggestion.as_deref().filter(|text| !text.trim().is_empty())
	}
}
