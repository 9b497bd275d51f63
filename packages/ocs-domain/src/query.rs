use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
	Asc,
	Desc,
}
impl SortOrder {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Asc => "asc",
			Self::Desc => "desc",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortClause {
	pub field: String,
	pub order: SortOrder,
}
impl SortClause {
	pub fn asc(field: impl Into<String>) -> Self {
		Self { field: field.into(), order: SortOrder::Asc }
	}

	pub fn desc(field: impl Into<String>) -> Self {
		Self { field: field.into(), order: SortOrder::Desc }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchOperator {
	And,
	Or,
}
impl MatchOperator {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::And => "AND",
			Self::Or => "OR",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupParams {
	pub field: String,
	pub limit: u32,
	pub ngroups: bool,
	pub facet: bool,
	pub sort: Option<String>,
}

/// One facet field request. `exclude_tag` names the tagged filter the backend ignores
/// while counting this field, which is how multi-select facets keep sibling counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetFieldRequest {
	pub field: String,
	pub prefix: Option<String>,
	pub limit: Option<i64>,
	pub min_count: Option<u32>,
	pub sort: Option<String>,
	pub exclude_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeFacetRequest {
	pub field: String,
	pub start: i64,
	pub end: i64,
	pub gap: i64,
	pub hardened: bool,
	pub exclude_tag: Option<String>,
}

/// Backend-neutral query under construction. Created per request, mutated by the
/// composition stages and never shared between requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredQuery {
	pub query: Option<String>,
	pub alternate_query: Option<String>,
	pub match_operator: Option<MatchOperator>,
	pub minimum_match: Option<String>,
	filter_queries: Vec<String>,
	facet_fields: Vec<FacetFieldRequest>,
	pub range_facets: Vec<RangeFacetRequest>,
	pub facet_queries: Vec<String>,
	pub facet_limit: Option<i64>,
	pub facet_min_count: Option<u32>,
	pub rows: Option<u32>,
	pub start: Option<u32>,
	pub group: Option<GroupParams>,
	pub sorts: Vec<SortClause>,
	pub fields: Vec<String>,
	pub boost_queries: Vec<String>,
	pub params: BTreeMap<String, String>,
}
impl StructuredQuery {
	pub fn new(query: impl Into<String>) -> Self {
		Self { query: Some(query.into()), ..Self::default() }
	}

	/// Query text, empty when unset.
	pub fn query_text(&self) -> &str {
		self.query.as_deref().unwrap_or_default()
	}

	pub fn is_query_blank(&self) -> bool {
		self.query_text().trim().is_empty()
	}

	pub fn filter_queries(&self) -> &[String] {
		&self.filter_queries
	}

	pub fn add_filter_query(&mut self, filter_query: impl Into<String>) {
		self.filter_queries.push(filter_query.into());
	}

	pub fn facet_fields(&self) -> &[FacetFieldRequest] {
		&self.facet_fields
	}

	pub fn facet_field(&self, field: &str) -> Option<&FacetFieldRequest> {
		self.facet_fields.iter().find(|request| request.field == field)
	}

	/// Returns the request for `field`, appending an empty one when missing.
	pub fn facet_field_mut(&mut self, field: &str) -> &mut FacetFieldRequest {
		let index = match self.facet_fields.iter().position(|request| request.field == field) {
			Some(index) => index,
			None => {
				self.facet_fields
					.push(FacetFieldRequest { field: field.to_string(), ..Default::default() });

				self.facet_fields.len() - 1
			},
		};

		&mut self.facet_fields[index]
	}

	pub fn add_facet_field(&mut self, field: &str) {
		self.facet_field_mut(field);
	}

	pub fn set_facet_prefix(&mut self, field: &str, prefix: impl Into<String>) {
		self.facet_field_mut(field).prefix = Some(prefix.into());
	}

	pub fn facet_prefix(&self, field: &str) -> Option<&str> {
		self.facet_field(field).and_then(|request| request.prefix.as_deref())
	}

	pub fn has_facets(&self) -> bool {
		!self.facet_fields.is_empty() || !self.range_facets.is_empty() || !self.facet_queries.is_empty()
	}

	pub fn is_grouped(&self) -> bool {
		self.group.is_some()
	}

	/// Unset rows means the backend default page size, which still fetches products.
	pub fn fetches_products(&self) -> bool {
		self.rows.is_none_or(|rows| rows > 0) || self.is_grouped()
	}

	pub fn is_sorted_by_relevance(&self) -> bool {
		self.sorts.is_empty() || self.sorts.iter().any(|clause| clause.field == "score")
	}

	pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.params.insert(key.into(), value.into());
	}

	pub fn param(&self, key: &str) -> Option<&str> {
		self.params.get(key).map(String::as_str)
	}
}
