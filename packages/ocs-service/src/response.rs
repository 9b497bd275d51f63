use serde::Serialize;

use ocs_domain::{CategoryGraphNode, Facet, FilterQuery, ResultSet, StructuredQuery};

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
	/// The query as composed, before any spelling retry rewrote its text.
	pub query: StructuredQuery,
	pub result: Option<ResultSet>,
	pub facets: Vec<Facet>,
	pub category_graph: Vec<CategoryGraphNode>,
	pub filter_queries: Vec<FilterQuery>,
	pub corrected_term: Option<String>,
	pub matches_all: bool,
	pub redirect_url: Option<String>,
	pub rule_query_time_ms: u64,
	pub search_time_ms: u64,
}
impl SearchResponse {
	/// Response that only carries a rule redirect.
	pub fn redirect(query: StructuredQuery, url: String, rule_query_time_ms: u64) -> Self {
		Self {
			query,
			result: None,
			facets: Vec::new(),
			category_graph: Vec::new(),
			filter_queries: Vec::new(),
			corrected_term: None,
			matches_all: true,
			redirect_url: Some(url),
			rule_query_time_ms,
			search_time_ms: 0,
		}
	}

	pub fn is_redirect(&self) -> bool {
		self.redirect_url.is_some()
	}

	pub fn facet(&self, field: &str) -> Option<&Facet> {
		self.facets.iter().find(|facet| facet.field == field)
	}

	/// Removes the facet computed over `field` and its raw counts.
	pub fn take_facet(&mut self, field: &str) -> Option<Facet> {
		if let Some(result) = self.result.as_mut() {
			result.facet_fields.retain(|facet| facet.name != field);
		}

		let index = self.facets.iter().position(|facet| facet.field == field)?;

		Some(self.facets.remove(index))
	}
}
