//! Merges resolved merchandising rules into a query.

use serde::{Deserialize, Serialize};

use ocs_domain::{
	FacetKind, FacetMetadata, FilterQuery, Locale, RangeFacetRequest, StructuredQuery,
};

/// Everything rule resolution may condition on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleContext {
	pub query_text: String,
	pub category_id: Option<String>,
	pub category_path: Option<String>,
	pub brand_id: Option<String>,
	pub filter_queries: Vec<FilterQuery>,
	pub site_id: String,
	pub catalog_id: String,
	pub locale: Locale,
	pub outlet: bool,
	pub is_search: bool,
	pub is_rule_page: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRules {
	/// Raw filter clauses, appended after the catalog filter.
	pub filter_expressions: Vec<String>,
	pub boost_queries: Vec<String>,
	pub redirect_url: Option<String>,
	pub facets: FacetMetadata,
}
impl ResolvedRules {
	pub fn redirect(&self) -> Option<&str> {
		self.redirect_url.as_deref().filter(|url| !url.trim().is_empty())
	}
}

/// Applies the catalog filter, rule filters, caller filters, facet definitions and boosts,
/// in that order.
pub fn apply(
	query: &mut StructuredQuery,
	catalog_id: &str,
	rules: &ResolvedRules,
	active: &[FilterQuery],
) {
	query.add_filter_query(FilterQuery::new("catalogId", catalog_id).to_string());

	for expression in &rules.filter_expressions {
		if !expression.trim().is_empty() {
			query.add_filter_query(expression.clone());
		}
	}

	for filter_query in active {
		if rules.facets.is_multi_select(&filter_query.field_name) {
			query.add_filter_query(filter_query.tagged());
		} else {
			query.add_filter_query(filter_query.to_string());
		}
	}

	add_facet_definitions(query, &rules.facets);

	query.boost_queries.extend(rules.boost_queries.iter().cloned());
}

fn add_facet_definitions(query: &mut StructuredQuery, metadata: &FacetMetadata) {
	for definition in &metadata.definitions {
		let field = definition.field.as_str();
		let exclude_tag = definition.multi_select.then(|| field.to_string());

		match &definition.kind {
			FacetKind::Field { limit, min_count, sort } => {
				let request = query.facet_field_mut(field);

				request.limit = limit.or(request.limit);
				request.min_count = min_count.or(request.min_count);
				request.sort = sort.clone().or(request.sort.take());
				request.exclude_tag = exclude_tag;
			},
			FacetKind::Range(range) => {
				if query.range_facets.iter().any(|request| request.field == field) {
					continue;
				}

				query.range_facets.push(RangeFacetRequest {
					field: field.to_string(),
					start: range.start,
					end: range.end,
					gap: range.gap,
					hardened: range.hardened,
					exclude_tag,
				});
			},
			FacetKind::Query { queries } =>
				for expression in queries {
					let facet_query = match exclude_tag.as_deref() {
						Some(tag) => format!("{{!ex={tag}}}{field}:{expression}"),
						None => format!("{field}:{expression}"),
					};

					query.facet_queries.push(facet_query);
				},
		}
	}
}
