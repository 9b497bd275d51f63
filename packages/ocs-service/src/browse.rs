use serde::{Deserialize, Serialize};

use ocs_domain::{
	CATEGORY_PATH, CategoryGraphBuilder, CategoryGraphNode, FilterQuery, Locale, StructuredQuery,
};

use crate::{
	Result, SearchResponse, SearchService, SiteContext, compose, search::SearchContext,
};

/// Caller options for brand, category, on-sale and rule-based pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseOptions {
	pub category_id: Option<String>,
	pub category_path: Option<String>,
	pub brand_id: Option<String>,
	/// Falls back to the site's default catalog.
	pub catalog_id: Option<String>,
	pub on_sale: bool,
	pub rule_based_page: bool,
	pub fetch_products: bool,
	pub fetch_category_graph: bool,
	pub max_category_results: i64,
	pub depth_limit: u32,
	pub separator: String,
}

impl SearchService {
	pub async fn browse(
		&self,
		options: &BrowseOptions,
		mut query: StructuredQuery,
		site: Option<&SiteContext>,
		locale: Option<&Locale>,
		active: &[FilterQuery],
	) -> Result<SearchResponse> {
		let locale = self.resolve_locale(locale)?;
		let site_catalog = site.and_then(SiteContext::catalog_id);
		let path_catalog = options
			.catalog_id
			.as_deref()
			.filter(|catalog| !catalog.trim().is_empty())
			.or(site_catalog)
			.unwrap_or_default();
		let plan = compose::compose_browse(options, path_catalog, &locale, &mut query);
		let ctx = SearchContext {
			site,
			catalog_id: site_catalog,
			is_search: false,
			is_rule_page: options.rule_based_page,
			category_id: options.category_id.as_deref(),
			category_path: plan.rule_category_path.as_deref(),
			brand_id: options.brand_id.as_deref(),
			outlet: options.on_sale,
		};
		let mut response = self.execute_search(query, &locale, ctx, active).await?;

		if plan.category_graph {
			response.category_graph = extract_category_graph(&mut response, options);
		}

		Ok(response)
	}
}

/// Builds the category graph from the raw category path facet and removes that facet.
pub fn extract_category_graph(
	response: &mut SearchResponse,
	options: &BrowseOptions,
) -> Vec<CategoryGraphNode> {
	let Some(facet) = response.take_facet(CATEGORY_PATH) else {
		return Vec::new();
	};
	let mut builder = CategoryGraphBuilder::new(options.depth_limit, &options.separator);

	for filter in &facet.filters {
		let path = CategoryGraphBuilder::filter_path(filter);

		tracing::debug!(path = path.as_str(), "Generating category graph for path.");

		builder.add_path(&path, filter.count);
	}

	let target = options
		.category_path
		.as_deref()
		.filter(|path| !path.trim().is_empty())
		.or(options.category_id.as_deref());

	builder.graph_for(target)
}
