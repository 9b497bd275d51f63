//! Query composition for browse pages and the preparation shared by every search.

use ocs_config::Config;
use ocs_domain::{
	BRAND_ID, CATEGORY, CATEGORY_PATH, GroupParams, Locale, MATCH_ALL, StructuredQuery,
	filter_query::escape_query_chars,
};

use crate::BrowseOptions;

pub const GROUP_FIELD: &str = "productId";
pub const GROUP_LIMIT: u32 = 50;
pub const EVALUATION_COLLECTION: &str = "catalogEvaluation";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowsePlan {
	/// Explicit category path, or `<catalogId>.`.
	pub category_path: String,
	/// Path handed to rule resolution: set for rule pages and explicit paths only.
	pub rule_category_path: Option<String>,
	pub category_graph: bool,
}

pub fn compose_browse(
	options: &BrowseOptions,
	catalog_id: &str,
	locale: &Locale,
	query: &mut StructuredQuery,
) -> BrowsePlan {
	let has_category_id = is_present(options.category_id.as_deref());
	let has_category_path = is_present(options.category_path.as_deref());
	let has_brand_id = is_present(options.brand_id.as_deref());
	let category_graph = !options.rule_based_page
		&& (options.fetch_category_graph
			|| (has_brand_id && options.fetch_products && !has_category_id));
	let category_path = match options.category_path.as_deref() {
		Some(path) if has_category_path => path.to_string(),
		_ => format!("{catalog_id}."),
	};

	if options.rule_based_page {
		query.query = Some(MATCH_ALL.to_string());

		return BrowsePlan {
			rule_category_path: Some(category_path.clone()),
			category_path,
			category_graph,
		};
	}

	if category_graph {
		let request = query.facet_field_mut(CATEGORY_PATH);

		request.prefix = Some(category_path.clone());
		request.limit = Some(options.max_category_results);
	}
	if !options.fetch_products {
		query.rows = Some(0);
	}

	let mut clauses: Vec<String> = Vec::new();

	if has_category_id {
		clauses.push(format!("{CATEGORY_PATH}:{}", escape_query_chars(&category_path)));
		query.query = Some(String::new());
	}
	if let Some(brand_id) = options.brand_id.as_deref().filter(|_| has_brand_id) {
		clauses.push(format!("{BRAND_ID}:{}", escape_query_chars(brand_id)));
		query.query = Some(String::new());
	}
	if options.on_sale {
		clauses.push(format!("onsale{}:true", locale.country));
	}
	if !clauses.is_empty() {
		query.alternate_query = Some(format!("({})", clauses.join(" AND ")));
	}

	BrowsePlan {
		rule_category_path: has_category_path.then(|| category_path.clone()),
		category_path,
		category_graph,
	}
}

/// Facet and grouping settings every search carries.
pub fn prepare_search(cfg: &Config, locale: &Locale, catalog_id: &str, query: &mut StructuredQuery) {
	query.add_facet_field(CATEGORY);
	query.facet_min_count = Some(1);

	if query.fetches_products() {
		set_group_params(cfg, locale, query);
		set_field_list_params(cfg, locale, catalog_id, query);
	}
}

pub fn set_group_params(cfg: &Config, locale: &Locale, query: &mut StructuredQuery) {
	let sort = (cfg.search.group_sorting_enabled && query.is_sorted_by_relevance()).then(|| {
		format!("isCloseout asc, salePrice{} asc, sort asc, score desc", locale.country)
	});

	query.group = Some(GroupParams {
		field: GROUP_FIELD.to_string(),
		limit: GROUP_LIMIT,
		ngroups: true,
		facet: false,
		sort,
	});
}

pub fn set_field_list_params(
	cfg: &Config,
	locale: &Locale,
	catalog_id: &str,
	query: &mut StructuredQuery,
) {
	let country = &locale.country;
	let list_price = format!("listPrice{country}");
	let sale_price = format!("salePrice{country}");
	let discount_percent = format!("discountPercent{country}");
	let mut fields = vec![
		"id".to_string(),
		GROUP_FIELD.to_string(),
		"title".to_string(),
		"brand".to_string(),
		"isToos".to_string(),
		list_price.clone(),
		sale_price.clone(),
		discount_percent.clone(),
		format!("url{country}"),
		"reviewAverage".to_string(),
		"reviews".to_string(),
		"isPastSeason".to_string(),
		format!("freeGift{catalog_id}"),
		"image".to_string(),
	];

	if cfg.backend.catalog_collection.trim().eq_ignore_ascii_case(EVALUATION_COLLECTION) {
		fields.push("score".to_string());
		query.fields = fields;
	} else if query.fields.is_empty() {
		fields.push("isCloseout".to_string());
		query.fields = fields;
	}

	query.set_param("groupcollapse", "true");
	query.set_param(
		"groupcollapse.fl",
		format!("{list_price},{sale_price},{discount_percent},color,colorFamily"),
	);
}

fn is_present(value: Option<&str>) -> bool {
	value.is_some_and(|value| !value.trim().is_empty())
}
