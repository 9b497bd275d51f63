use ocs_domain::{
	CATEGORY_PATH, CategoryGraphBuilder, Facet, Filter, FilterQuery, Locale, MATCH_ALL,
	StructuredQuery,
};

use crate::{Collection, Error, Result, SearchService, SiteContext};

impl SearchService {
	/// Values of a single field across the site's catalog, without products. `None` when
	/// the field has no values.
	#[allow(clippy::too_many_arguments)]
	pub async fn get_facet(
		&self,
		site: &SiteContext,
		locale: Option<&Locale>,
		field: &str,
		limit: i64,
		depth_limit: u32,
		separator: &str,
		active: &[FilterQuery],
	) -> Result<Option<Facet>> {
		let locale = self.resolve_locale(locale)?;
		let catalog_id = site
			.catalog_id()
			.ok_or_else(|| Error::Configuration { message: "Missing catalog.".to_string() })?;
		let endpoint = self.endpoints.get(Collection::Catalog, &locale)?;
		let query = facet_query(&locale, catalog_id, field, limit, active);
		let result = self.execute(endpoint, &query).await?;
		let Some(values) = result
			.facet_field(field)
			.map(|facet| &facet.values)
			.filter(|values| !values.is_empty())
		else {
			return Ok(None);
		};
		let depth = CategoryGraphBuilder::new(depth_limit, separator);
		let filters = values
			.iter()
			.filter(|count| !depth.is_pruned(&count.name))
			.map(|count| {
				let own = FilterQuery::for_value(field, &count.name).to_string();

				Filter {
					name: count.name.clone(),
					count: count.count,
					filter_query: own.clone(),
					filter_queries: vec![own],
					selected: false,
				}
			})
			.collect();

		Ok(Some(Facet {
			field: field.to_string(),
			name: capitalize(field),
			filters,
			..Default::default()
		}))
	}
}

fn facet_query(
	locale: &Locale,
	catalog_id: &str,
	field: &str,
	limit: i64,
	active: &[FilterQuery],
) -> StructuredQuery {
	let mut query = StructuredQuery::new(MATCH_ALL);

	query.rows = Some(0);
	query.add_facet_field(field);
	query.facet_limit = Some(limit);
	query.facet_min_count = Some(1);
	query.add_filter_query(format!("country:{}", locale.country));
	query.set_param(format!("f.{CATEGORY_PATH}.facet.prefix"), format!("{catalog_id}."));
	query.add_filter_query(format!("{CATEGORY_PATH}:{catalog_id}"));

	for filter_query in active {
		query.add_filter_query(filter_query.to_string());
	}

	query
}

fn capitalize(value: &str) -> String {
	let mut chars = value.chars();

	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}
