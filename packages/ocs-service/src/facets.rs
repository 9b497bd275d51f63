//! Display-ready facets from raw field, range and query facet counts.

use std::collections::{HashMap, HashSet};

use ocs_domain::{
	CATEGORY, CATEGORY_PATH, Facet, FacetMetadata, FieldFacet, Filter, FilterQuery, RangeFacet,
	ResultSet, StructuredQuery,
	filter_query::{self, unescape_query_chars},
	range::{self, RangeBucketKind},
};

const UNBOUNDED: &str = "*";

/// Facets ordered `category`, `categoryPath`, then by declared metadata order. Fields with
/// no definition, other than the two category fields, are not emitted.
pub fn assemble(
	query: &StructuredQuery,
	result: &ResultSet,
	metadata: &FacetMetadata,
	active: &[FilterQuery],
) -> Vec<Facet> {
	let mut by_field: HashMap<String, Facet> = HashMap::new();

	for field_facet in &result.facet_fields {
		if let Some(facet) = field_facet_to_facet(query, field_facet, metadata, active) {
			by_field.insert(facet.field.clone(), facet);
		}
	}
	for range_facet in &result.facet_ranges {
		if let Some(facet) = range_facet_to_facet(range_facet, metadata, active) {
			by_field.insert(facet.field.clone(), facet);
		}
	}
	for facet in query_facets(&result.facet_queries, metadata, active) {
		by_field.insert(facet.field.clone(), facet);
	}

	let mut ordered = Vec::with_capacity(by_field.len());

	for field in [CATEGORY, CATEGORY_PATH].into_iter().chain(metadata.field_names()) {
		if let Some(facet) = by_field.remove(field) {
			ordered.push(facet);
		}
	}

	ordered
}

/// Bucket value with the active facet prefix removed, when a remainder exists.
pub fn display_name<'a>(value: &'a str, prefix: Option<&str>) -> &'a str {
	match prefix.and_then(|prefix| value.strip_prefix(prefix)) {
		Some(rest) if !rest.is_empty() => rest,
		_ => value,
	}
}

fn field_facet_to_facet(
	query: &StructuredQuery,
	field_facet: &FieldFacet,
	metadata: &FacetMetadata,
	active: &[FilterQuery],
) -> Option<Facet> {
	if field_facet.values.is_empty() {
		return None;
	}

	let field = field_facet.name.as_str();
	let mut facet = Facet::from_metadata(field, metadata);
	let prefix = query.facet_prefix(field);
	let blacklist = metadata.blacklist(field);

	for count in &field_facet.values {
		let name = display_name(&count.name, prefix);

		if is_blacklisted(blacklist, name) {
			continue;
		}

		let own = FilterQuery::for_value(field, &count.name);

		facet.filters.push(Filter {
			name: name.to_string(),
			count: count.count,
			filter_query: own.to_string(),
			filter_queries: filter_query::count_path(&own, active, facet.multi_select),
			selected: filter_query::is_selected(field, &count.name, active)
				|| filter_query::is_selected(field, name, active),
		});
	}

	Some(facet)
}

fn range_facet_to_facet(
	range_facet: &RangeFacet,
	metadata: &FacetMetadata,
	active: &[FilterQuery],
) -> Option<Facet> {
	if range_facet.is_empty() {
		return None;
	}

	let field = range_facet.name.as_str();
	let mut facet = Facet::from_metadata(field, metadata);
	let config = metadata.range_config(field);
	let start = config.map(|config| config.start.to_string()).or_else(|| range_facet.start.clone());
	let end = config.map(|config| config.end.to_string()).or_else(|| range_facet.end.clone());
	let gap = config.map(|config| config.gap).or_else(|| range_facet.gap.as_deref().and_then(whole_number));
	let hardened = config.is_some_and(|config| config.hardened);
	let mut buckets: Vec<(RangeBucketKind, String, String, u64)> = Vec::new();

	if let Some(before) = range_facet.before.filter(|count| *count > 0) {
		match start.as_ref() {
			Some(start) =>
				buckets.push((RangeBucketKind::Before, UNBOUNDED.to_string(), start.clone(), before)),
			None => tracing::warn!(field, "Range facet has no start for its before bucket."),
		}
	}

	for pair in range_facet.counts.windows(2) {
		buckets.push((
			RangeBucketKind::InRange,
			pair[0].value.clone(),
			pair[1].value.clone(),
			pair[0].count,
		));
	}

	if let Some(last) = range_facet.counts.last() {
		let upper = if hardened {
			end.clone()
		} else {
			match gap {
				Some(gap) => match range::open_upper_bound(field, &last.value, gap) {
					Ok(upper) => Some(upper.to_string()),
					Err(err) => {
						tracing::warn!(error = %err, field, "Dropping range bucket.");

						None
					},
				},
				None => {
					tracing::warn!(field, "Range facet has no gap for its last bucket.");

					None
				},
			}
		};

		if let Some(upper) = upper {
			buckets.push((RangeBucketKind::InRange, last.value.clone(), upper, last.count));
		}
	}

	if let Some(after) = range_facet.after.filter(|count| *count > 0) {
		match end.as_ref() {
			Some(end) =>
				buckets.push((RangeBucketKind::After, end.clone(), UNBOUNDED.to_string(), after)),
			None => tracing::warn!(field, "Range facet has no end for its after bucket."),
		}
	}

	let blacklist = metadata.blacklist(field);

	for (kind, lower, upper, count) in buckets {
		match range_filter(field, kind, &lower, &upper, count, facet.multi_select, active) {
			Ok(filter) if !is_blacklisted(blacklist, &filter.name) => facet.filters.push(filter),
			Ok(_) => {},
			Err(err) => tracing::warn!(error = %err, field, "Dropping range bucket."),
		}
	}

	Some(facet)
}

fn range_filter(
	field: &str,
	kind: RangeBucketKind,
	lower: &str,
	upper: &str,
	count: u64,
	multi_select: bool,
	active: &[FilterQuery],
) -> ocs_domain::Result<Filter> {
	let lower = range::normalize_bound(field, lower)?;
	let upper = range::normalize_bound(field, upper)?;
	let own = FilterQuery::new(field, range::range_expression(&lower, &upper));

	Ok(Filter {
		name: range::range_name(kind, &lower, &upper),
		count,
		filter_query: own.to_string(),
		filter_queries: filter_query::count_path(&own, active, multi_select),
		selected: filter_query::is_selected(field, &own.expression, active),
	})
}

/// Query facets grouped by field in the order the backend returned their keys.
fn query_facets(
	counts: &[(String, u64)],
	metadata: &FacetMetadata,
	active: &[FilterQuery],
) -> Vec<Facet> {
	let mut facets: Vec<Facet> = Vec::new();

	for (key, count) in counts {
		if *count == 0 {
			continue;
		}

		let own = match FilterQuery::parse(key) {
			Ok(own) => own,
			Err(err) => {
				tracing::warn!(error = %err, key = key.as_str(), "Skipping facet query.");

				continue;
			},
		};
		let field = own.field_name.as_str();
		let name = match range::expression_name(field, &own.expression) {
			Ok(name) => unescape_query_chars(&name),
			Err(err) => {
				tracing::warn!(error = %err, field, "Skipping facet query.");

				continue;
			},
		};
		let index = match facets.iter().position(|facet| facet.field == field) {
			Some(index) => index,
			None => {
				facets.push(Facet::from_metadata(field, metadata));

				facets.len() - 1
			},
		};
		let facet = &mut facets[index];

		if is_blacklisted(metadata.blacklist(field), &name) {
			continue;
		}

		facet.filters.push(Filter {
			name,
			count: *count,
			filter_query: own.to_string(),
			filter_queries: filter_query::count_path(&own, active, facet.multi_select),
			selected: filter_query::is_selected(field, &own.expression, active),
		});
	}

	facets
}

fn is_blacklisted(blacklist: Option<&HashSet<String>>, name: &str) -> bool {
	blacklist.is_some_and(|blacklist| blacklist.contains(name))
}

fn whole_number(raw: &str) -> Option<i64> {
	raw.trim().parse::<f64>().ok().filter(|value| value.is_finite()).map(|value| value as i64)
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use ocs_domain::{
		Facet, FacetCount, FacetDefinition, FacetKind, FacetMetadata, FieldFacet, RangeConfig,
		RangeCount, RangeFacet, ResultSet, StructuredQuery,
	};

	use super::{assemble, display_name};

	fn definition(field: &str, kind: FacetKind) -> FacetDefinition {
		FacetDefinition {
			field: field.to_string(),
			name: field.to_string(),
			kind,
			ui_type: None,
			multi_select: false,
			mixed_sorting: false,
			min_buckets: 0,
			blacklist: HashSet::new(),
		}
	}

	fn price(start: i64, end: i64, hardened: bool) -> FacetMetadata {
		FacetMetadata::new(vec![definition(
			"salePriceUS",
			FacetKind::Range(RangeConfig { start, end, gap: 50, hardened }),
		)])
	}

	fn range_result(values: &[(&str, u64)], after: u64) -> ResultSet {
		ResultSet {
			facet_ranges: vec![RangeFacet {
				name: "salePriceUS".to_string(),
				counts: values
					.iter()
					.map(|(value, count)| RangeCount { value: value.to_string(), count: *count })
					.collect(),
				after: Some(after),
				..Default::default()
			}],
			..Default::default()
		}
	}

	fn names(facet: &Facet) -> Vec<&str> {
		facet.filters.iter().map(|filter| filter.name.as_str()).collect()
	}

	#[test]
	fn display_name_strips_prefix_with_remainder() {
		assert_eq!(display_name("1.bcs", Some("1.")), "bcs");
		assert_eq!(display_name("1.", Some("1.")), "1.");
		assert_eq!(display_name("2.bcs", Some("1.")), "2.bcs");
		assert_eq!(display_name("bcs", None), "bcs");
	}

	#[test]
	fn undeclared_fields_are_dropped_and_empty_facets_omitted() {
		let result = ocs_domain::ResultSet {
			facet_fields: vec![
				FieldFacet {
					name: "color".to_string(),
					values: vec![FacetCount { name: "red".to_string(), count: 1 }],
				},
				FieldFacet { name: "category".to_string(), values: Vec::new() },
			],
			..Default::default()
		};
		let facets = assemble(&StructuredQuery::default(), &result, &FacetMetadata::default(), &[]);

		assert!(facets.is_empty());
	}

	#[test]
	fn hardened_range_ends_at_configured_end() {
		let result = range_result(&[("0.0", 1), ("50.0", 2), ("100.0", 3)], 4);
		let facets = assemble(&StructuredQuery::default(), &result, &price(0, 150, true), &[]);

		assert_eq!(names(&facets[0]), vec!["0 - 50", "50 - 100", "100 - 150", "150 and up"]);
		assert_eq!(facets[0].filters[2].filter_query, "salePriceUS:[100 TO 150]");
	}

	#[test]
	fn malformed_boundary_drops_only_its_buckets() {
		let result = range_result(&[("0", 1), ("50", 2), ("100", 3), ("oops", 4)], 0);
		let facets = assemble(&StructuredQuery::default(), &result, &price(0, 200, false), &[]);

		assert_eq!(names(&facets[0]), vec!["0 - 50", "50 - 100"]);
	}

	#[test]
	fn overflowing_open_bound_drops_last_bucket() {
		let result = range_result(&[("0", 1), ("1e19", 2)], 0);
		let facets = assemble(&StructuredQuery::default(), &result, &price(0, 200, false), &[]);

		assert_eq!(names(&facets[0]), vec!["0 - 1e19"]);
	}

	#[test]
	fn fully_blacklisted_facet_is_kept_without_filters() {
		let mut brand =
			definition("brandId", FacetKind::Field { limit: None, min_count: None, sort: None });

		brand.blacklist = HashSet::from(["Acme".to_string()]);

		let result = ResultSet {
			facet_fields: vec![FieldFacet {
				name: "brandId".to_string(),
				values: vec![FacetCount { name: "Acme".to_string(), count: 4 }],
			}],
			..Default::default()
		};
		let facets =
			assemble(&StructuredQuery::default(), &result, &FacetMetadata::new(vec![brand]), &[]);

		assert_eq!(facets.len(), 1);
		assert_eq!(facets[0].field, "brandId");
		assert!(facets[0].filters.is_empty());
	}
}
