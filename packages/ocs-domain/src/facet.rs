use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

pub const UI_WIDGET_TYPE: &str = "uiWidgetType";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
	pub name: String,
	pub count: u64,
	/// This filter's own clause, e.g. `brandId:88`.
	pub filter_query: String,
	/// Clauses that re-apply this filter on top of the active ones.
	pub filter_queries: Vec<String>,
	pub selected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
	/// Backend field the facet was computed over.
	pub field: String,
	pub name: String,
	pub metadata: BTreeMap<String, String>,
	pub multi_select: bool,
	pub mixed_sorting: bool,
	pub min_buckets: u32,
	pub filters: Vec<Filter>,
}
impl Facet {
	pub fn from_metadata(field: &str, metadata: &FacetMetadata) -> Self {
		let mut ui = BTreeMap::new();

		if let Some(ui_type) = metadata.ui_type(field) {
			ui.insert(UI_WIDGET_TYPE.to_string(), ui_type.to_string());
		}

		Self {
			field: field.to_string(),
			name: metadata.facet_name(field),
			metadata: ui,
			multi_select: metadata.is_multi_select(field),
			mixed_sorting: metadata.is_mixed_sorting(field),
			min_buckets: metadata.min_buckets(field),
			filters: Vec::new(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
	pub start: i64,
	pub end: i64,
	pub gap: i64,
	#[serde(default)]
	pub hardened: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FacetKind {
	Field {
		#[serde(default)]
		limit: Option<i64>,
		#[serde(default)]
		min_count: Option<u32>,
		#[serde(default)]
		sort: Option<String>,
	},
	Range(RangeConfig),
	Query { queries: Vec<String> },
}

/// Display and faceting settings for one field, as stored with the merchandising rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetDefinition {
	pub field: String,
	pub name: String,
	pub kind: FacetKind,
	#[serde(default)]
	pub ui_type: Option<String>,
	#[serde(default)]
	pub multi_select: bool,
	#[serde(default)]
	pub mixed_sorting: bool,
	#[serde(default)]
	pub min_buckets: u32,
	#[serde(default)]
	pub blacklist: HashSet<String>,
}

/// Facet definitions in their declared display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetMetadata {
	pub definitions: Vec<FacetDefinition>,
}
impl FacetMetadata {
	pub fn new(definitions: Vec<FacetDefinition>) -> Self {
		Self { definitions }
	}

	pub fn definition(&self, field: &str) -> Option<&FacetDefinition> {
		self.definitions.iter().find(|definition| definition.field == field)
	}

	/// Declared name, or the field name when the field has no definition.
	pub fn facet_name(&self, field: &str) -> String {
		self.definition(field)
			.map(|definition| definition.name.clone())
			.filter(|name| !name.trim().is_empty())
			.unwrap_or_else(|| field.to_string())
	}

	pub fn ui_type(&self, field: &str) -> Option<&str> {
		self.definition(field)
			.and_then(|definition| definition.ui_type.as_deref())
			.filter(|ui_type| !ui_type.trim().is_empty())
	}

	pub fn is_multi_select(&self, field: &str) -> bool {
		self.definition(field).is_some_and(|definition| definition.multi_select)
	}

	pub fn is_mixed_sorting(&self, field: &str) -> bool {
		self.definition(field).is_some_and(|definition| definition.mixed_sorting)
	}

	pub fn min_buckets(&self, field: &str) -> u32 {
		self.definition(field).map(|definition| definition.min_buckets).unwrap_or(0)
	}

	pub fn blacklist(&self, field: &str) -> Option<&HashSet<String>> {
		self.definition(field).map(|definition| &definition.blacklist)
	}

	pub fn range_config(&self, field: &str) -> Option<RangeConfig> {
		self.definition(field).and_then(|definition| match definition.kind {
			FacetKind::Range(range) => Some(range),
			_ => None,
		})
	}

	pub fn field_names(&self) -> impl Iterator<Item = &str> {
		self.definitions.iter().map(|definition| definition.field.as_str())
	}
}
