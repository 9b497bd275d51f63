pub mod category_graph;
pub mod facet;
pub mod filter_query;
pub mod locale;
pub mod query;
pub mod range;
pub mod result;

mod error;

pub use category_graph::{CategoryGraphBuilder, CategoryGraphNode};
pub use error::{Error, Result};
pub use facet::{Facet, FacetDefinition, FacetKind, FacetMetadata, Filter, RangeConfig};
pub use filter_query::FilterQuery;
pub use locale::Locale;
pub use query::{
	FacetFieldRequest, GroupParams, MatchOperator, RangeFacetRequest, SortClause, SortOrder,
	StructuredQuery,
};
pub use result::{DocGroup, FacetCount, FieldFacet, GroupCommand, RangeCount, RangeFacet, ResultSet};

pub const CATEGORY: &str = "category";
pub const CATEGORY_PATH: &str = "categoryPath";
pub const BRAND_ID: &str = "brandId";
pub const MATCH_ALL: &str = "*:*";
