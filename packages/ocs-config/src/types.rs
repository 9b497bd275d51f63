use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub backend: Backend,
	#[serde(default)]
	pub search: Search,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	/// Locale used when a caller does not pass one, e.g. "en_US".
	#[serde(default = "default_locale")]
	pub default_locale: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Backend {
	pub url: String,
	pub timeout_ms: u64,
	pub catalog_collection: String,
	pub rules_collection: String,
	pub autocomplete_collection: String,
	/// Languages with a catalog collection, one `<catalog_collection>_<language>` each.
	pub locales: Vec<String>,
	/// Optional. Map keys are languages; values replace `url` for that language.
	#[serde(default)]
	pub locale_urls: HashMap<String, String>,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	/// Minimum-match expression sent with the match-any spelling retry.
	pub minimum_match: String,
	pub group_sorting_enabled: bool,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			minimum_match: "2<-1 4<70%".to_string(),
			group_sorting_enabled: true,
		}
	}
}

fn default_locale() -> String {
	"en_US".to_string()
}
