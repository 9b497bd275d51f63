pub mod solr;

mod error;

pub use error::{Error, Result};

use reqwest::header::{HeaderMap, HeaderName};
use serde_json::{Map, Value};

/// One backend collection reachable over HTTP.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
	pub base_url: String,
	pub collection: String,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}
impl Endpoint {
	pub fn url(&self, path: &str) -> String {
		format!("{}/{}{}", self.base_url.trim_end_matches('/'), self.collection, path)
	}
}

pub fn default_headers(default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: format!("Default header '{key}' must be a string."),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}
