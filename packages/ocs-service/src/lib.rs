pub mod admin;
pub mod browse;
pub mod compose;
pub mod facet_lookup;
pub mod facets;
pub mod response;
pub mod rules;
pub mod search;
pub mod spelling;

mod error;

pub use browse::BrowseOptions;
pub use compose::BrowsePlan;
pub use error::{Error, Result};
pub use response::SearchResponse;
pub use rules::{ResolvedRules, RuleContext};

use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use ocs_config::Config;
use ocs_domain::{Locale, ResultSet, StructuredQuery};
use ocs_providers::{
	Endpoint,
	solr::{self, AnalysisRequest, UpdateCommand},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Transport to the search backend.
pub trait BackendClient
where
	Self: Send + Sync,
{
	fn execute<'a>(
		&'a self,
		endpoint: &'a Endpoint,
		query: &'a StructuredQuery,
	) -> BoxFuture<'a, Result<ResultSet, BoxError>>;

	fn ping<'a>(&'a self, endpoint: &'a Endpoint) -> BoxFuture<'a, Result<Value, BoxError>>;

	fn commit<'a>(&'a self, endpoint: &'a Endpoint) -> BoxFuture<'a, Result<Value, BoxError>>;

	fn rollback<'a>(&'a self, endpoint: &'a Endpoint) -> BoxFuture<'a, Result<Value, BoxError>>;

	fn delete_by_query<'a>(
		&'a self,
		endpoint: &'a Endpoint,
		query: &'a str,
	) -> BoxFuture<'a, Result<Value, BoxError>>;

	fn analyze<'a>(
		&'a self,
		endpoint: &'a Endpoint,
		request: &'a AnalysisRequest,
	) -> BoxFuture<'a, Result<Value, BoxError>>;

	fn term_vector<'a>(
		&'a self,
		endpoint: &'a Endpoint,
		query: &'a str,
		fields: &'a [String],
	) -> BoxFuture<'a, Result<Value, BoxError>>;
}

/// Resolves the merchandising rules that apply to one request.
pub trait RuleResolver
where
	Self: Send + Sync,
{
	fn resolve<'a>(
		&'a self,
		ctx: &'a RuleContext,
	) -> BoxFuture<'a, Result<ResolvedRules, BoxError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
	Catalog,
	Rules,
	Autocomplete,
}
impl Collection {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Catalog => "catalog",
			Self::Rules => "rules",
			Self::Autocomplete => "autocomplete",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteContext {
	pub id: String,
	pub default_catalog: Option<String>,
}
impl SiteContext {
	pub fn new(id: impl Into<String>, default_catalog: Option<String>) -> Self {
		Self { id: id.into(), default_catalog }
	}

	pub fn catalog_id(&self) -> Option<&str> {
		self.default_catalog.as_deref().filter(|catalog| !catalog.trim().is_empty())
	}
}

/// Per-language endpoints, one per collection, built once from configuration.
#[derive(Debug, Clone)]
pub struct Endpoints {
	by_language: HashMap<(Collection, String), Endpoint>,
}
impl Endpoints {
	pub fn from_config(cfg: &Config) -> Self {
		let backend = &cfg.backend;
		let mut by_language = HashMap::new();

		for language in &backend.locales {
			let language = language.to_ascii_lowercase();
			let base_url = backend.locale_urls.get(&language).unwrap_or(&backend.url);

			for (collection, name) in [
				(Collection::Catalog, &backend.catalog_collection),
				(Collection::Rules, &backend.rules_collection),
				(Collection::Autocomplete, &backend.autocomplete_collection),
			] {
				by_language.insert(
					(collection, language.clone()),
					Endpoint {
						base_url: base_url.clone(),
						collection: format!("{name}_{language}"),
						timeout_ms: backend.timeout_ms,
						default_headers: backend.default_headers.clone(),
					},
				);
			}
		}

		Self { by_language }
	}

	pub fn get(&self, collection: Collection, locale: &Locale) -> Result<&Endpoint> {
		self.by_language.get(&(collection, locale.language.clone())).ok_or_else(|| {
			Error::Configuration {
				message: format!(
					"No {} collection is configured for language '{}'.",
					collection.as_str(),
					locale.language
				),
			}
		})
	}
}

#[derive(Clone)]
pub struct Providers {
	pub backend: Arc<dyn BackendClient>,
	pub rules: Arc<dyn RuleResolver>,
}
impl Providers {
	pub fn new(backend: Arc<dyn BackendClient>, rules: Arc<dyn RuleResolver>) -> Self {
		Self { backend, rules }
	}

	/// Providers backed by the HTTP backend adapter.
	pub fn with_rules(rules: Arc<dyn RuleResolver>) -> Self {
		Self { backend: Arc::new(DefaultBackend), rules }
	}
}

pub struct SearchService {
	pub cfg: Config,
	pub endpoints: Endpoints,
	pub providers: Providers,
}
impl SearchService {
	pub fn new(cfg: Config, rules: Arc<dyn RuleResolver>) -> Self {
		Self::with_providers(cfg, Providers::with_rules(rules))
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		let endpoints = Endpoints::from_config(&cfg);

		Self { cfg, endpoints, providers }
	}

	/// The caller's locale, or the configured default.
	pub fn resolve_locale(&self, locale: Option<&Locale>) -> Result<Locale> {
		if let Some(locale) = locale {
			return Ok(locale.clone());
		}

		self.cfg.service.default_locale.parse().map_err(|_| Error::Configuration {
			message: format!(
				"Default locale '{}' is not a valid locale.",
				self.cfg.service.default_locale
			),
		})
	}
}

struct DefaultBackend;

impl BackendClient for DefaultBackend {
	fn execute<'a>(
		&'a self,
		endpoint: &'a Endpoint,
		query: &'a StructuredQuery,
	) -> BoxFuture<'a, Result<ResultSet, BoxError>> {
		Box::pin(async move { solr::select(endpoint, query).await.map_err(BoxError::from) })
	}

	fn ping<'a>(&'a self, endpoint: &'a Endpoint) -> BoxFuture<'a, Result<Value, BoxError>> {
		Box::pin(async move { solr::ping(endpoint).await.map_err(BoxError::from) })
	}

	fn commit<'a>(&'a self, endpoint: &'a Endpoint) -> BoxFuture<'a, Result<Value, BoxError>> {
		Box::pin(async move {
			solr::update(endpoint, &UpdateCommand::Commit).await.map_err(BoxError::from)
		})
	}

	fn rollback<'a>(&'a self, endpoint: &'a Endpoint) -> BoxFuture<'a, Result<Value, BoxError>> {
		Box::pin(async move {
			solr::update(endpoint, &UpdateCommand::Rollback).await.map_err(BoxError::from)
		})
	}

	fn delete_by_query<'a>(
		&'a self,
		endpoint: &'a Endpoint,
		query: &'a str,
	) -> BoxFuture<'a, Result<Value, BoxError>> {
		Box::pin(async move {
			let command = UpdateCommand::DeleteByQuery(query.to_string());

			solr::update(endpoint, &command).await.map_err(BoxError::from)
		})
	}

	fn analyze<'a>(
		&'a self,
		endpoint: &'a Endpoint,
		request: &'a AnalysisRequest,
	) -> BoxFuture<'a, Result<Value, BoxError>> {
		Box::pin(async move { solr::analyze(endpoint, request).await.map_err(BoxError::from) })
	}

	fn term_vector<'a>(
		&'a self,
		endpoint: &'a Endpoint,
		query: &'a str,
		fields: &'a [String],
	) -> BoxFuture<'a, Result<Value, BoxError>> {
		Box::pin(async move {
			solr::term_vector(endpoint, query, fields).await.map_err(BoxError::from)
		})
	}
}
