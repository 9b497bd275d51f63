use std::time::Instant;

use ocs_domain::{FilterQuery, Locale, ResultSet, StructuredQuery};
use ocs_providers::Endpoint;

use crate::{
	Collection, Error, Result, RuleContext, SearchResponse, SearchService, SiteContext, compose,
	facets, rules::{self, ResolvedRules},
	spelling::{self, Observation, Resolution, RetryState},
};

/// Page-level inputs for one search execution.
#[derive(Debug, Clone, Default)]
pub(crate) struct SearchContext<'a> {
	pub(crate) site: Option<&'a SiteContext>,
	pub(crate) catalog_id: Option<&'a str>,
	pub(crate) is_search: bool,
	pub(crate) is_rule_page: bool,
	pub(crate) category_id: Option<&'a str>,
	pub(crate) category_path: Option<&'a str>,
	pub(crate) brand_id: Option<&'a str>,
	pub(crate) outlet: bool,
}

impl SearchService {
	/// Free-text search. The catalog defaults to the site's default catalog.
	pub async fn search(
		&self,
		query: StructuredQuery,
		site: Option<&SiteContext>,
		catalog_id: Option<&str>,
		locale: Option<&Locale>,
		active: &[FilterQuery],
	) -> Result<SearchResponse> {
		let locale = self.resolve_locale(locale)?;
		let catalog_id = catalog_id
			.filter(|catalog| !catalog.trim().is_empty())
			.or_else(|| site.and_then(SiteContext::catalog_id));
		let ctx = SearchContext { site, catalog_id, is_search: true, ..Default::default() };

		self.execute_search(query, &locale, ctx, active).await
	}

	pub(crate) async fn execute_search(
		&self,
		mut query: StructuredQuery,
		locale: &Locale,
		ctx: SearchContext<'_>,
		active: &[FilterQuery],
	) -> Result<SearchResponse> {
		let Some(site) = ctx.site else {
			return Err(Error::Configuration { message: "Missing site.".to_string() });
		};
		let Some(catalog_id) = ctx.catalog_id else {
			return Err(Error::Configuration { message: "Missing catalog.".to_string() });
		};
		let endpoint = self.endpoints.get(Collection::Catalog, locale)?;
		let started = Instant::now();

		compose::prepare_search(&self.cfg, locale, catalog_id, &mut query);

		let fetches_products = query.fetches_products();
		let mut rule_query_time_ms = 0;
		// Rule pages always need the rule filter, even when only facets are requested.
		let resolved = if fetches_products || ctx.is_rule_page {
			let rule_ctx = RuleContext {
				query_text: query.query_text().to_string(),
				category_id: ctx.category_id.map(str::to_string),
				category_path: ctx.category_path.map(str::to_string),
				brand_id: ctx.brand_id.map(str::to_string),
				filter_queries: active.to_vec(),
				site_id: site.id.clone(),
				catalog_id: catalog_id.to_string(),
				locale: locale.clone(),
				outlet: ctx.outlet,
				is_search: ctx.is_search,
				is_rule_page: ctx.is_rule_page,
			};
			let rules_started = Instant::now();
			let resolved = self.providers.rules.resolve(&rule_ctx).await.map_err(|err| {
				tracing::error!(error = %err, catalog_id, "Unable to load search rules.");

				Error::RuleResolution { message: "Unable to load search rules.".to_string(), source: err }
			})?;

			rule_query_time_ms = elapsed_ms(rules_started);

			if !fetches_products {
				ResolvedRules { filter_expressions: resolved.filter_expressions, ..Default::default() }
			} else if let Some(url) = resolved.redirect() {
				return Ok(SearchResponse::redirect(query, url.to_string(), rule_query_time_ms));
			} else {
				resolved
			}
		} else {
			ResolvedRules::default()
		};

		rules::apply(&mut query, catalog_id, &resolved, active);

		let mut result = self.execute(endpoint, &query).await?;
		let mut state = spelling::transition(RetryState::Initial, &Observation::of(&query, &result));
		let mut corrected_term = None;
		let mut matches_all = true;

		while let Some(attempt) =
			spelling::retry_query(&state, &query, &self.cfg.search.minimum_match)
		{
			let attempt_result = self.execute(endpoint, &attempt).await?;

			state = spelling::transition(state, &Observation::of(&attempt, &attempt_result));

			if let RetryState::Done(Resolution::Corrected { term, matches_all: all }) = &state {
				corrected_term = Some(term.clone());
				matches_all = *all;
				result = attempt_result;
			}
		}

		if result.is_empty() && fetches_products && !query.is_query_blank() {
			tracing::warn!(query = query.query_text(), "Search returned no results.");
		}

		let search_time_ms = elapsed_ms(started);

		tracing::debug!(search_time_ms, engine_time_ms = result.qtime_ms, "Search completed.");

		let facets = facets::assemble(&query, &result, &resolved.facets, active);

		Ok(SearchResponse {
			query,
			result: Some(result),
			facets,
			category_graph: Vec::new(),
			filter_queries: active.to_vec(),
			corrected_term,
			matches_all,
			redirect_url: None,
			rule_query_time_ms,
			search_time_ms,
		})
	}

	pub(crate) async fn execute(
		&self,
		endpoint: &Endpoint,
		query: &StructuredQuery,
	) -> Result<ResultSet> {
		self.providers.backend.execute(endpoint, query).await.map_err(|err| {
			tracing::error!(
				error = %err,
				collection = endpoint.collection.as_str(),
				"Search backend request failed."
			);

			Error::SearchExecution { message: "Search backend request failed.".to_string(), source: err }
		})
	}
}

fn elapsed_ms(started: Instant) -> u64 {
	u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
