//! Pass-through maintenance operations against one collection.

use serde_json::Value;

use ocs_domain::Locale;
use ocs_providers::solr::AnalysisRequest;

use crate::{BoxError, Collection, Error, Result, SearchService};

impl SearchService {
	pub async fn ping(&self, collection: Collection, locale: Option<&Locale>) -> Result<Value> {
		let locale = self.resolve_locale(locale)?;
		let endpoint = self.endpoints.get(collection, &locale)?;
		let res = self.providers.backend.ping(endpoint).await;

		res.map_err(|err| execution_error("ping", collection, err))
	}

	pub async fn commit(&self, collection: Collection, locale: Option<&Locale>) -> Result<Value> {
		let locale = self.resolve_locale(locale)?;
		let endpoint = self.endpoints.get(collection, &locale)?;
		let res = self.providers.backend.commit(endpoint).await;

		res.map_err(|err| execution_error("commit", collection, err))
	}

	pub async fn rollback(&self, collection: Collection, locale: Option<&Locale>) -> Result<Value> {
		let locale = self.resolve_locale(locale)?;
		let endpoint = self.endpoints.get(collection, &locale)?;
		let res = self.providers.backend.rollback(endpoint).await;

		res.map_err(|err| execution_error("rollback", collection, err))
	}

	pub async fn delete_by_query(
		&self,
		collection: Collection,
		locale: Option<&Locale>,
		query: &str,
	) -> Result<Value> {
		if query.trim().is_empty() {
			return Err(Error::Configuration {
				message: "Delete query must not be empty.".to_string(),
			});
		}

		let locale = self.resolve_locale(locale)?;
		let endpoint = self.endpoints.get(collection, &locale)?;
		let res = self.providers.backend.delete_by_query(endpoint, query).await;

		res.map_err(|err| execution_error("delete_by_query", collection, err))
	}

	pub async fn analyze(
		&self,
		collection: Collection,
		locale: Option<&Locale>,
		request: &AnalysisRequest,
	) -> Result<Value> {
		let locale = self.resolve_locale(locale)?;
		let endpoint = self.endpoints.get(collection, &locale)?;

		self.providers.backend.analyze(endpoint, request).await.map_err(|err| {
			tracing::error!(error = %err, collection = collection.as_str(), "Analysis request failed.");

			Error::Analysis { message: "Analysis request failed.".to_string(), source: err }
		})
	}

	/// Raw term vectors from the catalog collection for documents matching `query`.
	pub async fn term_vector(
		&self,
		query: &str,
		locale: Option<&Locale>,
		fields: &[String],
	) -> Result<Value> {
		let locale = self.resolve_locale(locale)?;
		let endpoint = self.endpoints.get(Collection::Catalog, &locale)?;
		let res = self.providers.backend.term_vector(endpoint, query, fields).await;

		res.map_err(|err| execution_error("term_vector", Collection::Catalog, err))
	}
}

fn execution_error(operation: &str, collection: Collection, err: BoxError) -> Error {
	tracing::error!(error = %err, operation, collection = collection.as_str(), "Backend request failed.");

	Error::SearchExecution {
		message: format!("Operation {operation} failed on the {} collection.", collection.as_str()),
		source: err,
	}
}
