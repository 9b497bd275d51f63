mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Backend, Config, Search, Service};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("backend.url", &cfg.backend.url),
		("backend.catalog_collection", &cfg.backend.catalog_collection),
		("backend.rules_collection", &cfg.backend.rules_collection),
		("backend.autocomplete_collection", &cfg.backend.autocomplete_collection),
		("search.minimum_match", &cfg.search.minimum_match),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if cfg.backend.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "backend.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.backend.locales.is_empty() {
		return Err(Error::Validation {
			message: "backend.locales must contain at least one language.".to_string(),
		});
	}
	if cfg.backend.locales.iter().any(|language| language.trim().is_empty()) {
		return Err(Error::Validation {
			message: "backend.locales entries must be non-empty.".to_string(),
		});
	}

	for (language, url) in &cfg.backend.locale_urls {
		if !cfg.backend.locales.contains(language) {
			return Err(Error::Validation {
				message: format!("backend.locale_urls.{language} has no matching backend.locales entry."),
			});
		}
		if url.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("backend.locale_urls.{language} must be non-empty."),
			});
		}
	}

	let default_language = default_language(&cfg.service.default_locale);

	if default_language.is_empty() {
		return Err(Error::Validation {
			message: "service.default_locale must be non-empty.".to_string(),
		});
	}
	if !cfg.backend.locales.iter().any(|language| language.eq_ignore_ascii_case(default_language)) {
		return Err(Error::Validation {
			message: format!(
				"service.default_locale language '{default_language}' must be listed in backend.locales."
			),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.backend.url = cfg.backend.url.trim_end_matches('/').to_string();

	for language in &mut cfg.backend.locales {
		*language = language.trim().to_ascii_lowercase();
	}

	let locale_urls = std::mem::take(&mut cfg.backend.locale_urls);

	cfg.backend.locale_urls = locale_urls
		.into_iter()
		.map(|(language, url)| {
			(language.trim().to_ascii_lowercase(), url.trim_end_matches('/').to_string())
		})
		.collect();
}

fn default_language(locale: &str) -> &str {
	locale.trim().split(['_', '-']).next().unwrap_or_default()
}
