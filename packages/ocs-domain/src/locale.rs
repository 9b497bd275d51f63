use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Language plus country. The language keys backend endpoints; the country suffixes
/// price and on-sale fields (`salePriceUS`, `onsaleUS`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locale {
	pub language: String,
	pub country: String,
}
impl Locale {
	pub fn new(language: impl Into<String>, country: impl Into<String>) -> Self {
		Self {
			language: language.into().to_ascii_lowercase(),
			country: country.into().to_ascii_uppercase(),
		}
	}
}
impl FromStr for Locale {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		let trimmed = raw.trim();
		let mut parts = trimmed.split(['_', '-']);
		let language = parts.next().unwrap_or_default();
		let country = parts.next().unwrap_or_default();

		if language.is_empty()
			|| !language.chars().all(|ch| ch.is_ascii_alphabetic())
			|| !country.chars().all(|ch| ch.is_ascii_alphabetic())
			|| parts.next().is_some()
		{
			return Err(Error::InvalidLocale { raw: raw.to_string() });
		}

		Ok(Self::new(language, country))
	}
}
impl fmt::Display for Locale {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.country.is_empty() {
			write!(f, "{}", self.language)
		} else {
			write!(f, "{}_{}", self.language, self.country)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::Locale;

	#[test]
	fn parses_underscore_and_dash_forms() {
		let a: Locale = "en_US".parse().expect("Expected locale.");
		let b: Locale = "EN-us".parse().expect("Expected locale.");
		assert_eq!(a, b);
		assert_eq!(a.to_string(), "en_US");
	}

	#[test]
	fn language_only_has_empty_country() {
		let locale: Locale = "fr".parse().expect("Expected locale.");
		assert_eq!(locale.country, "");
		assert_eq!(locale.to_string(), "fr");
	}

	#[test]
	fn rejects_garbage() {
		assert!("".parse::<Locale>().is_err());
		assert!("en_US_x".parse::<Locale>().is_err());
		assert!("e1_US".parse::<Locale>().is_err());
	}
}
