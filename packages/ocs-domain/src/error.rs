pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("Invalid filter query '{raw}': {message}")]
	InvalidFilterQuery { raw: String, message: String },
	#[error("Invalid range expression for field '{field}': {message}")]
	InvalidRange { field: String, message: String },
	#[error("Invalid locale '{raw}'.")]
	InvalidLocale { raw: String },
}
