use crate::BoxError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Search execution failed: {message}")]
	SearchExecution {
		message: String,
		#[source]
		source: BoxError,
	},
	#[error("Rule resolution failed: {message}")]
	RuleResolution {
		message: String,
		#[source]
		source: BoxError,
	},
	#[error("Configuration error: {message}")]
	Configuration { message: String },
	#[error("Analysis failed: {message}")]
	Analysis {
		message: String,
		#[source]
		source: BoxError,
	},
}
