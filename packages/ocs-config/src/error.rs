use std::{io, path::PathBuf};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Unable to read configuration file {path:?}.")]
	ReadConfig {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("Configuration file {path:?} is not valid TOML.")]
	ParseConfig {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},
	#[error("Invalid configuration: {message}")]
	Validation { message: String },
}
