use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use ocs_config::{Config, Error};

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn sample_value() -> Value {
	toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.")
}

fn render(value: &Value) -> String {
	toml::to_string(value).expect("Failed to render sample config.")
}

fn set(value: &mut Value, table: &str, key: &str, item: Value) {
	value
		.as_table_mut()
		.and_then(|root| root.get_mut(table))
		.and_then(Value::as_table_mut)
		.expect("Sample config must include the table.")
		.insert(key.to_string(), item);
}

fn write_temp_config(payload: String) -> PathBuf {
	let nanos = SystemTime::now().duration_since(UNIX_EPOCH).expect("Clock is before epoch.");
	let seq = COUNTER.fetch_add(1, Ordering::SeqCst);
	let path = env::temp_dir().join(format!(
		"ocs_config_test_{}_{}_{seq}.toml",
		std::process::id(),
		nanos.as_nanos()
	));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> ocs_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = ocs_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn expect_validation(result: ocs_config::Result<Config>, needle: &str) {
	match result {
		Err(Error::Validation { message }) => {
			assert!(message.contains(needle), "Unexpected message: {message}");
		},
		other => panic!("Expected validation error containing {needle:?}, got {other:?}."),
	}
}

#[test]
fn sample_config_loads_and_normalizes() {
	let cfg = load_payload(SAMPLE_CONFIG_TOML.to_string()).expect("Sample config must load.");

	assert_eq!(cfg.backend.url, "http://127.0.0.1:8983/solr");
	assert_eq!(cfg.backend.locales, vec!["en".to_string(), "fr".to_string()]);
	assert_eq!(
		cfg.backend.locale_urls.get("fr").map(String::as_str),
		Some("http://10.0.0.2:8983/solr")
	);
	assert!(cfg.search.group_sorting_enabled);
}

#[test]
fn search_section_defaults_when_missing() {
	let mut value = sample_value();

	value.as_table_mut().expect("Sample config must be a table.").remove("search");

	let cfg = load_payload(render(&value)).expect("Config without [search] must load.");

	assert_eq!(cfg.search.minimum_match, "2<-1 4<70%");
	assert!(cfg.search.group_sorting_enabled);
}

#[test]
fn rejects_zero_timeout() {
	let mut value = sample_value();

	set(&mut value, "backend", "timeout_ms", Value::Integer(0));

	expect_validation(load_payload(render(&value)), "backend.timeout_ms");
}

#[test]
fn rejects_blank_catalog_collection() {
	let mut value = sample_value();

	set(&mut value, "backend", "catalog_collection", Value::String("  ".to_string()));

	expect_validation(load_payload(render(&value)), "backend.catalog_collection");
}

#[test]
fn rejects_default_locale_without_backend() {
	let mut value = sample_value();

	set(&mut value, "service", "default_locale", Value::String("de_DE".to_string()));

	expect_validation(load_payload(render(&value)), "service.default_locale");
}

#[test]
fn rejects_locale_url_for_unknown_language() {
	let mut value = sample_value();
	let mut urls = toml::map::Map::new();

	urls.insert("es".to_string(), Value::String("http://10.0.0.3:8983/solr".to_string()));
	value
		.as_table_mut()
		.and_then(|root| root.get_mut("backend"))
		.and_then(Value::as_table_mut)
		.expect("Sample config must include [backend].")
		.insert("locale_urls".to_string(), Value::Table(urls));

	expect_validation(load_payload(render(&value)), "backend.locale_urls.es");
}

#[test]
fn missing_file_reports_read_error() {
	let path = env::temp_dir().join("ocs_config_test_missing_file.toml");
	let result = ocs_config::load(&path);

	assert!(matches!(result, Err(Error::ReadConfig { .. })));
}

#[test]
fn malformed_toml_reports_parse_error() {
	let result = load_payload("[backend\nurl = ".to_string());

	assert!(matches!(result, Err(Error::ParseConfig { .. })));
}
