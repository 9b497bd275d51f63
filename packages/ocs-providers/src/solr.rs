use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use ocs_domain::{
	DocGroup, FacetCount, FieldFacet, GroupCommand, RangeCount, RangeFacet, ResultSet,
	StructuredQuery,
};

use crate::{Endpoint, Error, Result};

const TERM_VECTOR_FIELD: &str = "categoryName";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCommand {
	Commit,
	Rollback,
	DeleteByQuery(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisRequest {
	Field {
		field_names: Vec<String>,
		value: String,
		#[serde(default)]
		query: Option<String>,
	},
	Document {
		docs: Vec<Value>,
	},
}

pub async fn select(endpoint: &Endpoint, query: &StructuredQuery) -> Result<ResultSet> {
	let client = client(endpoint)?;
	let res = client
		.get(endpoint.url("/select"))
		.headers(crate::default_headers(&endpoint.default_headers)?)
		.query(&to_params(query))
		.send()
		.await?;
	let status = res.status();

	// Solr reports query errors with a JSON body and a non-success status.
	if status.is_client_error() {
		let json: Value = res.json().await?;

		tracing::warn!(
			status = status.as_u16(),
			collection = endpoint.collection.as_str(),
			"Backend rejected select request."
		);

		parse_select_response(&json)?;

		return Err(Error::Backend {
			code: Some(u64::from(status.as_u16())),
			message: format!("Select request failed with status {status}."),
		});
	}

	let json: Value = res.error_for_status()?.json().await?;

	parse_select_response(&json)
}

pub async fn ping(endpoint: &Endpoint) -> Result<Value> {
	let client = client(endpoint)?;
	let res = client
		.get(endpoint.url("/admin/ping"))
		.headers(crate::default_headers(&endpoint.default_headers)?)
		.query(&[("wt", "json")])
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	match json.get("status").and_then(Value::as_str) {
		Some("OK") => Ok(json),
		other => Err(Error::InvalidResponse {
			message: format!("Ping returned status {}.", other.unwrap_or("<missing>")),
		}),
	}
}

pub async fn update(endpoint: &Endpoint, command: &UpdateCommand) -> Result<Value> {
	let client = client(endpoint)?;
	let body = match command {
		UpdateCommand::Commit => serde_json::json!({ "commit": {} }),
		UpdateCommand::Rollback => serde_json::json!({ "rollback": {} }),
		UpdateCommand::DeleteByQuery(query) => serde_json::json!({ "delete": { "query": query } }),
	};
	let res = client
		.post(endpoint.url("/update"))
		.headers(crate::default_headers(&endpoint.default_headers)?)
		.query(&[("wt", "json")])
		.json(&body)
		.send()
		.await?;

	Ok(res.error_for_status()?.json().await?)
}

pub async fn analyze(endpoint: &Endpoint, request: &AnalysisRequest) -> Result<Value> {
	let client = client(endpoint)?;
	let headers = crate::default_headers(&endpoint.default_headers)?;
	let res = match request {
		AnalysisRequest::Field { field_names, value, query } => {
			let mut params = vec![
				("analysis.fieldname".to_string(), field_names.join(",")),
				("analysis.fieldvalue".to_string(), value.clone()),
				("wt".to_string(), "json".to_string()),
			];

			if let Some(query) = query {
				params.push(("analysis.query".to_string(), query.clone()));
			}

			client.get(endpoint.url("/analysis/field")).headers(headers).query(&params).send().await?
		},
		AnalysisRequest::Document { docs } =>
			client
				.post(endpoint.url("/analysis/document"))
				.headers(headers)
				.query(&[("wt", "json")])
				.json(docs)
				.send()
				.await?,
	};

	Ok(res.error_for_status()?.json().await?)
}

/// Term vectors for the documents matching `query`, over the category name field.
pub async fn term_vector(endpoint: &Endpoint, query: &str, fields: &[String]) -> Result<Value> {
	let client = client(endpoint)?;
	let params = [
		("q", query.to_string()),
		("fl", fields.join(",")),
		("tv.fl", TERM_VECTOR_FIELD.to_string()),
		("wt", "json".to_string()),
	];
	let res = client
		.get(endpoint.url("/tvrh"))
		.headers(crate::default_headers(&endpoint.default_headers)?)
		.query(&params)
		.send()
		.await?;

	Ok(res.error_for_status()?.json().await?)
}

fn client(endpoint: &Endpoint) -> Result<Client> {
	Ok(Client::builder().timeout(Duration::from_millis(endpoint.timeout_ms)).build()?)
}

/// Renders the query as backend request parameters, in a stable order.
pub fn to_params(query: &StructuredQuery) -> Vec<(String, String)> {
	let mut params: Vec<(String, String)> = Vec::new();
	let mut push = |key: &str, value: String| params.push((key.to_string(), value));

	if let Some(text) = query.query.as_ref() {
		push("q", text.clone());
	}
	if let Some(alternate) = query.alternate_query.as_ref() {
		push("q.alt", alternate.clone());
	}
	if let Some(operator) = query.match_operator {
		push("q.op", operator.as_str().to_string());
	}
	if let Some(minimum_match) = query.minimum_match.as_ref() {
		push("mm", minimum_match.clone());
	}
	for filter_query in query.filter_queries() {
		push("fq", filter_query.clone());
	}
	if let Some(start) = query.start {
		push("start", start.to_string());
	}
	if let Some(rows) = query.rows {
		push("rows", rows.to_string());
	}
	if !query.sorts.is_empty() {
		let sort = query
			.sorts
			.iter()
			.map(|clause| format!("{} {}", clause.field, clause.order.as_str()))
			.collect::<Vec<_>>()
			.join(",");

		push("sort", sort);
	}
	if !query.fields.is_empty() {
		push("fl", query.fields.join(","));
	}
	for boost in &query.boost_queries {
		push("bq", boost.clone());
	}

	if query.has_facets() {
		push("facet", "true".to_string());

		if let Some(limit) = query.facet_limit {
			push("facet.limit", limit.to_string());
		}
		if let Some(min_count) = query.facet_min_count {
			push("facet.mincount", min_count.to_string());
		}

		for request in query.facet_fields() {
			let field = &request.field;

			push("facet.field", with_exclusion(field, request.exclude_tag.as_deref()));

			if let Some(prefix) = request.prefix.as_ref() {
				push(&format!("f.{field}.facet.prefix"), prefix.clone());
			}
			if let Some(limit) = request.limit {
				push(&format!("f.{field}.facet.limit"), limit.to_string());
			}
			if let Some(min_count) = request.min_count {
				push(&format!("f.{field}.facet.mincount"), min_count.to_string());
			}
			if let Some(sort) = request.sort.as_ref() {
				push(&format!("f.{field}.facet.sort"), sort.clone());
			}
		}

		for range in &query.range_facets {
			let field = &range.field;

			push("facet.range", with_exclusion(field, range.exclude_tag.as_deref()));
			push(&format!("f.{field}.facet.range.start"), range.start.to_string());
			push(&format!("f.{field}.facet.range.end"), range.end.to_string());
			push(&format!("f.{field}.facet.range.gap"), range.gap.to_string());
			push(&format!("f.{field}.facet.range.hardend"), range.hardened.to_string());
			push(&format!("f.{field}.facet.range.other"), "before".to_string());
			push(&format!("f.{field}.facet.range.other"), "after".to_string());
		}

		for facet_query in &query.facet_queries {
			push("facet.query", facet_query.clone());
		}
	}

	if let Some(group) = query.group.as_ref() {
		push("group", "true".to_string());
		push("group.field", group.field.clone());
		push("group.limit", group.limit.to_string());
		push("group.ngroups", group.ngroups.to_string());
		push("group.facet", group.facet.to_string());

		if let Some(sort) = group.sort.as_ref() {
			push("group.sort", sort.clone());
		}
	}

	for (key, value) in &query.params {
		push(key, value.clone());
	}

	push("wt", "json".to_string());
	push("json.nl", "arrarr".to_string());

	params
}

fn with_exclusion(field: &str, tag: Option<&str>) -> String {
	match tag {
		Some(tag) => format!("{{!ex={tag}}}{field}"),
		None => field.to_string(),
	}
}

pub fn parse_select_response(json: &Value) -> Result<ResultSet> {
	if let Some(message) = json.pointer("/error/msg").and_then(Value::as_str) {
		return Err(Error::Backend {
			code: json.pointer("/error/code").and_then(Value::as_u64),
			message: message.to_string(),
		});
	}

	let qtime_ms =
		json.pointer("/responseHeader/QTime").and_then(Value::as_u64).unwrap_or_default();
	let groups = match json.get("grouped").and_then(Value::as_object) {
		Some(grouped) => grouped
			.iter()
			.map(|(field, command)| parse_group_command(field, command))
			.collect::<Result<Vec<_>>>()?,
		None => Vec::new(),
	};
	let facet_counts = json.get("facet_counts");
	let facet_fields = match facet_counts.and_then(|counts| counts.get("facet_fields")) {
		Some(fields) => named_entries(fields)
			.into_iter()
			.map(|(name, values)| {
				let values = parse_counts(&values)?
					.into_iter()
					.map(|(name, count)| FacetCount { name, count })
					.collect();

				Ok(FieldFacet { name, values })
			})
			.collect::<Result<Vec<_>>>()?,
		None => Vec::new(),
	};
	let facet_ranges = match facet_counts.and_then(|counts| counts.get("facet_ranges")) {
		Some(ranges) => named_entries(ranges)
			.into_iter()
			.map(|(name, range)| parse_range_facet(name, &range))
			.collect::<Result<Vec<_>>>()?,
		None => Vec::new(),
	};
	let facet_queries = match facet_counts.and_then(|counts| counts.get("facet_queries")) {
		Some(queries) => parse_counts(queries)?,
		None => Vec::new(),
	};

	Ok(ResultSet {
		groups,
		facet_fields,
		facet_ranges,
		facet_queries,
		spelling_suggestion: json.get("spellcheck").and_then(parse_collation),
		qtime_ms,
	})
}

fn parse_group_command(field: &str, command: &Value) -> Result<GroupCommand> {
	let groups = command
		.get("groups")
		.and_then(Value::as_array)
		.map(|groups| groups.iter().map(parse_doc_group).collect::<Result<Vec<_>>>())
		.transpose()?
		.unwrap_or_default();

	Ok(GroupCommand {
		field: field.to_string(),
		matches: command.get("matches").and_then(Value::as_u64).unwrap_or_default(),
		ngroups: command.get("ngroups").and_then(Value::as_u64).unwrap_or(groups.len() as u64),
		groups,
	})
}

fn parse_doc_group(group: &Value) -> Result<DocGroup> {
	let doclist = group.get("doclist").ok_or_else(|| Error::InvalidResponse {
		message: "Group is missing doclist.".to_string(),
	})?;
	let docs = doclist
		.get("docs")
		.and_then(Value::as_array)
		.map(|docs| docs.iter().filter_map(|doc| doc.as_object().cloned()).collect())
		.unwrap_or_default();

	Ok(DocGroup {
		group_value: group.get("groupValue").and_then(scalar_to_string),
		num_found: doclist.get("numFound").and_then(Value::as_u64).unwrap_or_default(),
		docs,
	})
}

fn parse_range_facet(name: String, range: &Value) -> Result<RangeFacet> {
	let range: Map<String, Value> = named_entries_or_flat(range).into_iter().collect();
	let counts = match range.get("counts") {
		Some(counts) => parse_counts(counts)?
			.into_iter()
			.map(|(value, count)| RangeCount { value, count })
			.collect(),
		None => Vec::new(),
	};

	Ok(RangeFacet {
		name,
		counts,
		before: range.get("before").and_then(Value::as_u64),
		after: range.get("after").and_then(Value::as_u64),
		start: range.get("start").and_then(scalar_to_string),
		end: range.get("end").and_then(scalar_to_string),
		gap: range.get("gap").and_then(scalar_to_string),
	})
}

/// Entries of a named list, in either object form or `json.nl=arrarr` form.
fn named_entries(value: &Value) -> Vec<(String, Value)> {
	match value {
		Value::Object(map) => map.iter().map(|(key, value)| (key.clone(), value.clone())).collect(),
		Value::Array(items) => items
			.iter()
			.filter_map(|item| {
				let pair = item.as_array()?;
				let key = pair.first()?.as_str()?;

				Some((key.to_string(), pair.get(1)?.clone()))
			})
			.collect(),
		_ => Vec::new(),
	}
}

/// Name/count pairs in flat (`["a", 3, "b", 2]`), `arrarr` or object form.
fn parse_counts(value: &Value) -> Result<Vec<(String, u64)>> {
	let invalid = || Error::InvalidResponse { message: "Facet counts are malformed.".to_string() };

	match value {
		Value::Object(map) => map
			.iter()
			.map(|(key, count)| Ok((key.clone(), count.as_u64().ok_or_else(invalid)?)))
			.collect(),
		Value::Array(items) if items.iter().all(Value::is_array) => items
			.iter()
			.map(|item| {
				let pair = item.as_array().ok_or_else(invalid)?;
				let name = pair.first().and_then(scalar_to_string).ok_or_else(invalid)?;
				let count = pair.get(1).and_then(Value::as_u64).ok_or_else(invalid)?;

				Ok((name, count))
			})
			.collect(),
		Value::Array(items) => {
			if items.len() % 2 != 0 {
				return Err(invalid());
			}

			items
				.chunks(2)
				.map(|pair| {
					let name = scalar_to_string(&pair[0]).ok_or_else(invalid)?;
					let count = pair[1].as_u64().ok_or_else(invalid)?;

					Ok((name, count))
				})
				.collect()
		},
		_ => Err(invalid()),
	}
}

fn parse_collation(spellcheck: &Value) -> Option<String> {
	let collations = spellcheck.get("collations")?;

	named_entries_or_flat(collations)
		.into_iter()
		.filter(|(key, _)| key == "collation")
		.find_map(|(_, value)| match value {
			Value::String(text) => Some(text),
			Value::Object(map) =>
				map.get("collationQuery").and_then(Value::as_str).map(str::to_string),
			_ => None,
		})
}

fn named_entries_or_flat(value: &Value) -> Vec<(String, Value)> {
	match value {
		Value::Array(items) if !items.iter().all(Value::is_array) => items
			.chunks(2)
			.filter_map(|pair| Some((pair.first()?.as_str()?.to_string(), pair.get(1)?.clone())))
			.collect(),
		other => named_entries(other),
	}
}

fn scalar_to_string(value: &Value) -> Option<String> {
	match value {
		Value::String(text) => Some(text.clone()),
		Value::Number(number) => Some(number.to_string()),
		Value::Bool(flag) => Some(flag.to_string()),
		_ => None,
	}
}
