//! Spelling-correction retry protocol.
//!
//! An empty first page with non-blank text is retried at most twice: once with the
//! backend's suggestion matching all terms, then matching any term under the configured
//! minimum match. Retries run on copies of the composed query.

use ocs_domain::{MatchOperator, ResultSet, StructuredQuery};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
	/// Keep the first result set, no correction.
	Original,
	Corrected { term: String, matches_all: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryState {
	Initial,
	RetryMatchAll { term: String },
	RetryMatchAny { term: String },
	Done(Resolution),
}

/// What one executed query revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation<'a> {
	pub empty: bool,
	pub query_blank: bool,
	pub fetches_products: bool,
	pub query: &'a str,
	pub suggestion: Option<&'a str>,
}
impl<'a> Observation<'a> {
	pub fn of(query: &'a StructuredQuery, result: &'a ResultSet) -> Self {
		Self {
			empty: result.is_empty(),
			query_blank: query.is_query_blank(),
			fetches_products: query.fetches_products(),
			query: query.query_text(),
			suggestion: result.suggestion(),
		}
	}
}

pub fn transition(state: RetryState, observation: &Observation<'_>) -> RetryState {
	match state {
		RetryState::Initial => {
			if !observation.fetches_products || !observation.empty || observation.query_blank {
				return RetryState::Done(Resolution::Original);
			}

			match observation.suggestion {
				Some(suggestion) => RetryState::RetryMatchAll { term: suggestion.to_string() },
				None => RetryState::RetryMatchAny { term: observation.query.to_string() },
			}
		},
		RetryState::RetryMatchAll { term } =>
			if observation.empty {
				RetryState::RetryMatchAny { term }
			} else {
				RetryState::Done(Resolution::Corrected { term, matches_all: true })
			},
		RetryState::RetryMatchAny { term } =>
			if observation.empty {
				RetryState::Done(Resolution::Original)
			} else {
				RetryState::Done(Resolution::Corrected { term, matches_all: false })
			},
		done @ RetryState::Done(_) => done,
	}
}

/// The copy of `query` a retry state executes, `None` once no retry is pending.
pub fn retry_query(
	state: &RetryState,
	query: &StructuredQuery,
	minimum_match: &str,
) -> Option<StructuredQuery> {
	match state {
		RetryState::RetryMatchAll { term } => {
			let mut attempt = query.clone();

			attempt.query = Some(term.clone());
			attempt.match_operator = Some(MatchOperator::And);

			Some(attempt)
		},
		RetryState::RetryMatchAny { term } => {
			let mut attempt = query.clone();

			attempt.query = Some(term.clone());
			attempt.match_operator = Some(MatchOperator::Or);
			attempt.minimum_match = Some(minimum_match.to_string());

			Some(attempt)
		},
		RetryState::Initial | RetryState::Done(_) => None,
	}
}

#[cfg(test)]
mod tests {
	use ocs_domain::{MatchOperator, StructuredQuery};

	use super::{Observation, Resolution, RetryState, retry_query, transition};

	fn observed(empty: bool, suggestion: Option<&str>) -> Observation<'_> {
		Observation { empty, query_blank: false, fetches_products: true, query: "jakcet", suggestion }
	}

	#[test]
	fn non_empty_first_page_is_final() {
		let state = transition(RetryState::Initial, &observed(false, Some("jacket")));
		assert_eq!(state, RetryState::Done(Resolution::Original));
	}

	#[test]
	fn blank_text_or_facet_only_queries_never_retry() {
		let blank = Observation { query_blank: true, ..observed(true, Some("jacket")) };
		let facet_only = Observation { fetches_products: false, ..observed(true, Some("jacket")) };

		assert_eq!(transition(RetryState::Initial, &blank), RetryState::Done(Resolution::Original));
		assert_eq!(
			transition(RetryState::Initial, &facet_only),
			RetryState::Done(Resolution::Original)
		);
	}

	#[test]
	fn suggestion_is_tried_with_all_terms_first() {
		let state = transition(RetryState::Initial, &observed(true, Some("jacket")));
		assert_eq!(state, RetryState::RetryMatchAll { term: "jacket".to_string() });

		let done = transition(state, &observed(false, None));
		assert_eq!(
			done,
			RetryState::Done(Resolution::Corrected { term: "jacket".to_string(), matches_all: true })
		);
	}

	#[test]
	fn match_any_uses_suggestion_then_gives_up() {
		let state = transition(RetryState::Initial, &observed(true, Some("jacket")));
		let state = transition(state, &observed(true, None));
		assert_eq!(state, RetryState::RetryMatchAny { term: "jacket".to_string() });

		let state = transition(state, &observed(true, None));
		assert_eq!(state, RetryState::Done(Resolution::Original));
	}

	#[test]
	fn match_any_without_suggestion_reuses_original_text() {
		let state = transition(RetryState::Initial, &observed(true, None));
		assert_eq!(state, RetryState::RetryMatchAny { term: "jakcet".to_string() });

		let done = transition(state, &observed(false, None));
		assert_eq!(
			done,
			RetryState::Done(Resolution::Corrected { term: "jakcet".to_string(), matches_all: false })
		);
	}

	#[test]
	fn retry_queries_are_copies() {
		let query = StructuredQuery::new("jakcet");
		let all = retry_query(&RetryState::RetryMatchAll { term: "jacket".to_string() }, &query, "2<-1")
			.expect("Expected retry.");
		let any = retry_query(&RetryState::RetryMatchAny { term: "jacket".to_string() }, &query, "2<-1")
			.expect("Expected retry.");

		assert_eq!(all.match_operator, Some(MatchOperator::And));
		assert_eq!(all.minimum_match, None);
		assert_eq!(any.match_operator, Some(MatchOperator::Or));
		assert_eq!(any.minimum_match.as_deref(), Some("2<-1"));
		assert_eq!(query.query_text(), "jakcet");
		assert!(retry_query(&RetryState::Done(Resolution::Original), &query, "2<-1").is_none());
	}
}
