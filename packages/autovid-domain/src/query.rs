use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;

use crate::label::{VehicleLabel, collapse_whitespace};

pub const QUERY_SUFFIXES: [&str; 5] = ["", "review", "test drive", "prova su strada", "sound exhaust"];
pub const YEAR_QUERY_SUFFIXES: [&str; 3] = ["", "review", "test drive"];
pub const SOURCE_QUERY_SEPARATOR: &str = ";";

static YEAR_TOKEN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\b(?:19[89]\d|20\d{2})\b").expect("Invalid year regex."));

/// Builds the search queries for one vehicle, sorted and deduplicated.
///
/// An empty brand and model yields no queries.
pub fn build_queries(brand: &str, model: &str, year: Option<i32>) -> Vec<String> {
	let base = collapse_whitespace(&format!("{brand} {model}"));

	if base.is_empty() {
		return Vec::new();
	}

	let mut queries = BTreeSet::new();

	for suffix in QUERY_SUFFIXES {
		push_query(&mut queries, &format!("{base} {suffix}"));
	}

	if let Some(year) = year
		&& !contains_year_token(model)
	{
		for suffix in YEAR_QUERY_SUFFIXES {
			push_query(&mut queries, &format!("{base} {suffix} {year}"));
		}
	}

	queries.into_iter().collect()
}

pub fn queries_for_label(label: &VehicleLabel) -> Vec<String> {
	build_queries(&label.brand, &label.model, label.year)
}

pub fn contains_year_token(text: &str) -> bool {
	YEAR_TOKEN.is_match(text)
}

/// Diagnostic form stored on every row touched by a discovery pass.
pub fn join_source_query(queries: &[String]) -> String {
	queries.join(SOURCE_QUERY_SEPARATOR)
}

fn push_query(queries: &mut BTreeSet<String>, raw: &str) {
	let query = collapse_whitespace(raw);

	if !query.is_empty() {
		queries.insert(query);
	}
}
