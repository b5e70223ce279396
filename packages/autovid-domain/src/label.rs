/// Canonical specification record keyed by the vehicle's technical code.
#[derive(Debug, Clone, Default)]
pub struct DetailSource {
	pub brand_name: Option<String>,
	pub brand_acronym: Option<String>,
	pub model_description: Option<String>,
	pub version_description: Option<String>,
}

/// Trim-level fallback record, plus the model description found through its model code.
#[derive(Debug, Clone, Default)]
pub struct TrimSource {
	pub brand_acronym: Option<String>,
	pub trim_description: Option<String>,
	pub model_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleLabel {
	pub brand: String,
	pub model: String,
	pub trim: String,
	pub year: Option<i32>,
}
impl VehicleLabel {
	pub fn is_unresolved(&self) -> bool {
		self.brand.is_empty() && self.model.is_empty()
	}

	/// Words that earn title relevance, lower-cased and deduplicated in first-seen order.
	pub fn relevance_tokens(&self) -> Vec<String> {
		let year = self.year.map(|year| year.to_string()).unwrap_or_default();
		let mut tokens: Vec<String> = Vec::new();

		for part in [self.brand.as_str(), self.model.as_str(), self.trim.as_str(), year.as_str()] {
			for token in part.split(|c: char| !(c.is_alphanumeric() || c == '_')) {
				let token = token.to_lowercase();

				if token.chars().count() < 2 || tokens.contains(&token) {
					continue;
				}

				tokens.push(token);
			}
		}

		tokens
	}
}

/// Derives the label from whichever catalog chain resolved.
///
/// The detail record wins when present; otherwise the trim chain supplies what it can. Missing
/// pieces stay empty rather than failing.
pub fn compose_label(
	detail: Option<&DetailSource>,
	trim: Option<&TrimSource>,
	registration_year: Option<i32>,
) -> VehicleLabel {
	let year = registration_year.filter(|year| *year > 0);

	if let Some(detail) = detail {
		let brand = first_non_blank([detail.brand_name.as_deref(), detail.brand_acronym.as_deref()]);
		let model = first_non_blank([detail.model_description.as_deref()]);

		if !brand.is_empty() || !model.is_empty() {
			return VehicleLabel {
				brand,
				model,
				trim: first_non_blank([detail.version_description.as_deref()]),
				year,
			};
		}
	}

	let Some(trim) = trim else {
		return VehicleLabel { year, ..Default::default() };
	};

	VehicleLabel {
		brand: first_non_blank([trim.brand_acronym.as_deref()]),
		model: first_non_blank([trim.model_description.as_deref()]),
		trim: first_non_blank([trim.trim_description.as_deref()]),
		year,
	}
}

fn first_non_blank<const N: usize>(values: [Option<&str>; N]) -> String {
	values
		.into_iter()
		.flatten()
		.map(collapse_whitespace)
		.find(|value| !value.is_empty())
		.unwrap_or_default()
}

pub fn collapse_whitespace(text: &str) -> String {
	text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn detail_brand_falls_back_to_acronym() {
		let detail = DetailSource {
			brand_name: Some("  ".to_string()),
			brand_acronym: Some("ALFA".to_string()),
			model_description: Some("Giulia  2.2 ".to_string()),
			version_description: None,
		};
		let label = compose_label(Some(&detail), None, Some(2019));

		assert_eq!(label.brand, "ALFA");
		assert_eq!(label.model, "Giulia 2.2");
		assert_eq!(label.year, Some(2019));
	}

	#[test]
	fn empty_detail_defers_to_trim_chain() {
		let trim = TrimSource {
			brand_acronym: Some("FIAT".to_string()),
			trim_description: Some("Lounge".to_string()),
			model_description: Some("Panda".to_string()),
		};
		let label = compose_label(Some(&DetailSource::default()), Some(&trim), None);

		assert_eq!(label.brand, "FIAT");
		assert_eq!(label.model, "Panda");
		assert_eq!(label.trim, "Lounge");
	}

	#[test]
	fn relevance_tokens_are_distinct_and_skip_single_characters() {
		let label = VehicleLabel {
			brand: "Alfa Romeo".to_string(),
			model: "Giulia 2.2 Q".to_string(),
			trim: "Veloce".to_string(),
			year: Some(2020),
		};

		assert_eq!(label.relevance_tokens(), vec!["alfa", "romeo", "giulia", "veloce", "2020"]);
	}
}
