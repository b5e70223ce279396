/// Parses the ISO-8601 durations the video API emits (`PT4M13S`, `PT1H`, `P1DT2H3M`, `P0D`).
///
/// Calendar units (years, months) have no fixed length and are rejected.
pub fn parse_iso8601_seconds(raw: &str) -> Option<u64> {
	let rest = raw.trim().strip_prefix('P')?;
	let mut total: u64 = 0;
	let mut number = String::new();
	let mut in_time = false;
	let mut saw_unit = false;

	for c in rest.chars() {
		match c {
			'0'..='9' => number.push(c),
			// Fractional seconds are truncated.
			'.' | ',' if in_time => number.push('.'),
			'T' => {
				if in_time || !number.is_empty() {
					return None;
				}

				in_time = true;
			},
			unit => {
				let value = take_number(&mut number)?;
				let factor = match (in_time, unit) {
					(false, 'W') => 7 * 86_400,
					(false, 'D') => 86_400,
					(true, 'H') => 3_600,
					(true, 'M') => 60,
					(true, 'S') => 1,
					_ => return None,
				};

				total = total.checked_add(value.checked_mul(factor)?)?;
				saw_unit = true;
			},
		}
	}

	if !number.is_empty() || !saw_unit {
		return None;
	}

	Some(total)
}

fn take_number(number: &mut String) -> Option<u64> {
	if number.is_empty() {
		return None;
	}

	let whole = number.split('.').next().unwrap_or_default();
	let value = if whole.is_empty() { 0 } else { whole.parse().ok()? };

	number.clear();

	Some(value)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_common_shapes() {
		assert_eq!(parse_iso8601_seconds("PT10M12S"), Some(612));
		assert_eq!(parse_iso8601_seconds("PT1H"), Some(3_600));
		assert_eq!(parse_iso8601_seconds("PT45S"), Some(45));
		assert_eq!(parse_iso8601_seconds("P1DT2H3M4S"), Some(93_784));
		assert_eq!(parse_iso8601_seconds("P0D"), Some(0));
		assert_eq!(parse_iso8601_seconds("PT1.5S"), Some(1));
	}

	#[test]
	fn rejects_malformed_input() {
		assert_eq!(parse_iso8601_seconds(""), None);
		assert_eq!(parse_iso8601_seconds("P"), None);
		assert_eq!(parse_iso8601_seconds("PT"), None);
		assert_eq!(parse_iso8601_seconds("10M"), None);
		assert_eq!(parse_iso8601_seconds("P1M"), None);
		assert_eq!(parse_iso8601_seconds("PT5"), None);
		assert_eq!(parse_iso8601_seconds("PTM"), None);
	}
}
