pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

/// DDL for the read-only catalog tables. Only test databases create these.
pub fn render_catalog_fixture() -> String {
	include_str!("../../../sql/fixtures/catalog.sql").to_string()
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_auto_videos.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_auto_videos.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn includes_are_inlined() {
		let sql = render_schema();

		assert!(sql.contains("CREATE TABLE IF NOT EXISTS auto_videos"));
		assert!(!sql.contains("\\ir "));
	}
}
