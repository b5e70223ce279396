//! Read-only lookups against the vehicle catalog tables.

use sqlx::PgExecutor;

use crate::{
	Result,
	models::{AutoRecord, SpecDetailRow, SpecTrimRow},
};

pub async fn fetch_auto<'e, E>(executor: E, id_auto: i64) -> Result<Option<AutoRecord>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, AutoRecord>(
		"\
SELECT id_auto, tech_code, registration_year, owner_id
FROM autos
WHERE id_auto = $1",
	)
	.bind(id_auto)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

pub async fn fetch_spec_detail<'e, E>(executor: E, tech_code: &str) -> Result<Option<SpecDetailRow>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, SpecDetailRow>(
		"\
SELECT brand_name, brand_acronym, model_description, version_description
FROM spec_details
WHERE tech_code = $1",
	)
	.bind(tech_code)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

pub async fn fetch_spec_trim<'e, E>(executor: E, tech_code: &str) -> Result<Option<SpecTrimRow>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, SpecTrimRow>(
		"\
SELECT t.brand_acronym, t.trim_description, m.model_description
FROM spec_trims t
LEFT JOIN spec_models m
	ON m.brand_acronym = t.brand_acronym
	AND m.model_code = t.model_code
WHERE t.tech_code = $1",
	)
	.bind(tech_code)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}
