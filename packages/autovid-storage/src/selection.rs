//! Vehicle selection for the three job modes.
//!
//! Revalidation keys on the oldest row (`MIN(checked_at)`) while the sweep keys on the newest
//! (`MAX(checked_at)`). Vehicles without rows compare as the epoch in both.

use sqlx::PgExecutor;
use time::{Duration, OffsetDateTime};

use crate::Result;

pub async fn select_discovery_batch<'e, E>(executor: E, batch_size: u32) -> Result<Vec<i64>>
where
	E: PgExecutor<'e>,
{
	let ids: Vec<i64> = sqlx::query_scalar(
		"\
SELECT a.id_auto
FROM autos a
LEFT JOIN auto_videos v ON v.id_auto = a.id_auto
GROUP BY a.id_auto
ORDER BY
	(COUNT(v.video_id) = 0) DESC,
	(COUNT(v.video_id) < 3) DESC,
	COALESCE(MIN(v.checked_at), 'epoch'::timestamptz) ASC,
	COUNT(v.video_id) FILTER (WHERE v.error_count > 0) ASC,
	a.id_auto ASC
LIMIT $1",
	)
	.bind(i64::from(batch_size))
	.fetch_all(executor)
	.await?;

	Ok(ids)
}

pub async fn select_revalidation_batch<'e, E>(
	executor: E,
	now: OffsetDateTime,
	revalidate_hours: i64,
	batch_size: u32,
) -> Result<Vec<i64>>
where
	E: PgExecutor<'e>,
{
	let cutoff = now - Duration::hours(revalidate_hours);
	let ids: Vec<i64> = sqlx::query_scalar(
		"\
SELECT a.id_auto
FROM autos a
LEFT JOIN auto_videos v ON v.id_auto = a.id_auto
GROUP BY a.id_auto
HAVING COALESCE(MIN(v.checked_at), 'epoch'::timestamptz) < $1
ORDER BY COALESCE(MIN(v.checked_at), 'epoch'::timestamptz) ASC, a.id_auto ASC
LIMIT $2",
	)
	.bind(cutoff)
	.bind(i64::from(batch_size) * 2)
	.fetch_all(executor)
	.await?;

	Ok(ids)
}

pub async fn select_sweep_batch<'e, E>(
	executor: E,
	now: OffsetDateTime,
	stale_days: i64,
	sweep_limit: u32,
) -> Result<Vec<i64>>
where
	E: PgExecutor<'e>,
{
	let cutoff = now - Duration::days(stale_days);
	let ids: Vec<i64> = sqlx::query_scalar(
		"\
SELECT a.id_auto
FROM autos a
LEFT JOIN auto_videos v ON v.id_auto = a.id_auto
GROUP BY a.id_auto
HAVING COALESCE(MAX(v.checked_at), 'epoch'::timestamptz) < $1
ORDER BY COALESCE(MAX(v.checked_at), 'epoch'::timestamptz) ASC, a.id_auto ASC
LIMIT $2",
	)
	.bind(cutoff)
	.bind(i64::from(sweep_limit))
	.fetch_all(executor)
	.await?;

	Ok(ids)
}
