use sqlx::{PgConnection, PgExecutor};

use crate::{
	Error, Result,
	models::{StoredVideo, UpsertOutcome, VideoRefresh, VideoUpsert},
};

/// Namespace for per-vehicle advisory locks, so they never collide with other lock users.
pub const AUTO_LOCK_NAMESPACE: i32 = 0x4156;

/// Takes the per-vehicle lock for the lifetime of the surrounding transaction.
///
/// Returns `false` when another run holds it. The caller must skip the vehicle.
pub async fn try_lock_auto(conn: &mut PgConnection, id_auto: i64) -> Result<bool> {
	let locked: bool = sqlx::query_scalar("SELECT pg_try_advisory_xact_lock($1, $2)")
		.bind(AUTO_LOCK_NAMESPACE)
		.bind(auto_lock_key(id_auto))
		.fetch_one(conn)
		.await?;

	Ok(locked)
}

/// Folds the vehicle id into the 32-bit key space of the two-argument lock form.
pub fn auto_lock_key(id_auto: i64) -> i32 {
	(id_auto as u64 & 0xFFFF_FFFF) as u32 as i32
}

pub async fn upsert_video<'e, E>(executor: E, video: &VideoUpsert) -> Result<UpsertOutcome>
where
	E: PgExecutor<'e>,
{
	let inserted: bool = sqlx::query_scalar(
		"\
INSERT INTO auto_videos (
	id_auto,
	video_id,
	title,
	channel_title,
	channel_id,
	published_at,
	duration_sec,
	embeddable,
	view_count,
	rank_score,
	source_query,
	audio_lang,
	is_pinned,
	is_blacklisted,
	error_count,
	checked_at,
	created_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, false, false, 0, $13, $13)
ON CONFLICT (id_auto, video_id) DO UPDATE
SET
	title = EXCLUDED.title,
	channel_title = EXCLUDED.channel_title,
	channel_id = EXCLUDED.channel_id,
	published_at = COALESCE(EXCLUDED.published_at, auto_videos.published_at),
	duration_sec = EXCLUDED.duration_sec,
	embeddable = EXCLUDED.embeddable,
	view_count = EXCLUDED.view_count,
	rank_score = EXCLUDED.rank_score,
	source_query = EXCLUDED.source_query,
	audio_lang = EXCLUDED.audio_lang,
	checked_at = EXCLUDED.checked_at
RETURNING (xmax = 0) AS inserted",
	)
	.bind(video.id_auto)
	.bind(video.video_id.as_str())
	.bind(video.title.as_str())
	.bind(video.channel_title.as_str())
	.bind(video.channel_id.as_str())
	.bind(video.published_at)
	.bind(video.duration_sec)
	.bind(video.embeddable)
	.bind(video.view_count)
	.bind(video.rank_score)
	.bind(video.source_query.as_str())
	.bind(video.audio_lang.as_deref())
	.bind(video.checked_at)
	.fetch_one(executor)
	.await?;

	Ok(if inserted { UpsertOutcome::Inserted } else { UpsertOutcome::Updated })
}

/// Metrics-only refresh of an existing row. Returns `false` when the row is gone.
pub async fn refresh_video_metrics<'e, E>(executor: E, video: &VideoRefresh) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query(
		"\
UPDATE auto_videos
SET
	title = $3,
	channel_title = $4,
	channel_id = $5,
	published_at = COALESCE($6, published_at),
	duration_sec = $7,
	embeddable = $8,
	view_count = $9,
	audio_lang = $10,
	checked_at = $11
WHERE id_auto = $1 AND video_id = $2",
	)
	.bind(video.id_auto)
	.bind(video.video_id.as_str())
	.bind(video.title.as_str())
	.bind(video.channel_title.as_str())
	.bind(video.channel_id.as_str())
	.bind(video.published_at)
	.bind(video.duration_sec)
	.bind(video.embeddable)
	.bind(video.view_count)
	.bind(video.audio_lang.as_deref())
	.bind(video.checked_at)
	.execute(executor)
	.await?;

	Ok(result.rows_affected() > 0)
}

/// Deletes rows ranked beyond `keep` for one vehicle. Pinned rows always survive.
pub async fn trim_videos<'e, E>(executor: E, id_auto: i64, keep: u32) -> Result<u64>
where
	E: PgExecutor<'e>,
{
	if keep == 0 {
		return Err(Error::InvalidArgument("Retention cap must be greater than zero.".to_string()));
	}

	let result = sqlx::query(
		"\
WITH ranked AS (
	SELECT
		video_id,
		is_pinned,
		ROW_NUMBER() OVER (
			ORDER BY
				is_pinned DESC,
				is_blacklisted ASC,
				rank_score DESC,
				published_at DESC NULLS LAST,
				video_id ASC
		) AS position
	FROM auto_videos
	WHERE id_auto = $1
)
DELETE FROM auto_videos v
USING ranked r
WHERE v.id_auto = $1
	AND v.video_id = r.video_id
	AND r.position > $2
	AND NOT r.is_pinned",
	)
	.bind(id_auto)
	.bind(i64::from(keep))
	.execute(executor)
	.await?;

	Ok(result.rows_affected())
}

/// Top `window` listable rows for one vehicle, best first.
pub async fn list_public_candidates<'e, E>(
	executor: E,
	id_auto: i64,
	window: u32,
) -> Result<Vec<StoredVideo>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, StoredVideo>(
		"\
SELECT
	id_auto,
	video_id,
	title,
	channel_title,
	channel_id,
	published_at,
	duration_sec,
	embeddable,
	view_count,
	rank_score,
	source_query,
	audio_lang,
	is_pinned,
	is_blacklisted,
	error_count,
	checked_at,
	created_at
FROM auto_videos
WHERE id_auto = $1
	AND NOT is_blacklisted
	AND embeddable
ORDER BY is_pinned DESC, rank_score DESC, published_at DESC NULLS LAST, video_id ASC
LIMIT $2",
	)
	.bind(id_auto)
	.bind(i64::from(window))
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn list_videos<'e, E>(executor: E, id_auto: i64) -> Result<Vec<StoredVideo>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, StoredVideo>(
		"\
SELECT
	id_auto,
	video_id,
	title,
	channel_title,
	channel_id,
	published_at,
	duration_sec,
	embeddable,
	view_count,
	rank_score,
	source_query,
	audio_lang,
	is_pinned,
	is_blacklisted,
	error_count,
	checked_at,
	created_at
FROM auto_videos
WHERE id_auto = $1
ORDER BY video_id ASC",
	)
	.bind(id_auto)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn stored_video_ids<'e, E>(executor: E, id_auto: i64) -> Result<Vec<String>>
where
	E: PgExecutor<'e>,
{
	let ids: Vec<String> = sqlx::query_scalar(
		"SELECT video_id FROM auto_videos WHERE id_auto = $1 ORDER BY checked_at ASC, video_id ASC",
	)
	.bind(id_auto)
	.fetch_all(executor)
	.await?;

	Ok(ids)
}

/// Marks every row of a vehicle after a failed pass. A vehicle without rows is untouched.
pub async fn bump_error_count<'e, E>(executor: E, id_auto: i64) -> Result<u64>
where
	E: PgExecutor<'e>,
{
	let result =
		sqlx::query("UPDATE auto_videos SET error_count = error_count + 1 WHERE id_auto = $1")
			.bind(id_auto)
			.execute(executor)
			.await?;

	Ok(result.rows_affected())
}

/// Operator curation. The sync pipeline never calls this.
pub async fn set_curation<'e, E>(
	executor: E,
	id_auto: i64,
	video_id: &str,
	is_pinned: bool,
	is_blacklisted: bool,
) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query(
		"\
UPDATE auto_videos
SET is_pinned = $3, is_blacklisted = $4
WHERE id_auto = $1 AND video_id = $2",
	)
	.bind(id_auto)
	.bind(video_id)
	.bind(is_pinned)
	.bind(is_blacklisted)
	.execute(executor)
	.await?;

	Ok(result.rows_affected() > 0)
}
