use time::OffsetDateTime;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredVideo {
	pub id_auto: i64,
	pub video_id: String,
	pub title: String,
	pub channel_title: String,
	pub channel_id: String,
	pub published_at: Option<OffsetDateTime>,
	pub duration_sec: i32,
	pub embeddable: bool,
	pub view_count: i64,
	pub rank_score: f64,
	pub source_query: String,
	pub audio_lang: Option<String>,
	pub is_pinned: bool,
	pub is_blacklisted: bool,
	pub error_count: i32,
	pub checked_at: OffsetDateTime,
	pub created_at: OffsetDateTime,
}

/// Fields written by a discovery pass. Curation flags and `error_count` are not representable.
#[derive(Debug, Clone)]
pub struct VideoUpsert {
	pub id_auto: i64,
	pub video_id: String,
	pub title: String,
	pub channel_title: String,
	pub channel_id: String,
	pub published_at: Option<OffsetDateTime>,
	pub duration_sec: i32,
	pub embeddable: bool,
	pub view_count: i64,
	pub rank_score: f64,
	pub source_query: String,
	pub audio_lang: Option<String>,
	pub checked_at: OffsetDateTime,
}

/// Fields written by revalidation: the discovery set minus `rank_score` and `source_query`.
#[derive(Debug, Clone)]
pub struct VideoRefresh {
	pub id_auto: i64,
	pub video_id: String,
	pub title: String,
	pub channel_title: String,
	pub channel_id: String,
	pub published_at: Option<OffsetDateTime>,
	pub duration_sec: i32,
	pub embeddable: bool,
	pub view_count: i64,
	pub audio_lang: Option<String>,
	pub checked_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
	Inserted,
	Updated,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AutoRecord {
	pub id_auto: i64,
	pub tech_code: Option<String>,
	pub registration_year: Option<i32>,
	pub owner_id: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SpecDetailRow {
	pub brand_name: Option<String>,
	pub brand_acronym: Option<String>,
	pub model_description: Option<String>,
	pub version_description: Option<String>,
}

/// Trim record joined to its model-code record.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SpecTrimRow {
	pub brand_acronym: Option<String>,
	pub trim_description: Option<String>,
	pub model_description: Option<String>,
}
