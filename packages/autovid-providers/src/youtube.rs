use std::time::Duration as StdDuration;

use reqwest::Client;
use serde::Deserialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{Error, Result, duration};

pub const SEARCH_ENDPOINT: &str = "search";
pub const VIDEOS_ENDPOINT: &str = "videos";
pub const SEARCH_COST_UNITS: i64 = 100;
pub const DETAIL_COST_UNITS_PER_VIDEO: i64 = 1;
pub const MAX_IDS_PER_DETAIL_CALL: usize = 50;

const SEARCH_PART: &str = "snippet";
const VIDEOS_PART: &str = "snippet,contentDetails,statistics,status";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchListResponse {
	#[serde(default)]
	pub items: Vec<SearchResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
	pub id: Option<SearchResultId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
	pub kind: Option<String>,
	pub video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListResponse {
	#[serde(default)]
	pub items: Vec<VideoResource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResource {
	pub id: Option<String>,
	pub snippet: Option<VideoSnippet>,
	pub content_details: Option<VideoContentDetails>,
	pub statistics: Option<VideoStatistics>,
	pub status: Option<VideoStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
	pub title: Option<String>,
	pub channel_title: Option<String>,
	pub channel_id: Option<String>,
	pub published_at: Option<String>,
	pub live_broadcast_content: Option<String>,
	pub default_audio_language: Option<String>,
	pub default_language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoContentDetails {
	pub duration: Option<String>,
}

/// Counters arrive as decimal strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
	pub view_count: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatus {
	pub embeddable: Option<bool>,
	pub made_for_kids: Option<bool>,
}

/// Flattened view of one `videos` item with every optional field resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSummary {
	pub video_id: String,
	pub title: String,
	pub channel_title: String,
	pub channel_id: String,
	pub published_at: Option<OffsetDateTime>,
	pub duration_sec: u32,
	pub embeddable: bool,
	pub made_for_kids: bool,
	pub live_broadcast_content: Option<String>,
	pub view_count: u64,
	pub audio_lang: Option<String>,
}
impl VideoSummary {
	/// `None` when the item carries no id, since nothing could be stored for it.
	pub fn from_resource(resource: VideoResource) -> Option<Self> {
		let video_id = non_blank(resource.id)?;
		let snippet = resource.snippet.unwrap_or_default();
		let details = resource.content_details.unwrap_or_default();
		let statistics = resource.statistics.unwrap_or_default();
		let status = resource.status.unwrap_or_default();
		let duration_sec = details
			.duration
			.as_deref()
			.and_then(duration::parse_iso8601_seconds)
			.map(|seconds| u32::try_from(seconds).unwrap_or(u32::MAX))
			.unwrap_or(0);
		let published_at = snippet
			.published_at
			.as_deref()
			.and_then(|raw| OffsetDateTime::parse(raw, &Rfc3339).ok());
		let view_count =
			statistics.view_count.as_deref().and_then(|raw| raw.trim().parse().ok()).unwrap_or(0);

		Some(Self {
			video_id,
			title: clean_text(snippet.title),
			channel_title: clean_text(snippet.channel_title),
			channel_id: clean_text(snippet.channel_id),
			published_at,
			duration_sec,
			// Search already asked for embeddable videos; only an explicit false disqualifies.
			embeddable: status.embeddable.unwrap_or(true),
			made_for_kids: status.made_for_kids.unwrap_or(false),
			live_broadcast_content: non_blank(snippet.live_broadcast_content),
			view_count,
			audio_lang: non_blank(snippet.default_audio_language)
				.or_else(|| non_blank(snippet.default_language)),
		})
	}
}

pub struct YoutubeClient {
	http: Client,
	api_base: String,
	api_key: String,
	locale: String,
	region: String,
	max_results: u32,
}
impl YoutubeClient {
	pub fn new(cfg: &autovid_config::YoutubeProviderConfig) -> Result<Self> {
		let api_key = cfg
			.api_key
			.clone()
			.filter(|key| !key.trim().is_empty())
			.ok_or_else(|| Error::InvalidRequest { message: "Missing API key.".to_string() })?;
		let http = Client::builder().timeout(StdDuration::from_millis(cfg.timeout_ms)).build()?;

		Ok(Self {
			http,
			api_base: cfg.api_base.trim_end_matches('/').to_string(),
			api_key,
			locale: cfg.locale.clone(),
			region: cfg.region.clone(),
			max_results: cfg.max_results,
		})
	}

	/// Runs one text search and returns the video ids in relevance order.
	pub async fn search(&self, query: &str) -> Result<Vec<String>> {
		let url = format!("{}/{SEARCH_ENDPOINT}", self.api_base);
		let max_results = self.max_results.to_string();
		let res = self
			.http
			.get(url)
			.query(&[
				("part", SEARCH_PART),
				("q", query),
				("type", "video"),
				("maxResults", max_results.as_str()),
				("relevanceLanguage", self.locale.as_str()),
				("regionCode", self.region.as_str()),
				("videoEmbeddable", "true"),
				("safeSearch", "moderate"),
				("order", "relevance"),
				("key", self.api_key.as_str()),
			])
			.send()
			.await?;
		let status = res.status();

		if !status.is_success() {
			return Err(Error::Status { endpoint: SEARCH_ENDPOINT, status });
		}

		let body = res.text().await?;
		let ids = parse_search_response(&body)?;

		tracing::debug!(query, results = ids.len(), "Search call completed.");

		Ok(ids)
	}

	/// Fetches full metadata for at most [`MAX_IDS_PER_DETAIL_CALL`] ids.
	pub async fn videos(&self, ids: &[String]) -> Result<Vec<VideoSummary>> {
		if ids.is_empty() {
			return Ok(Vec::new());
		}
		if ids.len() > MAX_IDS_PER_DETAIL_CALL {
			return Err(Error::InvalidRequest {
				message: format!(
					"Detail lookup accepts at most {MAX_IDS_PER_DETAIL_CALL} ids, got {}.",
					ids.len()
				),
			});
		}

		let url = format!("{}/{VIDEOS_ENDPOINT}", self.api_base);
		let joined = ids.join(",");
		let res = self
			.http
			.get(url)
			.query(&[("part", VIDEOS_PART), ("id", joined.as_str()), ("key", self.api_key.as_str())])
			.send()
			.await?;
		let status = res.status();

		if !status.is_success() {
			return Err(Error::Status { endpoint: VIDEOS_ENDPOINT, status });
		}

		let body = res.text().await?;
		let videos = parse_videos_response(&body)?;

		tracing::debug!(requested = ids.len(), returned = videos.len(), "Detail call completed.");

		Ok(videos)
	}
}

pub fn parse_search_response(body: &str) -> Result<Vec<String>> {
	let parsed: SearchListResponse = serde_json::from_str(body)?;
	let mut ids: Vec<String> = Vec::with_capacity(parsed.items.len());

	for item in parsed.items {
		let Some(id) = item.id else { continue };

		if id.kind.as_deref().map(|kind| kind != "youtube#video").unwrap_or(false) {
			continue;
		}

		let Some(video_id) = non_blank(id.video_id) else { continue };

		if !ids.contains(&video_id) {
			ids.push(video_id);
		}
	}

	Ok(ids)
}

pub fn parse_videos_response(body: &str) -> Result<Vec<VideoSummary>> {
	let parsed: VideoListResponse = serde_json::from_str(body)?;

	Ok(parsed.items.into_iter().filter_map(VideoSummary::from_resource).collect())
}

/// Postgres text columns reject NUL, so it never leaves the parser.
fn clean_text(value: Option<String>) -> String {
	value.map(|value| value.replace('\0', "")).unwrap_or_default()
}

fn non_blank(value: Option<String>) -> Option<String> {
	Some(clean_text(value).trim().to_string()).filter(|value| !value.is_empty())
}
