use serde::Serialize;
use time::OffsetDateTime;

use autovid_domain::diversity::{self, ChannelItem};
use autovid_storage::{models::StoredVideo, queries};

use crate::{Result, VideoService};

pub const THUMBNAIL_URL_PREFIX: &str = "https://i.ytimg.com/vi/";
pub const EMBED_URL_PREFIX: &str = "https://www.youtube-nocookie.com/embed/";

#[derive(Debug, Clone, Copy)]
pub struct ListingRequest {
	pub id_auto: i64,
	pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingResponse {
	pub items: Vec<ListingItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingItem {
	pub video_id: String,
	pub title: String,
	pub channel: String,
	#[serde(skip)]
	pub channel_id: String,
	#[serde(serialize_with = "crate::time_serde::option::serialize")]
	pub published_at: Option<OffsetDateTime>,
	pub duration_sec: i32,
	pub thumbnail: String,
	pub embed_url: String,
	pub pinned: bool,
}
impl From<StoredVideo> for ListingItem {
	fn from(row: StoredVideo) -> Self {
		Self {
			thumbnail: thumbnail_url(&row.video_id),
			embed_url: embed_url(&row.video_id),
			video_id: row.video_id,
			title: row.title,
			channel: row.channel_title,
			channel_id: row.channel_id,
			published_at: row.published_at,
			duration_sec: row.duration_sec,
			pinned: row.is_pinned,
		}
	}
}
impl ChannelItem for ListingItem {
	fn channel_id(&self) -> &str {
		&self.channel_id
	}

	fn channel_title(&self) -> &str {
		&self.channel
	}

	fn is_pinned(&self) -> bool {
		self.pinned
	}
}

impl VideoService {
	/// Read-only, channel-diversified listing for one vehicle.
	pub async fn list_videos(&self, req: ListingRequest) -> Result<ListingResponse> {
		let count = clamp_limit(
			req.limit,
			self.cfg.listing.default_limit,
			self.cfg.listing.candidate_window,
		);
		let rows = queries::list_public_candidates(
			&self.db.pool,
			req.id_auto,
			self.cfg.listing.candidate_window,
		)
		.await?;
		let candidates = rows.into_iter().map(ListingItem::from).collect::<Vec<_>>();
		let items = diversity::select_one_per_channel(candidates, count as usize);

		Ok(ListingResponse { items })
	}
}

pub fn clamp_limit(limit: Option<u32>, default_limit: u32, window: u32) -> u32 {
	limit.unwrap_or(default_limit).clamp(1, window.max(1))
}

pub fn thumbnail_url(video_id: &str) -> String {
	format!("{THUMBNAIL_URL_PREFIX}{video_id}/hqdefault.jpg")
}

pub fn embed_url(video_id: &str) -> String {
	format!("{EMBED_URL_PREFIX}{video_id}")
}
