use time::OffsetDateTime;

use crate::policy::TitlePolicy;

pub const MAX_DURATION_SEC: u32 = 45 * 60;

/// Normalized detail facts for one candidate video.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoFacts {
	pub video_id: String,
	pub title: String,
	pub channel_title: String,
	pub channel_id: String,
	pub published_at: Option<OffsetDateTime>,
	pub duration_sec: u32,
	pub embeddable: bool,
	pub made_for_kids: bool,
	/// `None` when the API omitted the field, which is treated like `"none"`.
	pub live_broadcast_content: Option<String>,
	pub view_count: u64,
	pub audio_lang: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
	LiveOrUpcoming,
	MadeForKids,
	NotEmbeddable,
	BlockedTitle,
	TooLong,
}
impl Exclusion {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::LiveOrUpcoming => "live_or_upcoming",
			Self::MadeForKids => "made_for_kids",
			Self::NotEmbeddable => "not_embeddable",
			Self::BlockedTitle => "blocked_title",
			Self::TooLong => "too_long",
		}
	}
}

/// First hard rule the candidate violates, if any.
pub fn exclusion(facts: &VideoFacts, policy: &TitlePolicy) -> Option<Exclusion> {
	if facts
		.live_broadcast_content
		.as_deref()
		.map(|value| !value.eq_ignore_ascii_case("none"))
		.unwrap_or(false)
	{
		return Some(Exclusion::LiveOrUpcoming);
	}
	if facts.made_for_kids {
		return Some(Exclusion::MadeForKids);
	}
	if !facts.embeddable {
		return Some(Exclusion::NotEmbeddable);
	}
	if policy.is_blocked(&facts.title) {
		return Some(Exclusion::BlockedTitle);
	}
	if facts.duration_sec > MAX_DURATION_SEC {
		return Some(Exclusion::TooLong);
	}

	None
}
