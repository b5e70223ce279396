use time::OffsetDateTime;

use crate::{filter::VideoFacts, label::VehicleLabel, policy::TitlePolicy};

pub const TITLE_TOKEN_WEIGHT: f64 = 1.0;
pub const RECENCY_MAX: f64 = 1.5;
pub const RECENCY_WINDOW_DAYS: f64 = 90.0;
pub const POPULARITY_MAX: f64 = 1.5;
pub const CHANNEL_TRUST_BONUS: f64 = 0.8;
pub const LANGUAGE_MATCH_BONUS: f64 = 0.6;
pub const LANGUAGE_MISMATCH_PENALTY: f64 = -0.6;
pub const OVERLONG_PENALTY: f64 = -9.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Everything the score depends on besides the candidate itself.
///
/// `now` is part of the context so that repeated passes over the same input produce the same
/// score.
#[derive(Debug, Clone)]
pub struct ScoringContext {
	tokens: Vec<String>,
	whitelist: Vec<String>,
	locale: String,
	policy: TitlePolicy,
	now: OffsetDateTime,
}
impl ScoringContext {
	pub fn new(
		label: &VehicleLabel,
		channel_whitelist: &[String],
		locale: &str,
		policy: TitlePolicy,
		now: OffsetDateTime,
	) -> Self {
		Self {
			tokens: label.relevance_tokens(),
			whitelist: channel_whitelist
				.iter()
				.map(|name| name.trim().to_lowercase())
				.filter(|name| !name.is_empty())
				.collect(),
			locale: locale.trim().to_lowercase(),
			policy,
			now,
		}
	}

	pub fn policy(&self) -> &TitlePolicy {
		&self.policy
	}

	pub fn now(&self) -> OffsetDateTime {
		self.now
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
	pub title: f64,
	pub recency: f64,
	pub popularity: f64,
	pub duration: f64,
	pub channel: f64,
	pub language: f64,
}
impl ScoreBreakdown {
	/// Sum of all terms, rounded to two decimals.
	pub fn total(&self) -> f64 {
		let sum = self.title
			+ self.recency
			+ self.popularity
			+ self.duration
			+ self.channel
			+ self.language;

		round2(sum)
	}
}

pub fn score(facts: &VideoFacts, ctx: &ScoringContext) -> f64 {
	breakdown(facts, ctx).total()
}

pub fn breakdown(facts: &VideoFacts, ctx: &ScoringContext) -> ScoreBreakdown {
	ScoreBreakdown {
		title: title_relevance(&facts.title, &ctx.tokens),
		recency: recency(facts.published_at, ctx.now),
		popularity: popularity(facts.view_count),
		duration: duration_shape(facts.duration_sec, &facts.title, &ctx.policy),
		channel: channel_trust(&facts.channel_title, &ctx.whitelist),
		language: language(facts.audio_lang.as_deref(), &ctx.locale),
	}
}

pub fn title_relevance(title: &str, tokens: &[String]) -> f64 {
	let title = title.to_lowercase();

	tokens.iter().filter(|token| title.contains(token.as_str())).count() as f64
		* TITLE_TOKEN_WEIGHT
}

pub fn recency(published_at: Option<OffsetDateTime>, now: OffsetDateTime) -> f64 {
	let Some(published_at) = published_at else {
		return 0.0;
	};
	let age_days = ((now - published_at).as_seconds_f64() / SECONDS_PER_DAY).max(0.0);

	(RECENCY_MAX - age_days / RECENCY_WINDOW_DAYS * RECENCY_MAX).max(0.0)
}

pub fn popularity(view_count: u64) -> f64 {
	((view_count as f64 + 1.0).log10() / 2.0).min(POPULARITY_MAX)
}

pub fn duration_shape(duration_sec: u32, title: &str, policy: &TitlePolicy) -> f64 {
	match duration_sec {
		180..=1_200 => 1.0,
		1_201..=1_800 => 0.5,
		1_801..=2_700 => 0.2,
		0..180 =>
			if policy.matches_sound_pattern(title) {
				0.2
			} else {
				0.0
			},
		_ => OVERLONG_PENALTY,
	}
}

pub fn channel_trust(channel_title: &str, whitelist: &[String]) -> f64 {
	let channel = channel_title.trim().to_lowercase();

	if !channel.is_empty() && whitelist.iter().any(|name| *name == channel) {
		CHANNEL_TRUST_BONUS
	} else {
		0.0
	}
}

pub fn language(audio_lang: Option<&str>, locale: &str) -> f64 {
	let Some(lang) = audio_lang.map(|lang| lang.trim().to_lowercase()).filter(|lang| !lang.is_empty())
	else {
		return 0.0;
	};

	if !locale.is_empty() && lang.starts_with(locale) {
		LANGUAGE_MATCH_BONUS
	} else {
		LANGUAGE_MISMATCH_PENALTY
	}
}

pub fn round2(value: f64) -> f64 {
	(value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn recency_decays_linearly_to_zero() {
		let now = OffsetDateTime::UNIX_EPOCH + time::Duration::days(1_000);

		assert_eq!(recency(Some(now), now), 1.5);
		assert!((recency(Some(now - time::Duration::days(45)), now) - 0.75).abs() < 1e-9);
		assert_eq!(recency(Some(now - time::Duration::days(90)), now), 0.0);
		assert_eq!(recency(Some(now - time::Duration::days(400)), now), 0.0);
		assert_eq!(recency(None, now), 0.0);
	}

	#[test]
	fn future_publish_dates_do_not_exceed_the_cap() {
		let now = OffsetDateTime::UNIX_EPOCH + time::Duration::days(10);

		assert_eq!(recency(Some(now + time::Duration::days(3)), now), 1.5);
	}

	#[test]
	fn popularity_saturates() {
		assert_eq!(popularity(0), 0.0);
		assert!((popularity(99) - 1.0).abs() < 1e-9);
		assert_eq!(popularity(10_000_000), 1.5);
	}

	#[test]
	fn duration_bands() {
		let policy = TitlePolicy::default();

		assert_eq!(duration_shape(180, "review", &policy), 1.0);
		assert_eq!(duration_shape(1_200, "review", &policy), 1.0);
		assert_eq!(duration_shape(1_500, "review", &policy), 0.5);
		assert_eq!(duration_shape(2_700, "review", &policy), 0.2);
		assert_eq!(duration_shape(2_701, "review", &policy), -9.0);
		assert_eq!(duration_shape(60, "exhaust sound", &policy), 0.2);
		assert_eq!(duration_shape(60, "quick look", &policy), 0.0);
	}

	#[test]
	fn language_rewards_locale_prefix() {
		assert_eq!(language(Some("it-IT"), "it"), 0.6);
		assert_eq!(language(Some("en"), "it"), -0.6);
		assert_eq!(language(Some(" "), "it"), 0.0);
		assert_eq!(language(None, "it"), 0.0);
	}
}
