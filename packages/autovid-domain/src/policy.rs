use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

pub const BLOCKED_TITLE_TERMS: [&str; 6] =
	["assetto corsa", "forza horizon", "gran turismo", "gt7", "gameplay", "simulator"];
pub const SOUND_TITLE_TERMS: [&str; 7] =
	["sound check", "sound", "exhaust", "scarico", "pov", "acceleration", "revving"];

static BLOCKED_TITLE: LazyLock<Option<Regex>> = LazyLock::new(|| {
	alternation(&BLOCKED_TITLE_TERMS, false).expect("Invalid blocked title regex.")
});
static SOUND_TITLE: LazyLock<Option<Regex>> =
	LazyLock::new(|| alternation(&SOUND_TITLE_TERMS, true).expect("Invalid sound title regex."));

/// Title rules used by the hard filter and the duration-shape score.
#[derive(Debug, Clone)]
pub struct TitlePolicy {
	blocked: Option<Regex>,
	sound: Option<Regex>,
}
impl TitlePolicy {
	pub fn from_terms(blocked: &[&str], sound: &[&str]) -> Result<Self, regex::Error> {
		Ok(Self { blocked: alternation(blocked, false)?, sound: alternation(sound, true)? })
	}

	/// Simulator and gameplay footage, matched as a case-insensitive substring.
	pub fn is_blocked(&self, title: &str) -> bool {
		self.blocked.as_ref().is_some_and(|re| re.is_match(title))
	}

	pub fn matches_sound_pattern(&self, title: &str) -> bool {
		self.sound.as_ref().is_some_and(|re| re.is_match(title))
	}
}
impl Default for TitlePolicy {
	fn default() -> Self {
		Self { blocked: BLOCKED_TITLE.clone(), sound: SOUND_TITLE.clone() }
	}
}

/// `None` for an empty term list, which matches nothing.
fn alternation(terms: &[&str], word_bounded: bool) -> Result<Option<Regex>, regex::Error> {
	let escaped = terms
		.iter()
		.map(|term| term.trim())
		.filter(|term| !term.is_empty())
		.map(regex::escape)
		.collect::<Vec<_>>();

	if escaped.is_empty() {
		return Ok(None);
	}

	let body = escaped.join("|");
	let pattern = if word_bounded { format!(r"\b(?:{body})\b") } else { format!("(?:{body})") };

	RegexBuilder::new(&pattern).case_insensitive(true).build().map(Some)
}
