use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub sync: Sync,
	#[serde(default)]
	pub scoring: Scoring,
	#[serde(default)]
	pub listing: Listing,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub youtube: YoutubeProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YoutubeProviderConfig {
	#[serde(default = "default_youtube_api_base")]
	pub api_base: String,
	/// Optional. Jobs refuse to run without it; `YOUTUBE_API_KEY` overrides the file value.
	pub api_key: Option<String>,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	/// Target locale code, used as `relevanceLanguage` and for the language score.
	#[serde(default = "default_locale")]
	pub locale: String,
	#[serde(default = "default_region")]
	pub region: String,
	#[serde(default = "default_max_results")]
	pub max_results: u32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Sync {
	pub batch_size: u32,
	pub daily_cap: i64,
	pub keep_per_auto: u32,
	pub revalidate_hours: i64,
	pub stale_days: i64,
	pub sweep_limit: u32,
}
impl Default for Sync {
	fn default() -> Self {
		Self {
			batch_size: 8,
			daily_cap: 3_500,
			keep_per_auto: 20,
			revalidate_hours: 72,
			stale_days: 30,
			sweep_limit: 50,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Scoring {
	/// Editorial channels that earn the channel-trust bonus. Matched case-insensitively.
	pub channel_whitelist: Vec<String>,
}
impl Default for Scoring {
	fn default() -> Self {
		Self {
			channel_whitelist: [
				"Quattroruote",
				"alVolante",
				"Motor1 Italia",
				"HDmotori.it",
				"OmniAuto.it",
				"Automoto.it",
				"Autoblog Italia",
				"carwow Italia",
				"Motorbox",
				"Top Gear",
			]
			.into_iter()
			.map(str::to_string)
			.collect(),
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Listing {
	pub default_limit: u32,
	pub candidate_window: u32,
}
impl Default for Listing {
	fn default() -> Self {
		Self { default_limit: 6, candidate_window: 30 }
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Security {
	pub admin_auth_token: Option<String>,
}

fn default_youtube_api_base() -> String {
	"https://www.googleapis.com/youtube/v3".to_string()
}

fn default_timeout_ms() -> u64 {
	12_000
}

fn default_locale() -> String {
	"it".to_string()
}

fn default_region() -> String {
	"IT".to_string()
}

fn default_max_results() -> u32 {
	10
}
