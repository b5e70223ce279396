mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Listing, Postgres, Providers, Scoring, Security, Service, Storage, Sync,
	YoutubeProviderConfig,
};

use std::{env, fs, path::Path, str::FromStr};

pub const ENV_API_KEY: &str = "YOUTUBE_API_KEY";
pub const ENV_BATCH_SIZE: &str = "VIDEO_BATCH_SIZE";
pub const ENV_DAILY_CAP: &str = "YOUTUBE_DAILY_CAP";
pub const ENV_KEEP_PER_AUTO: &str = "VIDEO_KEEP_PER_AUTO";
pub const ENV_REVALIDATE_HOURS: &str = "VIDEO_REVALIDATE_H";
pub const ENV_STALE_DAYS: &str = "VIDEO_STALE_DAYS";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	apply_env_overrides(&mut cfg, |name| env::var(name).ok())?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

/// Overlays the deployment environment on top of the file values.
///
/// `lookup` is injected so tests never touch the process environment.
pub fn apply_env_overrides<F>(cfg: &mut Config, lookup: F) -> Result<()>
where
	F: Fn(&str) -> Option<String>,
{
	if let Some(key) = lookup(ENV_API_KEY) {
		cfg.providers.youtube.api_key = Some(key);
	}
	if let Some(value) = parse_env(&lookup, ENV_BATCH_SIZE)? {
		cfg.sync.batch_size = value;
	}
	if let Some(value) = parse_env(&lookup, ENV_DAILY_CAP)? {
		cfg.sync.daily_cap = value;
	}
	if let Some(value) = parse_env(&lookup, ENV_KEEP_PER_AUTO)? {
		cfg.sync.keep_per_auto = value;
	}
	if let Some(value) = parse_env(&lookup, ENV_REVALIDATE_HOURS)? {
		cfg.sync.revalidate_hours = value;
	}
	if let Some(value) = parse_env(&lookup, ENV_STALE_DAYS)? {
		cfg.sync.stale_days = value;
	}

	Ok(())
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	let youtube = &cfg.providers.youtube;

	if youtube.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.youtube.api_base must be non-empty.".to_string(),
		});
	}
	if youtube.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.youtube.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if youtube.locale.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.youtube.locale must be non-empty.".to_string(),
		});
	}
	if !(1..=50).contains(&youtube.max_results) {
		return Err(Error::Validation {
			message: "providers.youtube.max_results must be in the range 1-50.".to_string(),
		});
	}
	if cfg.sync.batch_size == 0 {
		return Err(Error::Validation {
			message: "sync.batch_size must be greater than zero.".to_string(),
		});
	}
	if cfg.sync.daily_cap <= 0 {
		return Err(Error::Validation {
			message: "sync.daily_cap must be greater than zero.".to_string(),
		});
	}
	if cfg.sync.keep_per_auto == 0 {
		return Err(Error::Validation {
			message: "sync.keep_per_auto must be greater than zero.".to_string(),
		});
	}
	if cfg.sync.revalidate_hours <= 0 {
		return Err(Error::Validation {
			message: "sync.revalidate_hours must be greater than zero.".to_string(),
		});
	}
	if cfg.sync.stale_days <= 0 {
		return Err(Error::Validation {
			message: "sync.stale_days must be greater than zero.".to_string(),
		});
	}
	if cfg.sync.sweep_limit == 0 {
		return Err(Error::Validation {
			message: "sync.sweep_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.listing.default_limit == 0 {
		return Err(Error::Validation {
			message: "listing.default_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.listing.candidate_window < cfg.listing.default_limit {
		return Err(Error::Validation {
			message: "listing.candidate_window must be at least listing.default_limit."
				.to_string(),
		});
	}

	Ok(())
}

fn parse_env<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>>
where
	F: Fn(&str) -> Option<String>,
	T: FromStr,
{
	let Some(raw) = lookup(name) else {
		return Ok(None);
	};
	let trimmed = raw.trim();

	if trimmed.is_empty() {
		return Ok(None);
	}

	trimmed.parse().map(Some).map_err(|_| Error::InvalidEnv { name, value: raw.clone() })
}

fn normalize(cfg: &mut Config) {
	if cfg.providers.youtube.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.providers.youtube.api_key = None;
	}
	if cfg
		.security
		.admin_auth_token
		.as_deref()
		.map(|token| token.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.security.admin_auth_token = None;
	}

	cfg.providers.youtube.locale = cfg.providers.youtube.locale.trim().to_ascii_lowercase();

	while cfg.providers.youtube.api_base.ends_with('/') {
		cfg.providers.youtube.api_base.pop();
	}
}
