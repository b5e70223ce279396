use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use autovid_service::{RefreshRequest, VideoService};
use autovid_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = autovid_cli::VERSION,
	rename_all = "kebab",
	styles = autovid_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

/// One pass per invocation. The scheduler decides how often each runs.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
	/// Daily discovery for vehicles with few or stale videos.
	Discover,
	/// Detail-only refresh of stored rows past the revalidation window.
	Revalidate,
	/// Weekly full rediscovery of vehicles untouched for the stale window.
	Sweep,
	/// Immediate discovery for one vehicle.
	Refresh {
		#[arg(long, value_name = "ID")]
		id_auto: i64,
	},
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = autovid_config::load(&args.config)?;

	init_tracing(&config);

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let service = VideoService::new(config, db)?;
	let now = OffsetDateTime::now_utc();

	tracing::info!(command = ?args.command, "Worker pass starting.");

	match args.command {
		Command::Discover => print_json(&service.run_discovery(now).await?),
		Command::Revalidate => print_json(&service.run_revalidation(now).await?),
		Command::Sweep => print_json(&service.run_sweep(now).await?),
		Command::Refresh { id_auto } => {
			let req = RefreshRequest { id_auto, is_admin: true, operator_id: None };

			print_json(&service.refresh_auto(req, now).await?)
		},
	}
}

fn print_json<T>(value: &T) -> color_eyre::Result<()>
where
	T: Serialize,
{
	println!("{}", serde_json::to_string_pretty(value)?);

	Ok(())
}

fn init_tracing(config: &autovid_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	// Reports go to stdout; keep logs off it.
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
