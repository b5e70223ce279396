//! The three scheduled job modes.

use serde::Serialize;
use time::OffsetDateTime;

use autovid_storage::{queries, selection};

use crate::{
	CostMeter, Result, RunContext, VideoService,
	sync::{DiscoveryOutcome, RevalidationOutcome, VehicleStep},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
	Discover,
	Revalidate,
	Sweep,
}
impl JobKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Discover => "discover",
			Self::Revalidate => "revalidate",
			Self::Sweep => "sweep",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobReport {
	pub job: JobKind,
	#[serde(with = "crate::time_serde")]
	pub started_at: OffsetDateTime,
	pub selected: usize,
	pub processed: usize,
	pub failed: usize,
	pub skipped_locked: usize,
	pub inserted: usize,
	pub updated: usize,
	pub trimmed: u64,
	pub refreshed: usize,
	pub missing: usize,
	pub units: i64,
	pub quota_exhausted: bool,
}
impl JobReport {
	fn new(job: JobKind, started_at: OffsetDateTime) -> Self {
		Self {
			job,
			started_at,
			selected: 0,
			processed: 0,
			failed: 0,
			skipped_locked: 0,
			inserted: 0,
			updated: 0,
			trimmed: 0,
			refreshed: 0,
			missing: 0,
			units: 0,
			quota_exhausted: false,
		}
	}

	fn absorb_discovery(&mut self, outcome: &DiscoveryOutcome) {
		self.processed += 1;
		self.inserted += outcome.inserted;
		self.updated += outcome.updated;
		self.trimmed += outcome.trimmed;
	}

	fn absorb_revalidation(&mut self, outcome: &RevalidationOutcome) {
		self.processed += 1;
		self.refreshed += outcome.refreshed;
		self.missing += outcome.missing;
	}
}

impl VideoService {
	/// Daily discovery over the vehicles most in need of videos.
	pub async fn run_discovery(&self, now: OffsetDateTime) -> Result<JobReport> {
		let Some(mut ctx) = self.run_context(JobKind::Discover, now) else {
			return Ok(JobReport::new(JobKind::Discover, now));
		};
		let ids = selection::select_discovery_batch(&self.db.pool, self.cfg.sync.batch_size).await?;

		Ok(self.discover_all(JobKind::Discover, &mut ctx, ids).await)
	}

	/// Weekly full rediscovery of vehicles untouched for `stale_days`.
	pub async fn run_sweep(&self, now: OffsetDateTime) -> Result<JobReport> {
		let Some(mut ctx) = self.run_context(JobKind::Sweep, now) else {
			return Ok(JobReport::new(JobKind::Sweep, now));
		};
		let ids = selection::select_sweep_batch(
			&self.db.pool,
			now,
			self.cfg.sync.stale_days,
			self.cfg.sync.sweep_limit,
		)
		.await?;

		Ok(self.discover_all(JobKind::Sweep, &mut ctx, ids).await)
	}

	/// Detail-only refresh of vehicles whose oldest row is older than `revalidate_hours`.
	pub async fn run_revalidation(&self, now: OffsetDateTime) -> Result<JobReport> {
		let Some(mut ctx) = self.run_context(JobKind::Revalidate, now) else {
			return Ok(JobReport::new(JobKind::Revalidate, now));
		};
		let ids = selection::select_revalidation_batch(
			&self.db.pool,
			now,
			self.cfg.sync.revalidate_hours,
			self.cfg.sync.batch_size,
		)
		.await?;
		let mut report = JobReport::new(JobKind::Revalidate, now);

		report.selected = ids.len();

		for id_auto in ids {
			if stop_for_quota(&ctx, &mut report) {
				break;
			}

			let mut meter = CostMeter::default();
			let result = self.revalidate_vehicle(&ctx, id_auto, &mut meter).await;

			ctx.budget.charge(meter.units());

			match result {
				Ok(VehicleStep::Done(outcome)) => report.absorb_revalidation(&outcome),
				Ok(VehicleStep::Locked) => {
					tracing::info!(id_auto, "Vehicle is locked by another run. Skipping.");

					report.skipped_locked += 1;
				},
				Err(err) => {
					self.record_failure(id_auto, &err).await;

					report.failed += 1;
				},
			}
		}

		report.units = ctx.budget.consumed();

		log_report(&report, &ctx);

		Ok(report)
	}

	async fn discover_all(&self, job: JobKind, ctx: &mut RunContext, ids: Vec<i64>) -> JobReport {
		let mut report = JobReport::new(job, ctx.now);

		report.selected = ids.len();

		for id_auto in ids {
			if stop_for_quota(ctx, &mut report) {
				break;
			}

			let mut meter = CostMeter::default();
			let result = self.discover_vehicle(ctx, id_auto, &mut meter).await;

			ctx.budget.charge(meter.units());

			match result {
				Ok(VehicleStep::Done(outcome)) => report.absorb_discovery(&outcome),
				Ok(VehicleStep::Locked) => {
					tracing::info!(id_auto, "Vehicle is locked by another run. Skipping.");

					report.skipped_locked += 1;
				},
				Err(err) => {
					self.record_failure(id_auto, &err).await;

					report.failed += 1;
				},
			}
		}

		report.units = ctx.budget.consumed();

		log_report(&report, ctx);

		report
	}

	fn run_context(&self, job: JobKind, now: OffsetDateTime) -> Option<RunContext> {
		let Some(provider) = self.provider() else {
			tracing::error!(job = job.as_str(), "YouTube API key is not configured. Job skipped.");

			return None;
		};

		Some(RunContext::new(self.cfg.sync.daily_cap, provider, now))
	}

	/// The vehicle's transaction is already rolled back; the bump runs on its own.
	pub(crate) async fn record_failure(&self, id_auto: i64, err: &crate::Error) {
		tracing::error!(id_auto, error = %err, "Vehicle processing failed. Rolled back.");

		if let Err(bump_err) = queries::bump_error_count(&self.db.pool, id_auto).await {
			tracing::error!(id_auto, error = %bump_err, "Failed to record vehicle error count.");
		}
	}
}

fn stop_for_quota(ctx: &RunContext, report: &mut JobReport) -> bool {
	if !ctx.budget.exhausted() {
		return false;
	}

	tracing::warn!(
		job = report.job.as_str(),
		consumed = ctx.budget.consumed(),
		cap = ctx.budget.cap(),
		processed = report.processed,
		"Daily quota exhausted. Stopping before the next vehicle."
	);

	report.quota_exhausted = true;

	true
}

fn log_report(report: &JobReport, ctx: &RunContext) {
	tracing::info!(
		job = report.job.as_str(),
		selected = report.selected,
		processed = report.processed,
		failed = report.failed,
		skipped_locked = report.skipped_locked,
		units = report.units,
		remaining = ctx.budget.remaining(),
		"Job finished."
	);
}
