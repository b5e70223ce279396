//! Per-vehicle discovery and revalidation passes.
//!
//! Each pass runs inside one transaction that first takes the vehicle's advisory lock. API
//! failures are logged and treated as empty results; only storage failures fail the vehicle.

use serde::Serialize;
use sqlx::PgConnection;

use autovid_domain::{
	filter::{self, VideoFacts},
	label::{self, DetailSource, TrimSource, VehicleLabel},
	query,
	scoring::{self, ScoringContext},
};
use autovid_providers::youtube::{MAX_IDS_PER_DETAIL_CALL, VideoSummary};
use autovid_storage::{
	catalog,
	models::{UpsertOutcome, VideoRefresh, VideoUpsert},
	queries,
};

use crate::{CostMeter, Result, RunContext, VideoService};

/// Result of one locked pass, or the marker that another run holds the vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VehicleStep<T> {
	Done(T),
	Locked,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryOutcome {
	pub id_auto: i64,
	pub queries: usize,
	pub candidates: usize,
	pub excluded: usize,
	pub inserted: usize,
	pub updated: usize,
	pub trimmed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RevalidationOutcome {
	pub id_auto: i64,
	pub checked: usize,
	pub refreshed: usize,
	pub missing: usize,
}

impl VideoService {
	/// Searches, filters, scores, stores and trims the videos of one vehicle.
	pub async fn discover_vehicle(
		&self,
		ctx: &RunContext,
		id_auto: i64,
		meter: &mut CostMeter,
	) -> Result<VehicleStep<DiscoveryOutcome>> {
		let mut tx = self.db.pool.begin().await?;

		if !queries::try_lock_auto(&mut tx, id_auto).await? {
			tx.rollback().await?;

			return Ok(VehicleStep::Locked);
		}

		let label = resolve_label(&mut tx, id_auto).await?;
		let queries_for_vehicle = query::queries_for_label(&label);
		let mut outcome =
			DiscoveryOutcome { id_auto, queries: queries_for_vehicle.len(), ..Default::default() };

		if queries_for_vehicle.is_empty() {
			outcome.trimmed =
				queries::trim_videos(&mut *tx, id_auto, self.cfg.sync.keep_per_auto).await?;

			tracing::info!(
				id_auto,
				trimmed = outcome.trimmed,
				"Vehicle label is unresolved. Skipping search."
			);
			tx.commit().await?;

			return Ok(VehicleStep::Done(outcome));
		}

		let ids = self.search_all(ctx, id_auto, &queries_for_vehicle, meter).await;
		let summaries = self.fetch_details(ctx, id_auto, &ids, meter).await;
		let scoring_ctx = ScoringContext::new(
			&label,
			&self.cfg.scoring.channel_whitelist,
			&self.cfg.providers.youtube.locale,
			self.policy().clone(),
			ctx.now,
		);
		let source_query = query::join_source_query(&queries_for_vehicle);

		outcome.candidates = summaries.len();

		for summary in summaries {
			let facts = facts_from_summary(summary);

			if let Some(reason) = filter::exclusion(&facts, scoring_ctx.policy()) {
				tracing::debug!(
					id_auto,
					video_id = %facts.video_id,
					reason = reason.as_str(),
					"Candidate excluded."
				);

				outcome.excluded += 1;

				continue;
			}

			let rank_score = scoring::score(&facts, &scoring_ctx);
			let row = upsert_row(id_auto, facts, rank_score, &source_query, ctx);

			match queries::upsert_video(&mut *tx, &row).await? {
				UpsertOutcome::Inserted => outcome.inserted += 1,
				UpsertOutcome::Updated => outcome.updated += 1,
			}
		}

		outcome.trimmed = queries::trim_videos(&mut *tx, id_auto, self.cfg.sync.keep_per_auto).await?;

		tx.commit().await?;

		tracing::info!(
			id_auto,
			queries = outcome.queries,
			candidates = outcome.candidates,
			excluded = outcome.excluded,
			inserted = outcome.inserted,
			updated = outcome.updated,
			trimmed = outcome.trimmed,
			units = meter.units(),
			"Vehicle discovery finished."
		);

		Ok(VehicleStep::Done(outcome))
	}

	/// Refreshes metrics of the stored rows of one vehicle. Scores and query sets are untouched.
	pub async fn revalidate_vehicle(
		&self,
		ctx: &RunContext,
		id_auto: i64,
		meter: &mut CostMeter,
	) -> Result<VehicleStep<RevalidationOutcome>> {
		let mut tx = self.db.pool.begin().await?;

		if !queries::try_lock_auto(&mut tx, id_auto).await? {
			tx.rollback().await?;

			return Ok(VehicleStep::Locked);
		}

		let ids = queries::stored_video_ids(&mut *tx, id_auto).await?;
		let mut outcome = RevalidationOutcome { id_auto, checked: ids.len(), ..Default::default() };

		for chunk in ids.chunks(MAX_IDS_PER_DETAIL_CALL) {
			meter.record_detail(chunk.len());

			let summaries = match ctx.provider.videos(chunk).await {
				Ok(summaries) => summaries,
				Err(err) => {
					tracing::warn!(id_auto, error = %err, "Detail lookup failed during revalidation.");

					continue;
				},
			};
			let mut returned = 0;

			for summary in summaries {
				if !chunk.contains(&summary.video_id) {
					continue;
				}

				returned += 1;

				if queries::refresh_video_metrics(&mut *tx, &refresh_row(id_auto, summary, ctx))
					.await?
				{
					outcome.refreshed += 1;
				}
			}

			outcome.missing += chunk.len().saturating_sub(returned);
		}

		tx.commit().await?;

		tracing::info!(
			id_auto,
			checked = outcome.checked,
			refreshed = outcome.refreshed,
			missing = outcome.missing,
			units = meter.units(),
			"Vehicle revalidation finished."
		);

		Ok(VehicleStep::Done(outcome))
	}

	/// Runs every query and merges the ids in first-seen order.
	async fn search_all(
		&self,
		ctx: &RunContext,
		id_auto: i64,
		queries: &[String],
		meter: &mut CostMeter,
	) -> Vec<String> {
		let mut ids: Vec<String> = Vec::new();

		for query in queries {
			meter.record_search();

			match ctx.provider.search(query).await {
				Ok(found) =>
					for id in found {
						if !ids.contains(&id) {
							ids.push(id);
						}
					},
				Err(err) => {
					tracing::warn!(id_auto, query = %query, error = %err, "Search call failed.");
				},
			}
		}

		ids
	}

	async fn fetch_details(
		&self,
		ctx: &RunContext,
		id_auto: i64,
		ids: &[String],
		meter: &mut CostMeter,
	) -> Vec<VideoSummary> {
		let mut summaries = Vec::with_capacity(ids.len());

		for chunk in ids.chunks(MAX_IDS_PER_DETAIL_CALL) {
			meter.record_detail(chunk.len());

			match ctx.provider.videos(chunk).await {
				Ok(found) => summaries.extend(found),
				Err(err) => {
					tracing::warn!(id_auto, batch = chunk.len(), error = %err, "Detail lookup failed.");
				},
			}
		}

		summaries
	}
}

/// Resolves brand, model, trim and year from the catalog. Unknown vehicles get an empty label.
pub async fn resolve_label(conn: &mut PgConnection, id_auto: i64) -> Result<VehicleLabel> {
	let Some(auto) = catalog::fetch_auto(&mut *conn, id_auto).await? else {
		return Ok(VehicleLabel::default());
	};
	let Some(tech_code) = auto.tech_code.as_deref().map(str::trim).filter(|code| !code.is_empty())
	else {
		return Ok(label::compose_label(None, None, auto.registration_year));
	};
	let detail = catalog::fetch_spec_detail(&mut *conn, tech_code).await?.map(|row| DetailSource {
		brand_name: row.brand_name,
		brand_acronym: row.brand_acronym,
		model_description: row.model_description,
		version_description: row.version_description,
	});
	let from_detail = label::compose_label(detail.as_ref(), None, auto.registration_year);

	if !from_detail.is_unresolved() {
		return Ok(from_detail);
	}

	let trim = catalog::fetch_spec_trim(&mut *conn, tech_code).await?.map(|row| TrimSource {
		brand_acronym: row.brand_acronym,
		trim_description: row.trim_description,
		model_description: row.model_description,
	});

	Ok(label::compose_label(detail.as_ref(), trim.as_ref(), auto.registration_year))
}

pub fn facts_from_summary(summary: VideoSummary) -> VideoFacts {
	VideoFacts {
		video_id: summary.video_id,
		title: summary.title,
		channel_title: summary.channel_title,
		channel_id: summary.channel_id,
		published_at: summary.published_at,
		duration_sec: summary.duration_sec,
		embeddable: summary.embeddable,
		made_for_kids: summary.made_for_kids,
		live_broadcast_content: summary.live_broadcast_content,
		view_count: summary.view_count,
		audio_lang: summary.audio_lang,
	}
}

fn upsert_row(
	id_auto: i64,
	facts: VideoFacts,
	rank_score: f64,
	source_query: &str,
	ctx: &RunContext,
) -> VideoUpsert {
	VideoUpsert {
		id_auto,
		video_id: facts.video_id,
		title: facts.title,
		channel_title: facts.channel_title,
		channel_id: facts.channel_id,
		published_at: facts.published_at,
		duration_sec: clamp_i32(facts.duration_sec),
		embeddable: facts.embeddable,
		view_count: clamp_i64(facts.view_count),
		rank_score,
		source_query: source_query.to_string(),
		audio_lang: facts.audio_lang,
		checked_at: ctx.now,
	}
}

fn refresh_row(id_auto: i64, summary: VideoSummary, ctx: &RunContext) -> VideoRefresh {
	VideoRefresh {
		id_auto,
		video_id: summary.video_id,
		title: summary.title,
		channel_title: summary.channel_title,
		channel_id: summary.channel_id,
		published_at: summary.published_at,
		duration_sec: clamp_i32(summary.duration_sec),
		embeddable: summary.embeddable,
		view_count: clamp_i64(summary.view_count),
		audio_lang: summary.audio_lang,
		checked_at: ctx.now,
	}
}

fn clamp_i32(value: u32) -> i32 {
	i32::try_from(value).unwrap_or(i32::MAX)
}

fn clamp_i64(value: u64) -> i64 {
	i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn oversized_counters_saturate() {
		assert_eq!(clamp_i32(u32::MAX), i32::MAX);
		assert_eq!(clamp_i64(u64::MAX), i64::MAX);
		assert_eq!(clamp_i64(42), 42);
	}
}
