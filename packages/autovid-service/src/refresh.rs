use serde::Serialize;
use time::OffsetDateTime;

use autovid_storage::catalog;

use crate::{CostMeter, Error, Result, RunContext, VideoService, sync::VehicleStep};

/// Synchronous single-vehicle discovery requested by an operator.
#[derive(Debug, Clone)]
pub struct RefreshRequest {
	pub id_auto: i64,
	/// Set by the API layer when the admin bearer token matched.
	pub is_admin: bool,
	/// Operator identity forwarded by the upstream auth layer.
	pub operator_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshResponse {
	pub id_auto: i64,
	pub inserted: usize,
	pub updated: usize,
	pub candidates: usize,
	pub units: i64,
}

impl VideoService {
	pub async fn refresh_auto(
		&self,
		req: RefreshRequest,
		now: OffsetDateTime,
	) -> Result<RefreshResponse> {
		let auto = catalog::fetch_auto(&self.db.pool, req.id_auto).await?;

		if !req.is_admin {
			let operator = req.operator_id.as_deref().map(str::trim).filter(|id| !id.is_empty());
			let owner = auto
				.as_ref()
				.and_then(|auto| auto.owner_id.as_deref())
				.map(str::trim)
				.filter(|id| !id.is_empty());

			// Unknown vehicles look the same as foreign ones to non-admin callers.
			match (operator, owner) {
				(Some(operator), Some(owner)) if operator == owner => {},
				_ => {
					return Err(Error::Forbidden {
						message: "Refresh requires the admin token or vehicle ownership."
							.to_string(),
					});
				},
			}
		}
		if auto.is_none() {
			return Err(Error::NotFound {
				message: format!("Vehicle {} does not exist.", req.id_auto),
			});
		}

		let provider = self.provider().ok_or_else(|| Error::Config {
			message: "YouTube API key is not configured.".to_string(),
		})?;
		let ctx = RunContext::new(self.cfg.sync.daily_cap, provider, now);
		let mut meter = CostMeter::default();
		let result = self.discover_vehicle(&ctx, req.id_auto, &mut meter).await;

		tracing::info!(id_auto = req.id_auto, units = meter.units(), "Manual refresh charged.");

		match result {
			Ok(VehicleStep::Done(outcome)) => Ok(RefreshResponse {
				id_auto: outcome.id_auto,
				inserted: outcome.inserted,
				updated: outcome.updated,
				candidates: outcome.candidates,
				units: meter.units(),
			}),
			Ok(VehicleStep::Locked) => Err(Error::Conflict {
				message: format!("Vehicle {} is being refreshed by another run.", req.id_auto),
			}),
			Err(err) => {
				self.record_failure(req.id_auto, &err).await;

				Err(err)
			},
		}
	}
}
