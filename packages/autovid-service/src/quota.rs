use std::sync::Arc;

use time::OffsetDateTime;

use autovid_providers::youtube::{DETAIL_COST_UNITS_PER_VIDEO, SEARCH_COST_UNITS};

use crate::VideoSearchProvider;

/// Run-scoped unit counter.
///
/// Charging never fails. The job loop checks [`QuotaBudget::exhausted`] between vehicles, so a run
/// can overshoot the cap by at most one vehicle's cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaBudget {
	cap: i64,
	consumed: i64,
}
impl QuotaBudget {
	pub fn new(cap: i64) -> Self {
		Self { cap, consumed: 0 }
	}

	pub fn charge(&mut self, units: i64) {
		self.consumed = self.consumed.saturating_add(units.max(0));
	}

	pub fn cap(&self) -> i64 {
		self.cap
	}

	pub fn consumed(&self) -> i64 {
		self.consumed
	}

	pub fn remaining(&self) -> i64 {
		self.cap - self.consumed
	}

	pub fn exhausted(&self) -> bool {
		self.remaining() <= 0
	}
}

/// Units spent on one vehicle. Every attempted call is recorded, including failed ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CostMeter {
	units: i64,
	search_calls: u32,
	detailed_ids: u32,
}
impl CostMeter {
	pub fn record_search(&mut self) {
		self.search_calls += 1;
		self.units += SEARCH_COST_UNITS;
	}

	pub fn record_detail(&mut self, ids: usize) {
		let ids = u32::try_from(ids).unwrap_or(u32::MAX);

		self.detailed_ids = self.detailed_ids.saturating_add(ids);
		self.units += i64::from(ids) * DETAIL_COST_UNITS_PER_VIDEO;
	}

	pub fn units(&self) -> i64 {
		self.units
	}

	pub fn search_calls(&self) -> u32 {
		self.search_calls
	}

	pub fn detailed_ids(&self) -> u32 {
		self.detailed_ids
	}
}

/// State shared by every vehicle of one run.
pub struct RunContext {
	pub budget: QuotaBudget,
	pub provider: Arc<dyn VideoSearchProvider>,
	/// Frozen at run start so all rows of a run share one `checked_at` and one scoring clock.
	pub now: OffsetDateTime,
}
impl RunContext {
	pub fn new(cap: i64, provider: Arc<dyn VideoSearchProvider>, now: OffsetDateTime) -> Self {
		Self { budget: QuotaBudget::new(cap), provider, now }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn budget_counts_down_and_reports_exhaustion() {
		let mut budget = QuotaBudget::new(250);

		budget.charge(100);

		assert_eq!(budget.remaining(), 150);
		assert!(!budget.exhausted());

		budget.charge(200);

		assert_eq!(budget.remaining(), -50);
		assert!(budget.exhausted());

		budget.charge(-10);

		assert_eq!(budget.consumed(), 300);
	}

	#[test]
	fn meter_prices_searches_and_detail_ids() {
		let mut meter = CostMeter::default();

		meter.record_search();
		meter.record_search();
		meter.record_detail(50);
		meter.record_detail(3);

		assert_eq!(meter.units(), 253);
		assert_eq!(meter.search_calls(), 2);
		assert_eq!(meter.detailed_ids(), 53);
	}
}
