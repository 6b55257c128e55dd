//! Calculation and analytics orchestration.
//!
//! The pure pieces (resolver, aggregator, builder, summaries) know nothing of
//! storage. This module wires them to the record store: it takes the catalog
//! snapshot, runs a calculation end to end, and recomputes the derived views
//! on demand.

use std::sync::Arc;

use futures::TryStreamExt;
use tracing::{debug, info};

use crate::analytics::{month_over_month, summarize};
use crate::breakdown::{aggregate, ensure_finite};
use crate::cache::AnalyticsCache;
use crate::catalog::CatalogSnapshot;
use crate::error::{CalculationError, EngineError};
use crate::model::{
    ActivityEntry, ActivityInput, AdminSummary, FootprintRecord, MonthlyAnalytics,
    MonthlyAnalyticsResponse,
};
use crate::population::PopulationAccumulator;
use crate::record::build;
use crate::resolver::resolve_all;
use crate::storage::Storage;

/// Entry point for footprint calculation and reporting.
#[derive(Clone)]
pub struct FootprintEngine {
    storage: Storage,
    cache: Arc<AnalyticsCache>,
}

impl FootprintEngine {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            cache: Arc::new(AnalyticsCache::new()),
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Take a consistent snapshot of the active catalog.
    pub async fn snapshot_catalog(&self) -> Result<CatalogSnapshot, EngineError> {
        let snapshot = CatalogSnapshot::from_factors(self.storage.get_all_active_factors().await?);
        debug!(
            factors = snapshot.len(),
            rejected = snapshot.rejected(),
            "Catalog snapshot taken"
        );
        Ok(snapshot)
    }

    /// Calculate and persist a user's footprint for one month.
    ///
    /// Every entry is validated and resolved before anything is written; the
    /// first failure aborts the calculation and leaves storage untouched. On
    /// success the new record replaces any previous one for the same month.
    pub async fn calculate(
        &self,
        user_id: &str,
        period: &str,
        activities: Vec<ActivityInput>,
    ) -> Result<FootprintRecord, EngineError> {
        let entries = activities
            .into_iter()
            .map(ActivityInput::into_entry)
            .collect::<Result<Vec<ActivityEntry>, CalculationError>>()?;

        let snapshot = self.snapshot_catalog().await?;
        let record = calculate_with(user_id, period, &entries, &snapshot)?;

        let record = self.storage.upsert_record(record).await?;
        self.cache.invalidate(user_id);

        info!(
            user_id = %record.user_id,
            period = %record.period,
            entries = entries.len(),
            total_co2e = record.results.total_co2e(),
            "Footprint calculated"
        );

        Ok(record)
    }

    pub async fn list_records(&self, user_id: &str) -> Result<Vec<FootprintRecord>, EngineError> {
        Ok(self.storage.list_records(user_id).await?)
    }

    /// Delete all of a user's records on their request.
    pub async fn delete_user_data(&self, user_id: &str) -> Result<u64, EngineError> {
        let deleted = self.storage.delete_user_records(user_id).await?;
        self.cache.invalidate(user_id);
        info!(user_id = %user_id, deleted, "User footprint records deleted");
        Ok(deleted)
    }

    /// Per-month summary of a user's records, oldest month first.
    ///
    /// Served from cache while the user's records are unchanged.
    pub async fn monthly_analytics(
        &self,
        user_id: &str,
    ) -> Result<Vec<MonthlyAnalytics>, EngineError> {
        let Some(version) = self.storage.record_version(user_id).await? else {
            return Ok(Vec::new());
        };

        if let Some(months) = self.cache.get(user_id, version) {
            debug!(user_id = %user_id, "Monthly analytics cache hit");
            return Ok(months);
        }

        let records = self.storage.list_records(user_id).await?;
        let months = summarize(&records);
        self.cache.insert(user_id, version, months.clone());

        Ok(months)
    }

    /// Monthly summary plus the change between the last two months.
    pub async fn monthly_report(&self, user_id: &str) -> Result<MonthlyAnalyticsResponse, EngineError> {
        let months = self.monthly_analytics(user_id).await?;
        let trend = month_over_month(&months);

        Ok(MonthlyAnalyticsResponse {
            user_id: user_id.to_string(),
            months,
            trend,
        })
    }

    /// Population summary over each user's latest record.
    ///
    /// Rows are folded as they are read; memory use is bounded by `limit`.
    pub async fn admin_summary(&self, limit: usize) -> Result<AdminSummary, EngineError> {
        let mut accumulator = PopulationAccumulator::new(limit);
        let mut rows = Box::pin(self.storage.stream_latest_per_user());
        while let Some(latest) = rows.try_next().await? {
            accumulator.push(latest);
        }

        let skipped = accumulator.skipped();
        let summary = accumulator.finish();
        info!(
            total_users = summary.total_users,
            skipped,
            global_average = summary.global_average,
            "Admin summary computed"
        );

        Ok(summary)
    }
}

/// Resolve, aggregate and build a record against a fixed catalog snapshot.
///
/// Pure apart from the record's id and timestamp; nothing is persisted.
pub fn calculate_with(
    user_id: &str,
    period: &str,
    entries: &[ActivityEntry],
    catalog: &CatalogSnapshot,
) -> Result<FootprintRecord, CalculationError> {
    let resolved = resolve_all(entries, catalog)?;
    let breakdown = aggregate(&resolved);
    ensure_finite(&breakdown)?;
    build(user_id, period, breakdown)
}
