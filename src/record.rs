//! Footprint record construction.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::CalculationError;
use crate::model::{Breakdown, FootprintRecord, Period};

/// Build a new record for `user_id` and `period`, stamped now.
///
/// The period must be a `YYYY-MM` month. Each call yields a fresh id; when the
/// record is persisted it replaces whatever record the user already had for
/// that period.
pub fn build(
    user_id: &str,
    period: &str,
    breakdown: Breakdown,
) -> Result<FootprintRecord, CalculationError> {
    build_at(user_id, period, breakdown, Utc::now())
}

pub(crate) fn build_at(
    user_id: &str,
    period: &str,
    breakdown: Breakdown,
    now: DateTime<Utc>,
) -> Result<FootprintRecord, CalculationError> {
    let period: Period = period.parse()?;

    Ok(FootprintRecord {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        period,
        date_calculated: now,
        results: breakdown,
    })
}
