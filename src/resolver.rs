//! Factor resolution: activity entry + catalog snapshot -> kg CO₂e.

use tracing::debug;

use crate::catalog::CatalogSnapshot;
use crate::error::CalculationError;
use crate::model::{ActivityEntry, ResolvedEmission};
use crate::units::{convert, factor_input_unit};

/// Resolve one activity entry against a catalog snapshot.
///
/// The entry's `sub_type` names the factor. Its quantity is normalized to the
/// factor's input unit through the fixed conversion table and multiplied by
/// the factor value. The result is tagged with the entry's category.
pub fn resolve(
    entry: &ActivityEntry,
    catalog: &CatalogSnapshot,
) -> Result<ResolvedEmission, CalculationError> {
    if !entry.quantity.is_finite() || entry.quantity < 0.0 {
        return Err(CalculationError::InvalidQuantity {
            sub_type: entry.sub_type.clone(),
            quantity: entry.quantity,
        });
    }

    let factor = catalog
        .get(&entry.sub_type)
        .ok_or_else(|| CalculationError::UnknownFactor {
            factor_id: entry.sub_type.clone(),
        })?;

    let expected = factor_input_unit(&factor.unit);
    let normalized = convert(entry.quantity, &entry.unit, expected).ok_or_else(|| {
        CalculationError::UnitMismatch {
            factor_id: factor.factor_id.clone(),
            given: entry.unit.clone(),
            expected: expected.to_string(),
        }
    })?;

    let co2e = normalized * factor.value;
    if !normalized.is_finite() || !co2e.is_finite() {
        return Err(CalculationError::InvalidQuantity {
            sub_type: entry.sub_type.clone(),
            quantity: entry.quantity,
        });
    }

    if factor.category != entry.category {
        debug!(
            factor_id = %factor.factor_id,
            factor_category = %factor.category,
            entry_category = %entry.category,
            "Activity filed under a different category than its factor"
        );
    }

    Ok(ResolvedEmission {
        category: entry.category,
        factor_id: factor.factor_id.clone(),
        co2e,
    })
}

/// Resolve every entry, stopping at the first failure.
///
/// Either all entries resolve or none of the results are returned, so a
/// caller can never persist a partial breakdown.
pub fn resolve_all(
    entries: &[ActivityEntry],
    catalog: &CatalogSnapshot,
) -> Result<Vec<ResolvedEmission>, CalculationError> {
    entries.iter().map(|entry| resolve(entry, catalog)).collect()
}
