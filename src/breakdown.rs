//! Category aggregation: resolved emissions -> four-bucket breakdown.

use std::collections::BTreeMap;

use crate::error::CalculationError;
use crate::model::{Breakdown, Category, CategoryTotals, ResolvedEmission};

/// Sum resolved emissions into the canonical buckets.
///
/// The result depends only on the multiset of inputs, not on their order:
/// each bucket is summed with [`stable_sum`], and the total is derived from
/// the buckets by [`Breakdown::from_totals`].
pub fn aggregate(resolved: &[ResolvedEmission]) -> Breakdown {
    let mut buckets: BTreeMap<Category, Vec<f64>> = BTreeMap::new();
    for emission in resolved {
        buckets.entry(emission.category).or_default().push(emission.co2e);
    }

    let mut totals = CategoryTotals::default();
    for (category, mut values) in buckets {
        *totals.slot_mut(category) = stable_sum(&mut values);
    }

    Breakdown::from_totals(totals)
}

/// Reject a breakdown whose buckets or total overflowed.
///
/// Every resolved emission is finite, but their sum need not be.
pub(crate) fn ensure_finite(breakdown: &Breakdown) -> Result<(), CalculationError> {
    let parts = breakdown.breakdown_co2e();
    for category in Category::ALL {
        let value = parts.get(category);
        if !value.is_finite() {
            return Err(CalculationError::InvalidQuantity {
                sub_type: category.as_str().to_string(),
                quantity: value,
            });
        }
    }
    if !breakdown.total_co2e().is_finite() {
        return Err(CalculationError::InvalidQuantity {
            sub_type: "total".to_string(),
            quantity: breakdown.total_co2e(),
        });
    }
    Ok(())
}

/// Order-insensitive floating point sum.
///
/// Values are sorted by magnitude (ties by sign) and accumulated with
/// Neumaier compensation, so any permutation of the same values yields the
/// same bits.
pub(crate) fn stable_sum(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.abs().total_cmp(&b.abs()).then(a.total_cmp(b)));

    let mut sum = 0.0_f64;
    let mut compensation = 0.0_f64;
    for &value in values.iter() {
        compensated_add(&mut sum, &mut compensation, value);
    }
    sum + compensation
}

/// One Neumaier step: add `value` to `sum`, carrying the lost low-order bits.
pub(crate) fn compensated_add(sum: &mut f64, compensation: &mut f64, value: f64) {
    let next = *sum + value;
    if sum.abs() >= value.abs() {
        *compensation += (*sum - next) + value;
    } else {
        *compensation += (value - next) + *sum;
    }
    *sum = next;
}
