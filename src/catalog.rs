//! Read-only snapshot of the emission factor catalog.
//!
//! A snapshot is taken once per calculation so that every entry in the
//! calculation is resolved against the same set of factors, even if the
//! catalog is being edited at the same time.

use std::collections::HashMap;

use tracing::warn;

use crate::model::EmissionFactor;

/// Immutable `factor_id -> EmissionFactor` map.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    factors: HashMap<String, EmissionFactor>,
    rejected: usize,
}

impl CatalogSnapshot {
    /// Build a snapshot from a catalog listing.
    ///
    /// Factors with a non-finite or negative value are left out, as is every
    /// repeat of an id after its first occurrence.
    pub fn from_factors(factors: impl IntoIterator<Item = EmissionFactor>) -> Self {
        let mut snapshot = Self::default();

        for factor in factors {
            if !factor.value.is_finite() || factor.value < 0.0 {
                warn!(
                    factor_id = %factor.factor_id,
                    value = factor.value,
                    "Skipping emission factor with invalid value"
                );
                snapshot.rejected += 1;
                continue;
            }
            if snapshot.factors.contains_key(&factor.factor_id) {
                warn!(factor_id = %factor.factor_id, "Skipping duplicate emission factor");
                snapshot.rejected += 1;
                continue;
            }
            snapshot.factors.insert(factor.factor_id.clone(), factor);
        }

        snapshot
    }

    pub fn get(&self, factor_id: &str) -> Option<&EmissionFactor> {
        self.factors.get(factor_id)
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Number of catalog rows left out of this snapshot.
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}
