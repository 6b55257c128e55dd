//! Classified failures for footprint calculation.
//!
//! Every resolution or validation failure is detected eagerly, per entry, and
//! aborts the whole calculation. Nothing here knows about HTTP or presentation;
//! callers map [`ErrorKind`] codes to whatever their boundary needs.

use std::fmt;

use thiserror::Error;

/// Machine-readable classification of a [`CalculationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownFactor,
    UnitMismatch,
    InvalidQuantity,
    UnknownCategory,
    InvalidPeriod,
}

impl ErrorKind {
    /// Stable code used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::UnknownFactor => "UNKNOWN_FACTOR",
            ErrorKind::UnitMismatch => "UNIT_MISMATCH",
            ErrorKind::InvalidQuantity => "INVALID_QUANTITY",
            ErrorKind::UnknownCategory => "UNKNOWN_CATEGORY",
            ErrorKind::InvalidPeriod => "INVALID_PERIOD",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure while turning activity entries into a footprint record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculationError {
    #[error("no emission factor named '{factor_id}'")]
    UnknownFactor { factor_id: String },

    #[error("unit '{given}' cannot be converted to '{expected}' for factor '{factor_id}'")]
    UnitMismatch {
        factor_id: String,
        given: String,
        expected: String,
    },

    #[error("quantity {quantity} for '{sub_type}' must be a finite number >= 0")]
    InvalidQuantity { sub_type: String, quantity: f64 },

    #[error("'{0}' is not one of energy, transport, consumption, waste")]
    UnknownCategory(String),

    #[error("period '{0}' is not a valid YYYY-MM month")]
    InvalidPeriod(String),
}

impl CalculationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalculationError::UnknownFactor { .. } => ErrorKind::UnknownFactor,
            CalculationError::UnitMismatch { .. } => ErrorKind::UnitMismatch,
            CalculationError::InvalidQuantity { .. } => ErrorKind::InvalidQuantity,
            CalculationError::UnknownCategory(_) => ErrorKind::UnknownCategory,
            CalculationError::InvalidPeriod(_) => ErrorKind::InvalidPeriod,
        }
    }
}

/// Errors surfaced by [`crate::engine::FootprintEngine`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// The request itself was invalid; nothing was persisted.
    #[error(transparent)]
    Calculation(#[from] CalculationError),

    /// The record store or catalog could not be reached.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
