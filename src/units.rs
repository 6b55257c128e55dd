//! Fixed unit-conversion table.
//!
//! Quantities may only be converted within one physical dimension, using the
//! scale factors below. There is no fuzzy matching: a unit that is not listed
//! here, or that belongs to a different dimension than the factor expects,
//! cannot be normalized.

/// Physical dimension of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Energy,
    Volume,
    Mass,
    Distance,
}

/// A known unit and its size relative to the dimension's base unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    pub dimension: Dimension,
    /// Base units per one of this unit (base: kWh, liter, kg, km).
    pub scale: f64,
}

const KNOWN_UNITS: &[(&[&str], Dimension, f64)] = &[
    (&["wh"], Dimension::Energy, 0.001),
    (&["kwh"], Dimension::Energy, 1.0),
    (&["mwh"], Dimension::Energy, 1_000.0),
    (&["gj"], Dimension::Energy, 277.777_777_777_777_8),
    (&["ml", "milliliter", "millilitre"], Dimension::Volume, 0.001),
    (&["l", "liter", "litre", "liters", "litres"], Dimension::Volume, 1.0),
    (&["m3", "cubic meter", "cubic metre"], Dimension::Volume, 1_000.0),
    (&["gal", "gallon", "gallons"], Dimension::Volume, 3.785_411_784),
    (&["g", "gram", "grams"], Dimension::Mass, 0.001),
    (&["kg", "kilogram", "kilograms"], Dimension::Mass, 1.0),
    (&["t", "tonne", "tonnes", "metric ton"], Dimension::Mass, 1_000.0),
    (&["lb", "lbs", "pound", "pounds"], Dimension::Mass, 0.453_592_37),
    (&["m", "meter", "metre", "meters", "metres"], Dimension::Distance, 0.001),
    (&["km", "kilometer", "kilometre", "kilometers", "kilometres"], Dimension::Distance, 1.0),
    (&["mi", "mile", "miles"], Dimension::Distance, 1.609_344),
];

/// Look up a unit by name. Case-insensitive; surrounding whitespace ignored.
pub fn parse_unit(name: &str) -> Option<Unit> {
    let key = name.trim().to_ascii_lowercase();
    KNOWN_UNITS
        .iter()
        .find(|(aliases, _, _)| aliases.contains(&key.as_str()))
        .map(|(_, dimension, scale)| Unit {
            dimension: *dimension,
            scale: *scale,
        })
}

/// The unit a factor expects its input in.
///
/// Catalogs write either a bare unit (`kWh`) or a rate (`kgCO2e/kWh`); for a
/// rate the denominator is the input unit.
pub fn factor_input_unit(factor_unit: &str) -> &str {
    match factor_unit.rsplit_once('/') {
        Some((_, denominator)) => denominator.trim(),
        None => factor_unit.trim(),
    }
}

/// Convert `quantity` expressed in `from` into `to`.
///
/// Returns `None` when either unit is unknown or the dimensions differ.
/// Identical spellings pass through untouched, so catalogs may use units
/// outside the table (e.g. `passenger-km`) as long as entries match exactly.
pub fn convert(quantity: f64, from: &str, to: &str) -> Option<f64> {
    if from.trim().eq_ignore_ascii_case(to.trim()) {
        return Some(quantity);
    }
    let (from, to) = (parse_unit(from)?, parse_unit(to)?);
    if from.dimension != to.dimension {
        return None;
    }
    Some(quantity * from.scale / to.scale)
}
