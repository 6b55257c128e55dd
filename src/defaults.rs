//! Starter emission factor catalog.
//!
//! Loaded into an empty database on startup when seeding is enabled. Values
//! are kg CO₂e per input unit, rounded from public conversion tables.

use crate::model::{Category, EmissionFactor};

const STARTER_FACTORS: &[(&str, f64, &str, &str, Category)] = &[
    ("electricity", 0.233, "kWh", "DEFRA 2023 UK grid average", Category::Energy),
    ("natural_gas", 0.183, "kWh", "DEFRA 2023 natural gas (gross CV)", Category::Energy),
    ("heating_oil", 2.54, "liter", "DEFRA 2023 burning oil", Category::Energy),
    ("lpg", 1.56, "liter", "DEFRA 2023 LPG", Category::Energy),
    ("petrol", 2.31, "liter", "EPA 2023 motor gasoline", Category::Transport),
    ("diesel", 2.68, "liter", "EPA 2023 diesel fuel", Category::Transport),
    ("car_average", 0.17, "km", "DEFRA 2023 average car, unknown fuel", Category::Transport),
    ("bus", 0.097, "km", "DEFRA 2023 average local bus, per passenger", Category::Transport),
    ("rail", 0.035, "km", "DEFRA 2023 national rail, per passenger", Category::Transport),
    ("flight_short_haul", 0.151, "km", "DEFRA 2023 short-haul economy, per passenger", Category::Transport),
    ("flight_long_haul", 0.148, "km", "DEFRA 2023 long-haul economy, per passenger", Category::Transport),
    ("beef", 60.0, "kg", "IPCC AR6 WGIII food system estimates", Category::Consumption),
    ("poultry", 6.9, "kg", "IPCC AR6 WGIII food system estimates", Category::Consumption),
    ("dairy", 3.2, "kg", "IPCC AR6 WGIII food system estimates", Category::Consumption),
    ("vegetables", 0.5, "kg", "IPCC AR6 WGIII food system estimates", Category::Consumption),
    ("clothing", 15.0, "kg", "EPA WARM textiles, production", Category::Consumption),
    ("electronics", 50.0, "kg", "EPA WARM mixed electronics, production", Category::Consumption),
    ("waste_landfill", 0.587, "kg", "DEFRA 2023 household residual waste to landfill", Category::Waste),
    ("waste_recycled", 0.021, "kg", "DEFRA 2023 mixed recycling, closed loop", Category::Waste),
    ("waste_composted", 0.009, "kg", "DEFRA 2023 organic food and drink composting", Category::Waste),
];

/// The built-in catalog as factor values.
pub fn starter_factors() -> Vec<EmissionFactor> {
    STARTER_FACTORS
        .iter()
        .map(|(factor_id, value, unit, source, category)| EmissionFactor {
            factor_id: factor_id.to_string(),
            value: *value,
            unit: unit.to_string(),
            source: source.to_string(),
            category: *category,
        })
        .collect()
}
