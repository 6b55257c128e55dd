//! Data models for Footprint.
//!
//! Categories and periods are closed types: an activity can only ever land in
//! one of the four canonical buckets, and a record's period is always a valid
//! calendar month. Strings coming off the wire are converted at the edge
//! ([`ActivityInput::into_entry`], [`Period::from_str`]) so that the rest of
//! the engine never sees an unchecked value.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::breakdown::stable_sum;
use crate::error::CalculationError;

/// One of the four canonical emission buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Electricity, gas, heating oil and other household energy.
    Energy,
    /// Private and public travel.
    Transport,
    /// Food, goods and services.
    Consumption,
    /// Household waste streams.
    Waste,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Energy,
        Category::Transport,
        Category::Consumption,
        Category::Waste,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Energy => "energy",
            Category::Transport => "transport",
            Category::Consumption => "consumption",
            Category::Waste => "waste",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CalculationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "energy" => Ok(Category::Energy),
            "transport" => Ok(Category::Transport),
            "consumption" => Ok(Category::Consumption),
            "waste" => Ok(Category::Waste),
            _ => Err(CalculationError::UnknownCategory(s.to_string())),
        }
    }
}

/// A conversion coefficient from the external factor catalog.
///
/// The engine only ever reads these. `value` is kg CO₂e per one `unit` of
/// activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactor {
    /// Unique catalog key, matched against [`ActivityEntry::sub_type`].
    pub factor_id: String,

    /// kg CO₂e per unit of activity.
    pub value: f64,

    /// The input unit the coefficient expects, e.g. `kWh` or `kgCO2e/kWh`.
    pub unit: String,

    /// Provenance citation (IPCC, EPA, DEFRA ...). Informational only.
    pub source: String,

    /// Bucket the factor is published under.
    pub category: Category,
}

/// A single validated activity line for one calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub category: Category,
    pub sub_type: String,
    pub quantity: f64,
    pub unit: String,
}

/// An activity line as it arrives from a client.
///
/// The category is kept as a string so that an unknown bucket is reported as
/// a classified [`CalculationError::UnknownCategory`] rather than a generic
/// deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityInput {
    pub category: String,
    pub sub_type: String,
    pub quantity: f64,
    pub unit: String,
}

impl ActivityInput {
    pub fn into_entry(self) -> Result<ActivityEntry, CalculationError> {
        Ok(ActivityEntry {
            category: self.category.parse()?,
            sub_type: self.sub_type,
            quantity: self.quantity,
            unit: self.unit,
        })
    }
}

/// The CO₂e produced by one activity entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedEmission {
    pub category: Category,
    pub factor_id: String,
    /// kg CO₂e.
    pub co2e: f64,
}

/// Per-category kg CO₂e. Each value is >= 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub energy: f64,
    pub transport: f64,
    pub consumption: f64,
    pub waste: f64,
}

impl CategoryTotals {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Energy => self.energy,
            Category::Transport => self.transport,
            Category::Consumption => self.consumption,
            Category::Waste => self.waste,
        }
    }

    pub(crate) fn slot_mut(&mut self, category: Category) -> &mut f64 {
        match category {
            Category::Energy => &mut self.energy,
            Category::Transport => &mut self.transport,
            Category::Consumption => &mut self.consumption,
            Category::Waste => &mut self.waste,
        }
    }
}

/// The four-bucket decomposition of a footprint together with its total.
///
/// The total is always derived from the buckets, never set independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Breakdown {
    total_co2e: f64,
    breakdown_co2e: CategoryTotals,
}

impl Breakdown {
    pub fn from_totals(totals: CategoryTotals) -> Self {
        let mut parts: Vec<f64> = Category::ALL.iter().map(|c| totals.get(*c)).collect();
        Self {
            total_co2e: stable_sum(&mut parts),
            breakdown_co2e: totals,
        }
    }

    /// Rebuild a breakdown exactly as it was persisted.
    ///
    /// Rows written before the total was derived from the buckets may not
    /// satisfy `total == sum(parts)`; reporting reads them as-is.
    pub(crate) fn restore(total_co2e: f64, breakdown_co2e: CategoryTotals) -> Self {
        Self {
            total_co2e,
            breakdown_co2e,
        }
    }

    pub fn total_co2e(&self) -> f64 {
        self.total_co2e
    }

    pub fn breakdown_co2e(&self) -> &CategoryTotals {
        &self.breakdown_co2e
    }
}

/// A calendar month, written `YYYY-MM`.
///
/// Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(1..=9999).contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl FromStr for Period {
    type Err = CalculationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CalculationError::InvalidPeriod(s.to_string());

        let bytes = s.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(invalid());
        }
        let digits_only = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        let (year, month) = (&s[..4], &s[5..]);
        if !digits_only(year) || !digits_only(month) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Period::new(year, month).ok_or_else(invalid)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl TryFrom<String> for Period {
    type Error = CalculationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

/// A persisted footprint calculation for one user and one month.
///
/// Immutable once built: a recalculation produces a new record (new `id`,
/// new `date_calculated`) that supersedes this one in storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FootprintRecord {
    pub id: String,
    pub user_id: String,
    pub period: Period,
    pub date_calculated: DateTime<Utc>,
    pub results: Breakdown,
}

/// Per-month summary of one user's records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAnalytics {
    pub month: Period,
    pub total_emissions: f64,
    pub count: usize,
    /// `total_emissions / count`, or 0 when there are no records.
    pub avg_emissions: f64,
}

/// Change between the two most recent months of a user's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthOverMonth {
    pub current_month: Period,
    pub previous_month: Period,
    pub current_emissions: f64,
    pub previous_emissions: f64,
    pub change: f64,
    /// `None` when the previous month had zero emissions.
    pub percent_change: Option<f64>,
}

/// Display metadata from the identity service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: Option<String>,
    pub region: Option<String>,
}

/// A user's most recent total, as fed to the population aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestFootprint {
    pub user_id: String,
    pub co2e: f64,
    pub user_info: UserInfo,
}

/// One entry of a ranked performer list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Performer {
    pub user_id: String,
    pub co2e: f64,
    pub user_info: UserInfo,
}

impl From<LatestFootprint> for Performer {
    fn from(latest: LatestFootprint) -> Self {
        Self {
            user_id: latest.user_id,
            co2e: latest.co2e,
            user_info: latest.user_info,
        }
    }
}

/// Population-wide view for administrative review.
///
/// "Top" performers are the lowest emitters, listed ascending; "bottom"
/// performers are the highest emitters, listed descending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminSummary {
    pub global_average: f64,
    pub total_users: usize,
    pub top_performers: Vec<Performer>,
    pub bottom_performers: Vec<Performer>,
}

/// Request body for `POST /users/:user_id/footprints`.
#[derive(Debug, Clone, Deserialize)]
pub struct CalculateRequest {
    /// Month being calculated, `YYYY-MM`.
    pub period: String,

    /// Activity lines for the month.
    #[serde(default)]
    pub activities: Vec<ActivityInput>,
}

/// Response for `GET /users/:user_id/analytics/monthly`.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyAnalyticsResponse {
    pub user_id: String,
    pub months: Vec<MonthlyAnalytics>,
    pub trend: Option<MonthOverMonth>,
}

/// Query parameters for `GET /admin/summary`.
#[derive(Debug, Deserialize)]
pub struct AdminSummaryQuery {
    /// Length of each performer list (defaults to the configured size).
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!("energy".parse::<Category>().unwrap(), Category::Energy);
        assert_eq!(" Transport ".parse::<Category>().unwrap(), Category::Transport);
        assert_eq!(
            "other".parse::<Category>(),
            Err(CalculationError::UnknownCategory("other".to_string()))
        );
    }

    #[test]
    fn test_activity_input_rejects_unknown_category() {
        let input = ActivityInput {
            category: "food".to_string(),
            sub_type: "beef".to_string(),
            quantity: 1.0,
            unit: "kg".to_string(),
        };
        let err = input.into_entry().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::UnknownCategory);
    }

    #[test]
    fn test_period_parse_valid() {
        let period: Period = "2025-03".parse().unwrap();
        assert_eq!(period.year(), 2025);
        assert_eq!(period.month(), 3);
        assert_eq!(period.to_string(), "2025-03");
    }

    #[test]
    fn test_period_parse_invalid() {
        for bad in [
            "2025-3", "2025-13", "2025-00", "25-03", "2025/03", "2025-03-01", "", "abcd-ef",
            "0000-01", "+202-01", "2025--1",
        ] {
            assert!(bad.parse::<Period>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_period_ordering_is_chronological() {
        let mut periods: Vec<Period> = ["2025-01", "2024-12", "2025-10", "2025-02"]
            .iter()
            .map(|p| p.parse().unwrap())
            .collect();
        periods.sort();
        let rendered: Vec<String> = periods.iter().map(|p| p.to_string()).collect();
        assert_eq!(rendered, ["2024-12", "2025-01", "2025-02", "2025-10"]);
    }

    #[test]
    fn test_period_serializes_as_string() {
        let period: Period = "2025-03".parse().unwrap();
        assert_eq!(serde_json::to_value(period).unwrap(), "2025-03");
        let back: Period = serde_json::from_value(serde_json::json!("2024-11")).unwrap();
        assert_eq!(back.to_string(), "2024-11");
        assert!(serde_json::from_value::<Period>(serde_json::json!("2024-13")).is_err());
    }

    #[test]
    fn test_breakdown_total_is_sum_of_parts() {
        let breakdown = Breakdown::from_totals(CategoryTotals {
            energy: 50.0,
            transport: 46.0,
            consumption: 0.0,
            waste: 0.0,
        });
        assert_eq!(breakdown.total_co2e(), 96.0);

        let json = serde_json::to_value(breakdown).unwrap();
        assert_eq!(json["total_co2e"], 96.0);
        assert_eq!(json["breakdown_co2e"]["transport"], 46.0);
    }
}
