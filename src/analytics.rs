//! Monthly analytics over one user's footprint history.
//!
//! These are reporting views: they never fail on odd historical data. Months
//! holding more than one record (written before one-record-per-month was
//! enforced) are summed rather than rejected.

use std::collections::BTreeMap;

use crate::breakdown::stable_sum;
use crate::model::{FootprintRecord, MonthOverMonth, MonthlyAnalytics, Period};

/// Group records by period, in chronological order.
pub fn summarize(records: &[FootprintRecord]) -> Vec<MonthlyAnalytics> {
    let mut months: BTreeMap<Period, Vec<f64>> = BTreeMap::new();
    for record in records {
        months
            .entry(record.period)
            .or_default()
            .push(record.results.total_co2e());
    }

    months
        .into_iter()
        .map(|(month, mut totals)| {
            let count = totals.len();
            let total_emissions = stable_sum(&mut totals);
            MonthlyAnalytics {
                month,
                total_emissions,
                count,
                avg_emissions: average(total_emissions, count),
            }
        })
        .collect()
}

/// Compare the last two entries of a chronological summary.
///
/// Returns `None` with fewer than two months of history.
pub fn month_over_month(months: &[MonthlyAnalytics]) -> Option<MonthOverMonth> {
    let [.., previous, current] = months else {
        return None;
    };

    let change = current.total_emissions - previous.total_emissions;
    let percent_change = if previous.total_emissions > 0.0 {
        Some(change / previous.total_emissions * 100.0)
    } else {
        None
    };

    Some(MonthOverMonth {
        current_month: current.month,
        previous_month: previous.month,
        current_emissions: current.total_emissions,
        previous_emissions: previous.total_emissions,
        change,
        percent_change,
    })
}

fn average(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Breakdown, CategoryTotals};
    use crate::record::build;

    fn record(period: &str, total: f64) -> FootprintRecord {
        build(
            "user-1",
            period,
            Breakdown::from_totals(CategoryTotals {
                energy: total,
                ..Default::default()
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize(&[]).is_empty());
    }

    #[test]
    fn test_summarize_sorted_chronologically() {
        let records = vec![
            record("2025-03", 30.0),
            record("2024-12", 12.0),
            record("2025-01", 10.0),
        ];
        let months = summarize(&records);
        let order: Vec<String> = months.iter().map(|m| m.month.to_string()).collect();
        assert_eq!(order, ["2024-12", "2025-01", "2025-03"]);
        assert!(months.iter().all(|m| m.count == 1));
        assert_eq!(months[2].total_emissions, 30.0);
        assert_eq!(months[2].avg_emissions, 30.0);
    }

    #[test]
    fn test_summarize_tolerates_duplicate_periods() {
        let records = vec![
            record("2025-02", 100.0),
            record("2025-02", 50.0),
            record("2025-01", 20.0),
        ];
        let months = summarize(&records);
        assert_eq!(months.len(), 2);
        assert_eq!(months[1].count, 2);
        assert_eq!(months[1].total_emissions, 150.0);
        assert_eq!(months[1].avg_emissions, 75.0);
    }

    #[test]
    fn test_zero_count_average_is_zero() {
        assert_eq!(average(0.0, 0), 0.0);
        assert!(!average(0.0, 0).is_nan());
    }

    #[test]
    fn test_month_over_month() {
        let months = summarize(&[
            record("2025-01", 200.0),
            record("2025-02", 150.0),
            record("2024-12", 999.0),
        ]);
        let trend = month_over_month(&months).unwrap();
        assert_eq!(trend.previous_month.to_string(), "2025-01");
        assert_eq!(trend.current_month.to_string(), "2025-02");
        assert_eq!(trend.change, -50.0);
        assert_eq!(trend.percent_change, Some(-25.0));
    }

    #[test]
    fn test_month_over_month_needs_two_months() {
        assert!(month_over_month(&[]).is_none());
        assert!(month_over_month(&summarize(&[record("2025-01", 1.0)])).is_none());
    }

    #[test]
    fn test_month_over_month_from_zero() {
        let months = summarize(&[record("2025-01", 0.0), record("2025-02", 5.0)]);
        let trend = month_over_month(&months).unwrap();
        assert_eq!(trend.change, 5.0);
        assert_eq!(trend.percent_change, None);
    }
}
