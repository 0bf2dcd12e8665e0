use crate::types::{percent, AvailabilityRecord, Granularity, RangeSummary};

/// Folds the sorted per-day records into range-level totals. Pure and
/// deterministic; the percentage uses the same two-decimal rounding as the
/// per-record values.
pub fn summarize(records: &[AvailabilityRecord], granularity: Granularity) -> RangeSummary {
    let total_days = records.len();
    let days_with_data = records
        .iter()
        .filter(|record| record.data.available() > 0)
        .count();
    let available_units: u32 = records.iter().map(|record| record.data.available()).sum();
    let possible_units = total_days as u32 * granularity.units_per_day();

    RangeSummary {
        total_days,
        days_with_data,
        possible_units,
        available_units,
        percentage: percent(available_units, possible_units),
    }
}
