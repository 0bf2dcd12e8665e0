use crate::archive::UrlTemplate;
use crate::error::ProberError;
use crate::pattern;
use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Granularity {
    /// One daily observation file per day
    Day,
    /// One observation file per hour directory
    Hour,
    /// Four 15-minute observation files per hour directory
    #[value(name = "subhour")]
    SubHour,
}

impl Granularity {
    /// Number of sub-units a single day can contribute.
    pub fn units_per_day(&self) -> u32 {
        match self {
            Granularity::Day => 1,
            Granularity::Hour => 24,
            Granularity::SubHour => 96,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Day => write!(f, "day"),
            Granularity::Hour => write!(f, "hour"),
            Granularity::SubHour => write!(f, "subhour"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RinexVersion {
    V2,
    /// Version 3 naming, which also covers version 4 files
    V3,
}

impl RinexVersion {
    pub fn from_number(version: u8) -> Result<Self, ProberError> {
        match version {
            2 => Ok(RinexVersion::V2),
            3 | 4 => Ok(RinexVersion::V3),
            other => Err(ProberError::UnsupportedRinexVersion(other)),
        }
    }
}

/// One calendar date of the requested range. Units are independent of each
/// other; the scheduler restores ordering after collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateUnit {
    pub date: NaiveDate,
}

impl DateUnit {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Day of year, 1-366.
    pub fn doy(&self) -> u32 {
        self.date.ordinal()
    }

    /// Day of year zero-padded to three digits, as archives encode it.
    pub fn doy_str(&self) -> String {
        format!("{:03}", self.doy())
    }

    /// Two-digit year, zero-padded.
    pub fn yy(&self) -> String {
        format!("{:02}", self.date.year() % 100)
    }
}

#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub station: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub granularity: Granularity,
    pub rinex_version: RinexVersion,
    pub parallelism: usize,
    pub template: UrlTemplate,
}

impl ProbeRequest {
    pub fn new(
        station: &str,
        start: NaiveDate,
        end: NaiveDate,
        granularity: Granularity,
        rinex_version: RinexVersion,
        parallelism: usize,
        template: UrlTemplate,
    ) -> Result<Self, ProberError> {
        // Invalid station ids are fatal before any dispatch
        pattern::station_token(station, rinex_version)?;
        if start > end {
            return Err(ProberError::InvalidDateRange { start, end });
        }
        if parallelism == 0 {
            return Err(ProberError::InvalidParallelism);
        }
        Ok(Self {
            station: station.trim().to_string(),
            start,
            end,
            granularity,
            rinex_version,
            parallelism,
            template,
        })
    }

    /// Every date from start to end inclusive, no gaps, no duplicates.
    pub fn date_units(&self) -> Vec<DateUnit> {
        let mut units = Vec::new();
        let mut date = self.start;
        while date <= self.end {
            units.push(DateUnit::new(date));
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }
        units
    }
}

/// Granularity-specific availability payload for one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityData {
    /// 1 if the daily file was found, else 0
    Daily(u8),
    /// Per-hour presence flags, indexed by hour 00-23
    Hourly([u8; 24]),
    /// Per-hour counts of 15-minute files present, 0-4 each
    SubHourly([u8; 24]),
}

impl AvailabilityData {
    pub fn available(&self) -> u32 {
        match self {
            AvailabilityData::Daily(v) => u32::from(*v),
            AvailabilityData::Hourly(hours) | AvailabilityData::SubHourly(hours) => {
                hours.iter().map(|v| u32::from(*v)).sum()
            }
        }
    }

    pub fn possible(&self) -> u32 {
        match self {
            AvailabilityData::Daily(_) => 1,
            AvailabilityData::Hourly(_) => 24,
            AvailabilityData::SubHourly(_) => 96,
        }
    }
}

/// Availability of one date, never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityRecord {
    pub year: i32,
    pub doy: u32,
    pub data: AvailabilityData,
    pub percentage: f64,
}

impl AvailabilityRecord {
    pub fn new(unit: DateUnit, data: AvailabilityData) -> Self {
        let percentage = percent(data.available(), data.possible());
        Self {
            year: unit.year(),
            doy: unit.doy(),
            data,
            percentage,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeSummary {
    pub total_days: usize,
    pub days_with_data: usize,
    pub possible_units: u32,
    pub available_units: u32,
    pub percentage: f64,
}

/// Availability percentage rounded to two decimal places.
pub fn percent(available: u32, possible: u32) -> f64 {
    if possible == 0 {
        return 0.0;
    }
    (f64::from(available) / f64::from(possible) * 100.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> UrlTemplate {
        UrlTemplate::new("https://example.org/gnss/{year}/{doy}/").unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_unit_fields() {
        let unit = DateUnit::new(date(2024, 1, 2));
        assert_eq!(unit.year(), 2024);
        assert_eq!(unit.doy(), 2);
        assert_eq!(unit.doy_str(), "002");
        assert_eq!(unit.yy(), "24");
    }

    #[test]
    fn test_two_digit_year_is_zero_padded() {
        let unit = DateUnit::new(date(2005, 6, 1));
        assert_eq!(unit.yy(), "05");
    }

    #[test]
    fn test_leap_year_doy() {
        let unit = DateUnit::new(date(2024, 12, 31));
        assert_eq!(unit.doy(), 366);
    }

    #[test]
    fn test_date_units_inclusive_count() {
        let request = ProbeRequest::new(
            "ALBH",
            date(2024, 12, 30),
            date(2025, 1, 3),
            Granularity::Day,
            RinexVersion::V3,
            10,
            template(),
        )
        .unwrap();
        let units = request.date_units();
        assert_eq!(units.len(), 5);
        assert_eq!((units[0].year(), units[0].doy()), (2024, 365));
        assert_eq!((units[1].year(), units[1].doy()), (2024, 366));
        assert_eq!((units[4].year(), units[4].doy()), (2025, 3));
    }

    #[test]
    fn test_single_day_range() {
        let request = ProbeRequest::new(
            "ALBH",
            date(2024, 6, 1),
            date(2024, 6, 1),
            Granularity::Day,
            RinexVersion::V3,
            1,
            template(),
        )
        .unwrap();
        assert_eq!(request.date_units().len(), 1);
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let err = ProbeRequest::new(
            "ALBH",
            date(2024, 6, 2),
            date(2024, 6, 1),
            Granularity::Day,
            RinexVersion::V3,
            10,
            template(),
        )
        .unwrap_err();
        assert!(matches!(err, ProberError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_short_station_is_rejected() {
        let err = ProbeRequest::new(
            "AL",
            date(2024, 6, 1),
            date(2024, 6, 2),
            Granularity::Day,
            RinexVersion::V3,
            10,
            template(),
        )
        .unwrap_err();
        assert!(matches!(err, ProberError::InvalidStationId(_)));
    }

    #[test]
    fn test_zero_parallelism_is_rejected() {
        let err = ProbeRequest::new(
            "ALBH",
            date(2024, 6, 1),
            date(2024, 6, 2),
            Granularity::Day,
            RinexVersion::V3,
            0,
            template(),
        )
        .unwrap_err();
        assert!(matches!(err, ProberError::InvalidParallelism));
    }

    #[test]
    fn test_rinex_version_from_number() {
        assert_eq!(RinexVersion::from_number(2).unwrap(), RinexVersion::V2);
        assert_eq!(RinexVersion::from_number(3).unwrap(), RinexVersion::V3);
        assert_eq!(RinexVersion::from_number(4).unwrap(), RinexVersion::V3);
        assert!(RinexVersion::from_number(1).is_err());
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent(1, 3), 33.33);
        assert_eq!(percent(2, 3), 66.67);
        assert_eq!(percent(1, 2), 50.0);
        assert_eq!(percent(0, 24), 0.0);
        assert_eq!(percent(24, 24), 100.0);
        assert_eq!(percent(0, 0), 0.0);
    }

    #[test]
    fn test_record_percentage() {
        let mut hours = [0u8; 24];
        hours[0] = 1;
        hours[5] = 1;
        let record = AvailabilityRecord::new(
            DateUnit::new(date(2024, 1, 1)),
            AvailabilityData::Hourly(hours),
        );
        assert_eq!(record.percentage, 8.33);
        assert_eq!(record.data.available(), 2);
        assert_eq!(record.data.possible(), 24);
    }

    #[test]
    fn test_subhourly_counts() {
        let mut hours = [0u8; 24];
        hours[10] = 4;
        hours[11] = 2;
        let data = AvailabilityData::SubHourly(hours);
        assert_eq!(data.available(), 6);
        assert_eq!(data.possible(), 96);
    }
}
