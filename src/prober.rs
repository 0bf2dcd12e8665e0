use crate::cache::{Listing, ListingCache};
use crate::error::ProberError;
use crate::pattern::{self, MINUTE_TOKENS};
use crate::types::{AvailabilityData, AvailabilityRecord, DateUnit, Granularity, ProbeRequest};
use log::debug;

/// Probes one date and produces its availability record.
///
/// A `FetchFailed` listing degrades the affected hours to 0 rather than
/// failing the unit; the emitted record does not distinguish confirmed
/// absence from an unreachable archive.
pub async fn probe(
    unit: DateUnit,
    request: &ProbeRequest,
    cache: &ListingCache,
) -> Result<AvailabilityRecord, ProberError> {
    let data = match request.granularity {
        Granularity::Day => probe_day(unit, request, cache).await?,
        Granularity::Hour => probe_hours(unit, request, cache).await?,
        Granularity::SubHour => probe_subhour(unit, request, cache).await?,
    };
    let record = AvailabilityRecord::new(unit, data);
    debug!(
        "Probed {} {}: {}/{} ({:.2}%)",
        record.year,
        record.doy,
        record.data.available(),
        record.data.possible(),
        record.percentage
    );
    Ok(record)
}

async fn probe_day(
    unit: DateUnit,
    request: &ProbeRequest,
    cache: &ListingCache,
) -> Result<AvailabilityData, ProberError> {
    let pattern = pattern::file_pattern(&request.station, request.rinex_version, &unit, None, None)?;
    let listing = cache.get_listing(&request.template.day_dir(&unit)).await;
    Ok(AvailabilityData::Daily(u8::from(listing.any_match(&pattern))))
}

/// Queries the day directory once to learn which hour sub-directories exist,
/// then only the existing hours. An hour exists iff its two-digit name
/// appears literally in the parent listing.
async fn probe_hours(
    unit: DateUnit,
    request: &ProbeRequest,
    cache: &ListingCache,
) -> Result<AvailabilityData, ProberError> {
    let pattern = pattern::file_pattern(&request.station, request.rinex_version, &unit, None, None)?;
    let parent = cache.get_listing(&request.template.day_dir(&unit)).await;

    let mut hours = [0u8; 24];
    if let Listing::Found(_) = parent {
        for hour in 0..24u8 {
            if !parent.contains(&format!("{hour:02}")) {
                continue;
            }
            let listing = cache.get_listing(&request.template.hour_dir(&unit, hour)).await;
            hours[usize::from(hour)] = u8::from(listing.any_match(&pattern));
        }
    }
    Ok(AvailabilityData::Hourly(hours))
}

/// Same parent-existence check as hourly probing; each existing hour is
/// queried once and contributes the count of quarter-hour files present.
async fn probe_subhour(
    unit: DateUnit,
    request: &ProbeRequest,
    cache: &ListingCache,
) -> Result<AvailabilityData, ProberError> {
    let parent = cache.get_listing(&request.template.day_dir(&unit)).await;

    let mut hours = [0u8; 24];
    if let Listing::Found(_) = parent {
        for hour in 0..24u8 {
            if !parent.contains(&format!("{hour:02}")) {
                continue;
            }
            let listing = cache.get_listing(&request.template.hour_dir(&unit, hour)).await;
            let mut count = 0u8;
            for minute in MINUTE_TOKENS {
                let pattern = pattern::file_pattern(
                    &request.station,
                    request.rinex_version,
                    &unit,
                    Some(hour),
                    Some(minute),
                )?;
                if listing.any_match(&pattern) {
                    count += 1;
                }
            }
            hours[usize::from(hour)] = count;
        }
    }
    Ok(AvailabilityData::SubHourly(hours))
}
