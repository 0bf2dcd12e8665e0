use crate::error::ProberError;
use crate::types::{DateUnit, RinexVersion};
use glob::Pattern;

/// The four quarter-hour minute tokens of a highrate archive hour.
pub const MINUTE_TOKENS: [&str; 4] = ["00", "15", "30", "45"];

/// First four characters of the station id, case-folded per RINEX naming:
/// lower case for version 2, upper case for version 3/4.
pub fn station_token(station: &str, version: RinexVersion) -> Result<String, ProberError> {
    let trimmed = station.trim();
    if trimmed.chars().count() < 4 {
        return Err(ProberError::InvalidStationId(station.to_string()));
    }
    let four: String = trimmed.chars().take(4).collect();
    if !four.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ProberError::InvalidStationId(station.to_string()));
    }
    Ok(match version {
        RinexVersion::V2 => four.to_lowercase(),
        RinexVersion::V3 => four.to_uppercase(),
    })
}

/// Glob pattern for the observation files of one date.
///
/// `hour` and `minute` are only consulted for sub-hour probing: version 2
/// archives embed the minute token as a wildcard-delimited infix, while the
/// version 3 highrate archive encodes year, day of year, hour and minute
/// literally and fixes the `_15M_01S_MO.crx.gz` suffix. That strict form is
/// produced only when both `hour` and `minute` are supplied.
pub fn file_pattern(
    station: &str,
    version: RinexVersion,
    unit: &DateUnit,
    hour: Option<u8>,
    minute: Option<&str>,
) -> Result<Pattern, ProberError> {
    let token = station_token(station, version)?;
    let text = match version {
        RinexVersion::V2 => match minute {
            Some(minute) => format!("{token}*{minute}*.{}d.gz", unit.yy()),
            None => format!("{token}*.{}d.gz", unit.yy()),
        },
        RinexVersion::V3 => match (hour, minute) {
            (Some(hour), Some(minute)) => format!(
                "{token}*{}{}{hour:02}{minute}_15M_01S_MO.crx.gz",
                unit.year(),
                unit.doy_str()
            ),
            _ => format!("{token}*crx.gz"),
        },
    };
    Ok(Pattern::new(&text)?)
}

/// Case-sensitive glob test of one listing entry.
pub fn matches(entry: &str, pattern: &Pattern) -> bool {
    pattern.matches(entry)
}
