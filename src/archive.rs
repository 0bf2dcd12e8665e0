use crate::error::ProberError;
use crate::types::DateUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Ftp,
    Https,
}

/// Archive directory URL template. Supported placeholders: `{year}`,
/// `{yy}`, `{doy}` and `{hour}`. Without an `{hour}` placeholder, hour
/// directories are two-digit children of the day directory.
#[derive(Debug, Clone)]
pub struct UrlTemplate {
    raw: String,
    protocol: Protocol,
}

impl UrlTemplate {
    pub fn new(raw: &str) -> Result<Self, ProberError> {
        let raw = raw.trim();
        let protocol = if raw.starts_with("ftp://") {
            Protocol::Ftp
        } else if raw.starts_with("https://") || raw.starts_with("http://") {
            Protocol::Https
        } else {
            return Err(ProberError::UnsupportedUrl(raw.to_string()));
        };
        Ok(Self {
            raw: raw.to_string(),
            protocol,
        })
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Day-level directory URL for one date, with a trailing slash.
    pub fn day_dir(&self, unit: &DateUnit) -> String {
        let raw = self.raw.replace("/{hour}", "");
        Self::fill(&raw, unit, None)
    }

    /// Hour-level directory URL for one date and hour 0-23.
    pub fn hour_dir(&self, unit: &DateUnit, hour: u8) -> String {
        if self.raw.contains("{hour}") {
            Self::fill(&self.raw, unit, Some(hour))
        } else {
            format!("{}{:02}/", self.day_dir(unit), hour)
        }
    }

    fn fill(raw: &str, unit: &DateUnit, hour: Option<u8>) -> String {
        let mut url = raw
            .replace("{year}", &unit.year().to_string())
            .replace("{yy}", &unit.yy())
            .replace("{doy}", &unit.doy_str());
        if let Some(hour) = hour {
            url = url.replace("{hour}", &format!("{hour:02}"));
        }
        if !url.ends_with('/') {
            url.push('/');
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn unit() -> DateUnit {
        DateUnit::new(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
    }

    #[test]
    fn test_day_dir_substitution() {
        let template = UrlTemplate::new("https://example.org/gnss/{year}/{doy}/{yy}d").unwrap();
        assert_eq!(template.day_dir(&unit()), "https://example.org/gnss/2024/005/24d/");
    }

    #[test]
    fn test_hour_dir_is_appended_without_placeholder() {
        let template = UrlTemplate::new("https://example.org/gnss/{year}/{doy}/").unwrap();
        assert_eq!(
            template.hour_dir(&unit(), 7),
            "https://example.org/gnss/2024/005/07/"
        );
    }

    #[test]
    fn test_hour_placeholder_substitution() {
        let template = UrlTemplate::new("ftp://example.org/highrate/{year}/{doy}/{hour}").unwrap();
        assert_eq!(
            template.day_dir(&unit()),
            "ftp://example.org/highrate/2024/005/"
        );
        assert_eq!(
            template.hour_dir(&unit(), 23),
            "ftp://example.org/highrate/2024/005/23/"
        );
    }

    #[test]
    fn test_protocol_detection() {
        assert_eq!(
            UrlTemplate::new("ftp://example.org/a").unwrap().protocol(),
            Protocol::Ftp
        );
        assert_eq!(
            UrlTemplate::new("https://example.org/a").unwrap().protocol(),
            Protocol::Https
        );
    }

    #[test]
    fn test_unsupported_scheme_is_rejected() {
        assert!(matches!(
            UrlTemplate::new("sftp://example.org/a"),
            Err(ProberError::UnsupportedUrl(_))
        ));
    }
}
