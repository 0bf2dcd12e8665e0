use crate::types::Granularity;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Known archive layouts. The day directory template is all the core needs;
/// hour directories are two-digit children of it.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Archive {
    /// BKG daily observation archive (HTTPS)
    BkgDaily,
    /// BKG highrate 15-minute archive (HTTPS)
    BkgHighrate,
    /// IGN daily observation archive (anonymous FTP)
    IgnDaily,
}

impl Archive {
    pub fn template(&self) -> &'static str {
        match self {
            Archive::BkgDaily => "https://igs.bkg.bund.de/root_ftp/IGS/obs/{year}/{doy}/",
            Archive::BkgHighrate => "https://igs.bkg.bund.de/root_ftp/IGS/highrate/{year}/{doy}/",
            Archive::IgnDaily => "ftp://igs.ensg.ign.fr/pub/igs/data/{year}/{doy}/",
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Station identifier, at least 4 characters (e.g. ALBH)
    pub station: String,

    /// First date of the range (YYYY-MM-DD)
    #[arg(short, long)]
    pub start: NaiveDate,

    /// Last date of the range, inclusive (YYYY-MM-DD)
    #[arg(short, long)]
    pub end: NaiveDate,

    /// Probing granularity
    #[arg(short, long, value_enum, default_value_t = Granularity::Day)]
    pub granularity: Granularity,

    /// RINEX version of the expected files (3 also covers version 4 naming)
    #[arg(short, long, default_value_t = 3)]
    pub rinex_version: u8,

    /// Number of concurrent day probes
    #[arg(short, long, default_value_t = 10)]
    pub parallelism: usize,

    /// Named archive preset
    #[arg(short, long, value_enum)]
    pub archive: Option<Archive>,

    /// Archive day-directory URL template with {year}, {yy}, {doy} and
    /// {hour} placeholders; overrides --archive
    #[arg(short = 'u', long)]
    pub base_url: Option<String>,

    /// Output directory for the availability CSV
    #[arg(short, long, default_value = "reports")]
    pub output_dir: PathBuf,
}

impl Cli {
    /// The effective URL template, explicit `--base-url` winning over the
    /// preset.
    pub fn template(&self) -> Option<String> {
        self.base_url
            .clone()
            .or_else(|| self.archive.map(|archive| archive.template().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_overrides_preset() {
        let cli = Cli::parse_from([
            "rinex-prober",
            "ALBH",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-02",
            "--archive",
            "bkg-daily",
            "--base-url",
            "https://example.org/{year}/{doy}/",
        ]);
        assert_eq!(
            cli.template().unwrap(),
            "https://example.org/{year}/{doy}/"
        );
    }

    #[test]
    fn test_preset_template() {
        let cli = Cli::parse_from([
            "rinex-prober",
            "ALBH",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-02",
            "--archive",
            "ign-daily",
        ]);
        assert_eq!(
            cli.template().unwrap(),
            "ftp://igs.ensg.ign.fr/pub/igs/data/{year}/{doy}/"
        );
    }

    #[test]
    fn test_no_archive_yields_none() {
        let cli = Cli::parse_from([
            "rinex-prober",
            "ALBH",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-02",
        ]);
        assert!(cli.template().is_none());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from([
            "rinex-prober",
            "ALBH",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-02",
        ]);
        assert_eq!(cli.parallelism, 10);
        assert_eq!(cli.rinex_version, 3);
        assert_eq!(cli.granularity, Granularity::Day);
    }
}
