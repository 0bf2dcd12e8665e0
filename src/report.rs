use crate::error::ProberError;
use crate::types::{AvailabilityData, AvailabilityRecord, Granularity, ProbeRequest};
use std::path::{Path, PathBuf};

/// Writes the availability CSV: one row per date, `year, doy,
/// <granularity columns>, percentage`. Returns the written path.
pub async fn write_availability_csv(
    records: &[AvailabilityRecord],
    request: &ProbeRequest,
    output_dir: &Path,
) -> Result<PathBuf, ProberError> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(ProberError::IoError)?;

    let filename = format!(
        "{}_{}_{}_{}.csv",
        request.station.to_lowercase(),
        request.start,
        request.end,
        request.granularity
    );
    let path = output_dir.join(filename);
    let mut wtr = csv::WriterBuilder::new().from_path(&path)?;

    let mut header = vec!["year".to_string(), "doy".to_string()];
    match request.granularity {
        Granularity::Day => header.push("available".to_string()),
        Granularity::Hour | Granularity::SubHour => {
            header.extend((0..24).map(|hour| format!("h{hour:02}")));
        }
    }
    header.push("percentage".to_string());
    wtr.write_record(&header)?;

    for record in records {
        let mut row = vec![record.year.to_string(), format!("{:03}", record.doy)];
        match &record.data {
            AvailabilityData::Daily(value) => row.push(value.to_string()),
            AvailabilityData::Hourly(hours) | AvailabilityData::SubHourly(hours) => {
                row.extend(hours.iter().map(|value| value.to_string()));
            }
        }
        row.push(format!("{:.2}", record.percentage));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::UrlTemplate;
    use crate::types::{DateUnit, RinexVersion};
    use chrono::NaiveDate;

    fn request(granularity: Granularity) -> ProbeRequest {
        ProbeRequest::new(
            "ALBH",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            granularity,
            RinexVersion::V3,
            10,
            UrlTemplate::new("https://example.org/{year}/{doy}/").unwrap(),
        )
        .unwrap()
    }

    fn record(doy: u32, data: AvailabilityData) -> AvailabilityRecord {
        let date = NaiveDate::from_yo_opt(2024, doy).unwrap();
        AvailabilityRecord::new(DateUnit::new(date), data)
    }

    #[tokio::test]
    async fn test_daily_csv() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            record(1, AvailabilityData::Daily(1)),
            record(2, AvailabilityData::Daily(0)),
        ];

        let path = write_availability_csv(&records, &request(Granularity::Day), dir.path())
            .await
            .unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "albh_2024-01-01_2024-01-02_day.csv"
        );

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "year,doy,available,percentage");
        assert_eq!(lines[1], "2024,001,1,100.00");
        assert_eq!(lines[2], "2024,002,0,0.00");
    }

    #[tokio::test]
    async fn test_hourly_csv_has_24_hour_columns() {
        let dir = tempfile::tempdir().unwrap();
        let mut hours = [0u8; 24];
        hours[0] = 1;
        hours[23] = 1;
        let records = vec![record(1, AvailabilityData::Hourly(hours))];

        let path = write_availability_csv(&records, &request(Granularity::Hour), dir.path())
            .await
            .unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        let header: Vec<&str> = lines[0].split(',').collect();
        assert_eq!(header.len(), 27);
        assert_eq!(header[2], "h00");
        assert_eq!(header[25], "h23");
        assert_eq!(header[26], "percentage");

        let row: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(row[2], "1");
        assert_eq!(row[25], "1");
        assert_eq!(row[26], "8.33");
    }

    #[tokio::test]
    async fn test_output_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("reports").join("2024");
        let records = vec![record(1, AvailabilityData::Daily(1))];

        let path = write_availability_csv(&records, &request(Granularity::Day), &nested)
            .await
            .unwrap();
        assert!(path.exists());
    }
}
