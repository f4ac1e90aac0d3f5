// src/csv_handler.rs
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info, warn};
use tokio::task;

use crate::config::Config;
use crate::data_types::{Datasets, Metric, Record, TimeSeriesTable, DATE_COLUMN};
use crate::error::{DashboardError, DashboardResult};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];
const COUNTRY_ALIASES: [&str; 4] = ["country", "country_region", "location", "country_name"];

/// Where the country, date and value live in a file's header row.
#[derive(Debug, Clone, PartialEq)]
enum Layout {
    Long {
        country: usize,
        date: usize,
        value: usize,
    },
    /// One column per date, as in the Johns Hopkins time-series exports.
    Wide {
        country: usize,
        dates: Vec<(usize, NaiveDate)>,
    },
}

pub struct CSVHandler {}

impl CSVHandler {
    pub fn new() -> Self {
        CSVHandler {}
    }

    /// Reads `path` into the table shape of `metric`.
    pub fn read_table<P: AsRef<Path>>(&self, path: P, metric: Metric) -> DashboardResult<TimeSeriesTable> {
        let path = path.as_ref();
        let delimiter = Self::detect_delimiter(path)?;

        let file = File::open(path).map_err(|source| DashboardError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|source| DashboardError::Csv {
                path: path.to_path_buf(),
                source,
            })?
            .iter()
            .map(String::from)
            .collect();

        let layout = Self::detect_layout(&headers, metric).map_err(|column| DashboardError::MissingColumn {
            path: path.to_path_buf(),
            column,
        })?;

        let mut skipped = 0usize;
        let mut records = Vec::new();
        for result in reader.records() {
            match result {
                Ok(record) => {
                    // Skip empty rows
                    if record.iter().all(|field| field.is_empty()) {
                        continue;
                    }
                    records.push(record);
                }
                Err(err) => {
                    debug!("Unreadable row in {}: {}", path.display(), err);
                    skipped += 1;
                }
            }
        }

        let rows = match layout {
            Layout::Long { country, date, value } => {
                let mut rows = Vec::with_capacity(records.len());
                for record in &records {
                    match Self::parse_long_row(record, country, date, value) {
                        Some(row) => rows.push(row),
                        None => skipped += 1,
                    }
                }
                rows
            }
            Layout::Wide { country, dates } => {
                let (rows, bad) = Self::melt_wide_rows(&records, country, &dates);
                skipped += bad;
                rows
            }
        };

        if skipped > 0 {
            warn!("Skipped {} malformed rows in {}", skipped, path.display());
        }
        info!("Loaded {} {} rows from {}", rows.len(), metric, path.display());

        Ok(TimeSeriesTable::for_metric(metric, rows))
    }

    fn detect_delimiter(path: &Path) -> DashboardResult<u8> {
        let file = File::open(path).map_err(|source| DashboardError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = BufReader::new(file);
        let mut first_line = String::new();

        if reader.read_line(&mut first_line).is_ok() && first_line.contains(';') {
            return Ok(b';');
        }

        Ok(b',')
    }

    /// Resolves the layout or returns the name of the column that is missing.
    fn detect_layout(headers: &[String], metric: Metric) -> Result<Layout, String> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

        let country = COUNTRY_ALIASES
            .iter()
            .find_map(|alias| position(&normalized, alias))
            .ok_or_else(|| metric.country_column().to_string())?;

        let date = position(&normalized, "date");
        let value = position(&normalized, &normalize_header(metric.label()));

        match (date, value) {
            (Some(date), Some(value)) => Ok(Layout::Long { country, date, value }),
            (Some(_), None) => Err(metric.label().to_string()),
            (None, _) => {
                let dates: Vec<(usize, NaiveDate)> = headers
                    .iter()
                    .enumerate()
                    .filter_map(|(i, header)| parse_date(header).map(|d| (i, d)))
                    .collect();

                if dates.is_empty() {
                    Err(DATE_COLUMN.to_string())
                } else {
                    Ok(Layout::Wide { country, dates })
                }
            }
        }
    }

    fn parse_long_row(record: &StringRecord, country: usize, date: usize, value: usize) -> Option<Record> {
        let name = record.get(country).filter(|name| !name.is_empty())?;
        let date = parse_date(record.get(date)?)?;
        let value = parse_value(record.get(value).unwrap_or(""))?;
        Some(Record::new(name, date, value))
    }

    /// Melts one-column-per-date rows into records, summing provinces that
    /// share a country. Output is ordered by country, then date.
    fn melt_wide_rows(
        records: &[StringRecord],
        country: usize,
        dates: &[(usize, NaiveDate)],
    ) -> (Vec<Record>, usize) {
        let mut totals: BTreeMap<(String, NaiveDate), Option<f64>> = BTreeMap::new();
        let mut skipped = 0;

        for record in records {
            let name = match record.get(country).filter(|name| !name.is_empty()) {
                Some(name) => name,
                None => {
                    skipped += 1;
                    continue;
                }
            };

            let mut values = Vec::with_capacity(dates.len());
            for (index, date) in dates {
                match parse_value(record.get(*index).unwrap_or("")) {
                    Some(value) => values.push((*date, value)),
                    None => break,
                }
            }
            if values.len() != dates.len() {
                skipped += 1;
                continue;
            }

            for (date, value) in values {
                let total = totals.entry((name.to_string(), date)).or_insert(None);
                if let Some(value) = value {
                    *total = Some(total.unwrap_or(0.0) + value);
                }
            }
        }

        let rows = totals
            .into_iter()
            .map(|((name, date), value)| Record::new(name, date, value))
            .collect();
        (rows, skipped)
    }

    /// Reads all three tables named by `config`.
    pub fn load_all(&self, config: &Config) -> DashboardResult<Datasets> {
        Ok(Datasets {
            confirmed: self.read_table(config.confirmed_path(), Metric::ConfirmedCases)?,
            deaths: self.read_table(config.deaths_path(), Metric::Deaths)?,
            vaccinations: self.read_table(config.vaccinations_path(), Metric::PeopleVaccinated)?,
        })
    }
}

impl Default for CSVHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Loads the datasets off the async executor's worker threads.
pub async fn load_data(config: Config) -> DashboardResult<Datasets> {
    task::spawn_blocking(move || CSVHandler::new().load_all(&config))
        .await
        .map_err(|err| DashboardError::Task(err.to_string()))?
}

fn position(headers: &[String], wanted: &str) -> Option<usize> {
    headers.iter().position(|header| header == wanted)
}

fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '/' || c == '-' { '_' } else { c })
        .collect()
}

/// `%m/%d/%y` is tried before `%m/%d/%Y` so that `1/22/20` reads as 2020.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// `Some(None)` for a blank cell, `None` for something that is not a finite number.
fn parse_value(value: &str) -> Option<Option<f64>> {
    let value = value.trim();
    if value.is_empty() {
        return Some(None);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2021-02-03"), Some(date(2021, 2, 3)));
        assert_eq!(parse_date("1/22/20"), Some(date(2020, 1, 22)));
        assert_eq!(parse_date("01/22/2020"), Some(date(2020, 1, 22)));
        assert_eq!(parse_date("Lat"), None);
    }

    #[test]
    fn test_read_long_format() {
        let file = write_csv(
            "Country/Region,Date,Deaths\n\
             Italy,2020-03-01,34\n\
             Italy,2020-03-02,52\n\
             Spain,2020-03-01,0\n",
        );

        let table = CSVHandler::new().read_table(file.path(), Metric::Deaths).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.value_column(), "Deaths");
        assert_eq!(table.rows()[1], Record::new("Italy", date(2020, 3, 2), Some(52.0)));
    }

    #[test]
    fn test_read_long_format_with_aliases_and_semicolons() {
        let file = write_csv(
            "location;date;people_vaccinated\n\
             France;2021-01-01;\n\
             France;2021-01-02;1200\n\
             France;not-a-date;5\n\
             ;2021-01-02;7\n",
        );

        let table = CSVHandler::new()
            .read_table(file.path(), Metric::PeopleVaccinated)
            .unwrap();
        assert_eq!(table.country_column(), "Country");
        assert_eq!(
            table.rows(),
            &[
                Record::new("France", date(2021, 1, 1), None),
                Record::new("France", date(2021, 1, 2), Some(1200.0)),
            ]
        );
    }

    #[test]
    fn test_read_wide_format_sums_provinces() {
        let file = write_csv(
            "Province/State,Country/Region,Lat,Long,1/22/20,1/23/20\n\
             ,Italy,41.9,12.6,0,2\n\
             Hubei,China,30.9,112.3,444,444\n\
             Beijing,China,40.2,116.4,14,22\n",
        );

        let table = CSVHandler::new()
            .read_table(file.path(), Metric::ConfirmedCases)
            .unwrap();
        assert_eq!(
            table.rows(),
            &[
                Record::new("China", date(2020, 1, 22), Some(458.0)),
                Record::new("China", date(2020, 1, 23), Some(466.0)),
                Record::new("Italy", date(2020, 1, 22), Some(0.0)),
                Record::new("Italy", date(2020, 1, 23), Some(2.0)),
            ]
        );
    }

    #[test]
    fn test_missing_metric_column() {
        let file = write_csv("Country/Region,Date,Cases\nItaly,2020-03-01,34\n");

        let err = CSVHandler::new().read_table(file.path(), Metric::Deaths).unwrap_err();
        match err {
            DashboardError::MissingColumn { column, .. } => assert_eq!(column, "Deaths"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = CSVHandler::new()
            .read_table("/definitely/not/here.csv", Metric::Deaths)
            .unwrap_err();
        assert!(matches!(err, DashboardError::Io { .. }));
    }

    #[test]
    fn test_non_finite_values_are_skipped() {
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value("inf"), None);
        assert_eq!(parse_value("-infinity"), None);
        assert_eq!(parse_value(" 12.5 "), Some(Some(12.5)));
        assert_eq!(parse_value(""), Some(None));

        let file = write_csv(
            "Country,Date,People Vaccinated\n\
             France,2021-01-01,NaN\n\
             France,2021-01-02,inf\n\
             France,2021-01-03,300\n",
        );

        let table = CSVHandler::new()
            .read_table(file.path(), Metric::PeopleVaccinated)
            .unwrap();
        assert_eq!(table.rows(), &[Record::new("France", date(2021, 1, 3), Some(300.0))]);
    }

    #[test]
    fn test_wide_row_with_bad_cell_is_dropped() {
        let file = write_csv(
            "Province/State,Country/Region,Lat,Long,1/22/20,1/23/20\n\
             ,Italy,41.9,12.6,0,2\n\
             ,Spain,40.4,-3.7,1,n/a\n\
             ,Chile,-35.6,-71.5,3,inf\n",
        );

        let table = CSVHandler::new().read_table(file.path(), Metric::Deaths).unwrap();
        assert_eq!(
            table.rows(),
            &[
                Record::new("Italy", date(2020, 1, 22), Some(0.0)),
                Record::new("Italy", date(2020, 1, 23), Some(2.0)),
            ]
        );
        assert!(table.filter_country("Spain").is_empty());
        assert!(table.filter_country("Chile").is_empty());
    }
}
