// src/data_types.rs
use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

pub const COUNTRY_COLUMN: &str = "Country";
pub const COUNTRY_REGION_COLUMN: &str = "Country/Region";
pub const DATE_COLUMN: &str = "Date";

/// The three quantities a user can pick in the data dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    ConfirmedCases,
    Deaths,
    PeopleVaccinated,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::ConfirmedCases, Metric::Deaths, Metric::PeopleVaccinated];

    /// Column name used both in the source tables and the country summary.
    pub fn label(self) -> &'static str {
        match self {
            Metric::ConfirmedCases => "Confirmed Cases",
            Metric::Deaths => "Deaths",
            Metric::PeopleVaccinated => "People Vaccinated",
        }
    }

    pub fn from_label(label: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|metric| metric.label() == label)
    }

    /// Name of the country column in this metric's source table.
    pub fn country_column(self) -> &'static str {
        match self {
            Metric::PeopleVaccinated => COUNTRY_COLUMN,
            Metric::ConfirmedCases | Metric::Deaths => COUNTRY_REGION_COLUMN,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One (country, date, value) observation. `value` is `None` for blank cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub country: String,
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl Record {
    pub fn new(country: impl Into<String>, date: NaiveDate, value: Option<f64>) -> Self {
        Record {
            country: country.into(),
            date,
            value,
        }
    }
}

/// A long-format table: a country column, a `Date` column and one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesTable {
    name: String,
    country_column: String,
    value_column: String,
    rows: Vec<Record>,
}

impl TimeSeriesTable {
    pub fn new(
        name: impl Into<String>,
        country_column: impl Into<String>,
        value_column: impl Into<String>,
        rows: Vec<Record>,
    ) -> Self {
        TimeSeriesTable {
            name: name.into(),
            country_column: country_column.into(),
            value_column: value_column.into(),
            rows,
        }
    }

    /// Empty table shaped for `metric`.
    pub fn empty(metric: Metric) -> Self {
        Self::for_metric(metric, Vec::new())
    }

    pub fn for_metric(metric: Metric, rows: Vec<Record>) -> Self {
        TimeSeriesTable::new(
            table_name(metric),
            metric.country_column(),
            metric.label(),
            rows,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn country_column(&self) -> &str {
        &self.country_column
    }

    pub fn value_column(&self) -> &str {
        &self.value_column
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose country equals `country` exactly, in table order.
    pub fn filter_country(&self, country: &str) -> Vec<&Record> {
        self.rows.iter().filter(|row| row.country == country).collect()
    }

    pub fn countries(&self) -> BTreeSet<&str> {
        self.rows.iter().map(|row| row.country.as_str()).collect()
    }
}

fn table_name(metric: Metric) -> &'static str {
    match metric {
        Metric::ConfirmedCases => "confirmed",
        Metric::Deaths => "deaths",
        Metric::PeopleVaccinated => "vaccination",
    }
}

/// The three source tables, loaded once and shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Datasets {
    pub confirmed: TimeSeriesTable,
    pub deaths: TimeSeriesTable,
    pub vaccinations: TimeSeriesTable,
}

impl Datasets {
    pub fn empty() -> Self {
        Datasets {
            confirmed: TimeSeriesTable::empty(Metric::ConfirmedCases),
            deaths: TimeSeriesTable::empty(Metric::Deaths),
            vaccinations: TimeSeriesTable::empty(Metric::PeopleVaccinated),
        }
    }

    /// Source table for a raw dropdown label. Anything that is neither
    /// vaccinations nor confirmed cases reads from the deaths table.
    pub fn source_for(&self, selected_data: &str) -> &TimeSeriesTable {
        match Metric::from_label(selected_data) {
            Some(Metric::PeopleVaccinated) => &self.vaccinations,
            Some(Metric::ConfirmedCases) => &self.confirmed,
            _ => &self.deaths,
        }
    }

    pub fn table(&self, metric: Metric) -> &TimeSeriesTable {
        match metric {
            Metric::ConfirmedCases => &self.confirmed,
            Metric::Deaths => &self.deaths,
            Metric::PeopleVaccinated => &self.vaccinations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, d).unwrap()
    }

    #[test]
    fn test_metric_labels() {
        assert_eq!(Metric::from_label("Deaths"), Some(Metric::Deaths));
        assert_eq!(Metric::from_label("People Vaccinated"), Some(Metric::PeopleVaccinated));
        assert_eq!(Metric::from_label("deaths"), None);
        assert_eq!(Metric::ConfirmedCases.to_string(), "Confirmed Cases");
    }

    #[test]
    fn test_filter_country_keeps_order() {
        let table = TimeSeriesTable::for_metric(
            Metric::Deaths,
            vec![
                Record::new("Chile", day(3), Some(3.0)),
                Record::new("Peru", day(1), Some(10.0)),
                Record::new("Chile", day(1), Some(1.0)),
            ],
        );

        let rows = table.filter_country("Chile");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, day(3));
        assert_eq!(rows[1].date, day(1));
        assert!(table.filter_country("chile").is_empty());
    }

    #[test]
    fn test_source_for_falls_back_to_deaths() {
        let datasets = Datasets::empty();
        assert_eq!(datasets.source_for("People Vaccinated").name(), "vaccination");
        assert_eq!(datasets.source_for("Confirmed Cases").name(), "confirmed");
        assert_eq!(datasets.source_for("Deaths").name(), "deaths");
        assert_eq!(datasets.source_for("Unknown Metric").name(), "deaths");
    }
}
