// src/summary.rs
use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::data_types::{Datasets, Metric, TimeSeriesTable};

/// One row per country, one column per metric holding the latest aggregate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CountrySummary {
    countries: Vec<String>,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl CountrySummary {
    /// Builds a summary from explicit columns. Every column must have one
    /// entry per country.
    pub fn new(countries: Vec<String>, columns: BTreeMap<String, Vec<Option<f64>>>) -> Self {
        debug_assert!(columns.values().all(|values| values.len() == countries.len()));
        CountrySummary { countries, columns }
    }

    /// The `Country` column.
    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    /// Metric column by label, `None` when no such column exists.
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

/// Aggregates the three tables into a per-country summary.
pub fn get_country_summary(datasets: &Datasets) -> CountrySummary {
    let countries: BTreeSet<&str> = Metric::ALL
        .iter()
        .flat_map(|metric| datasets.table(*metric).countries())
        .collect();
    let countries: Vec<String> = countries.into_iter().map(String::from).collect();

    let columns = Metric::ALL
        .iter()
        .map(|metric| {
            let latest = latest_totals(datasets.table(*metric));
            let values = countries
                .iter()
                .map(|country| latest.get(country.as_str()).copied())
                .collect();
            (metric.label().to_string(), values)
        })
        .collect();

    CountrySummary::new(countries, columns)
}

/// Sum of the values reported on each country's most recent date that has
/// at least one value.
fn latest_totals(table: &TimeSeriesTable) -> BTreeMap<&str, f64> {
    let mut latest: BTreeMap<&str, (NaiveDate, f64)> = BTreeMap::new();

    for row in table.rows() {
        let value = match row.value {
            Some(value) => value,
            None => continue,
        };

        latest
            .entry(row.country.as_str())
            .and_modify(|(date, total)| {
                if row.date > *date {
                    *date = row.date;
                    *total = value;
                } else if row.date == *date {
                    *total += value;
                }
            })
            .or_insert((row.date, value));
    }

    latest
        .into_iter()
        .map(|(country, (_, total))| (country, total))
        .collect()
}
