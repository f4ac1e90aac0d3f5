// src/callbacks.rs
use std::sync::Arc;

use log::{debug, warn};

use crate::data_types::{Datasets, DATE_COLUMN};
use crate::error::RenderError;
use crate::figure::Figure;
use crate::summary::{get_country_summary, CountrySummary};

pub const SELECT_BOTH_TITLE: &str = "Please select both a country and data type to display visualizations";
pub const INVALID_SELECTION_TITLE: &str = "Invalid data selection. Please select a valid option.";
pub const TIME_SERIES_ERROR_TITLE: &str = "Error generating time series graph.";

/// Maps a (country, metric) selection to a map figure and a time-series figure.
///
/// Holds read-only snapshots of the source tables and the country summary;
/// every call is computed from scratch and never fails.
#[derive(Debug, Clone)]
pub struct VisualizationCallback {
    datasets: Arc<Datasets>,
    summary: Arc<CountrySummary>,
}

impl VisualizationCallback {
    pub fn new(datasets: Datasets) -> Self {
        let summary = get_country_summary(&datasets);
        Self::with_summary(Arc::new(datasets), Arc::new(summary))
    }

    pub fn with_summary(datasets: Arc<Datasets>, summary: Arc<CountrySummary>) -> Self {
        VisualizationCallback { datasets, summary }
    }

    pub fn summary(&self) -> &CountrySummary {
        &self.summary
    }

    pub fn render(&self, selected_country: Option<&str>, selected_data: Option<&str>) -> (Figure, Figure) {
        let (country, data) = match (non_empty(selected_country), non_empty(selected_data)) {
            (Some(country), Some(data)) => (country, data),
            _ => {
                let prompt = Figure::prompt(SELECT_BOTH_TITLE);
                return (prompt.clone(), prompt);
            }
        };

        (self.map_figure(data), self.time_series_figure(country, data))
    }

    fn map_figure(&self, selected_data: &str) -> Figure {
        match self.summary.column(selected_data) {
            Some(values) => Figure::choropleth(
                self.summary.countries().to_vec(),
                values.to_vec(),
                selected_data,
                format!("Global {selected_data} Data"),
            ),
            None => {
                debug!("No summary column for '{}'", selected_data);
                Figure::placeholder(INVALID_SELECTION_TITLE)
            }
        }
    }

    fn time_series_figure(&self, selected_country: &str, selected_data: &str) -> Figure {
        match self.build_time_series(selected_country, selected_data) {
            Ok(figure) => figure,
            Err(err) => {
                warn!(
                    "Time series for {} / {} degraded to placeholder: {}",
                    selected_country, selected_data, err
                );
                Figure::placeholder(TIME_SERIES_ERROR_TITLE)
            }
        }
    }

    fn build_time_series(&self, selected_country: &str, selected_data: &str) -> Result<Figure, RenderError> {
        let table = self.datasets.source_for(selected_data);
        let rows = table.filter_country(selected_country);

        if rows.is_empty() {
            return Ok(Figure::placeholder(format!(
                "No {selected_data} Data Available for {selected_country}"
            )));
        }

        // The line always plots the metric column; the key columns are not plottable.
        if table.value_column() != selected_data {
            return Err(RenderError::MissingColumn {
                table: table.name().to_string(),
                column: selected_data.to_string(),
            });
        }

        let (x, y): (Vec<_>, Vec<_>) = rows.iter().map(|row| (row.date, row.value)).unzip();
        Ok(Figure::line(
            x,
            y,
            DATE_COLUMN,
            selected_data,
            format!("{selected_data} Over Time in {selected_country}"),
        ))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::{Metric, Record, TimeSeriesTable};
    use crate::figure::Trace;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 6, d).unwrap()
    }

    fn callback() -> VisualizationCallback {
        let vaccinations = (1..=10)
            .map(|d| Record::new("France", day(d), Some(d as f64 * 1000.0)))
            .chain(std::iter::once(Record::new("Spain", day(1), Some(7.0))))
            .collect();

        VisualizationCallback::new(Datasets {
            confirmed: TimeSeriesTable::for_metric(
                Metric::ConfirmedCases,
                vec![
                    Record::new("France", day(2), Some(20.0)),
                    Record::new("Germany", day(1), Some(5.0)),
                    Record::new("France", day(1), Some(10.0)),
                ],
            ),
            deaths: TimeSeriesTable::for_metric(
                Metric::Deaths,
                vec![Record::new("France", day(1), Some(1.0))],
            ),
            vaccinations: TimeSeriesTable::for_metric(Metric::PeopleVaccinated, vaccinations),
        })
    }

    #[test]
    fn test_missing_selection_returns_prompt_twice() {
        let callback = callback();
        let cases = [
            (None, Some("Confirmed Cases")),
            (Some("France"), None),
            (Some(""), Some("Deaths")),
            (Some("France"), Some("")),
            (None, None),
        ];

        for (country, data) in cases {
            let (map, series) = callback.render(country, data);
            assert_eq!(map, series);
            assert_eq!(map.title(), Some(SELECT_BOTH_TITLE));
            assert!(map.axes_hidden());
        }
    }

    #[test]
    fn test_map_uses_summary_column() {
        let callback = callback();
        let (map, _) = callback.render(Some("France"), Some("Confirmed Cases"));

        assert_eq!(map.title(), Some("Global Confirmed Cases Data"));
        match &map.data[..] {
            [Trace::Choropleth { locations, z, colorbar, .. }] => {
                assert_eq!(locations, callback.summary().countries());
                assert_eq!(z.as_slice(), callback.summary().column("Confirmed Cases").unwrap());
                assert_eq!(colorbar.title.text, "Confirmed Cases");
            }
            other => panic!("expected one choropleth trace, got {other:?}"),
        }
    }

    #[test]
    fn test_vaccination_series_for_france() {
        let (_, series) = callback().render(Some("France"), Some("People Vaccinated"));

        assert_eq!(series.title(), Some("People Vaccinated Over Time in France"));
        match &series.data[..] {
            [Trace::Scatter { x, y, .. }] => {
                assert_eq!(x.len(), 10);
                assert_eq!(x[0], day(1));
                assert_eq!(y[9], Some(10000.0));
            }
            other => panic!("expected one line trace, got {other:?}"),
        }
    }

    #[test]
    fn test_series_preserves_row_order() {
        let (_, series) = callback().render(Some("France"), Some("Confirmed Cases"));
        match &series.data[..] {
            [Trace::Scatter { x, y, .. }] => {
                assert_eq!(x, &vec![day(2), day(1)]);
                assert_eq!(y, &vec![Some(20.0), Some(10.0)]);
            }
            other => panic!("expected one line trace, got {other:?}"),
        }
    }

    #[test]
    fn test_no_rows_gives_no_data_placeholder() {
        let (map, series) = callback().render(Some("Germany"), Some("Deaths"));
        assert_eq!(series.title(), Some("No Deaths Data Available for Germany"));
        assert!(series.is_placeholder());
        // The map branch is unaffected.
        assert!(!map.is_placeholder());
    }

    #[test]
    fn test_unknown_metric() {
        let callback = callback();

        let (map, series) = callback.render(Some("France"), Some("Unknown Metric"));
        assert_eq!(map.title(), Some(INVALID_SELECTION_TITLE));
        // Falls through to the deaths table, which has France rows but no such column.
        assert_eq!(series.title(), Some(TIME_SERIES_ERROR_TITLE));

        let (_, series) = callback.render(Some("Spain"), Some("Unknown Metric"));
        assert_eq!(series.title(), Some("No Unknown Metric Data Available for Spain"));
    }

    #[test]
    fn test_key_columns_are_not_plotted() {
        let callback = callback();

        for data in ["Date", "Country/Region"] {
            let (map, series) = callback.render(Some("France"), Some(data));
            assert_eq!(series.title(), Some(TIME_SERIES_ERROR_TITLE));
            assert!(series.is_placeholder());
            assert_eq!(map.title(), Some(INVALID_SELECTION_TITLE));
        }
    }
}
