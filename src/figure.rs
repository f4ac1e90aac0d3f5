// src/figure.rs
//! Figure objects handed to the UI layer.
//!
//! The JSON shape follows Plotly's figure schema (`data` traces plus a
//! `layout`), so an exported figure can be fed to any Plotly front end.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, DashboardResult};

pub const COUNTRY_NAMES_MODE: &str = "country names";
pub const BLUES_COLORSCALE: &str = "Blues";
pub const LINES_MODE: &str = "lines";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    pub fn new(text: impl Into<String>) -> Self {
        Title { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Axis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
}

impl Axis {
    pub fn hidden() -> Self {
        Axis {
            visible: Some(false),
            title: None,
        }
    }

    pub fn titled(text: impl Into<String>) -> Self {
        Axis {
            visible: None,
            title: Some(Title::new(text)),
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.visible == Some(false)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorBar {
    pub title: Title,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Choropleth {
        locations: Vec<String>,
        locationmode: String,
        z: Vec<Option<f64>>,
        colorscale: String,
        colorbar: ColorBar,
    },
    Scatter {
        x: Vec<NaiveDate>,
        y: Vec<Option<f64>>,
        mode: String,
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Figure {
    #[serde(default)]
    pub data: Vec<Trace>,
    #[serde(default)]
    pub layout: Layout,
}

impl Figure {
    pub fn empty() -> Self {
        Figure::default()
    }

    /// A figure with no traces, carrying only a title.
    pub fn placeholder(title: impl Into<String>) -> Self {
        Figure {
            data: Vec::new(),
            layout: Layout {
                title: Some(Title::new(title)),
                ..Layout::default()
            },
        }
    }

    /// A placeholder with both axes hidden, used to prompt for input.
    pub fn prompt(title: impl Into<String>) -> Self {
        let mut figure = Figure::placeholder(title);
        figure.layout.xaxis = Some(Axis::hidden());
        figure.layout.yaxis = Some(Axis::hidden());
        figure
    }

    /// Countries shaded by `z` on the Blues scale.
    pub fn choropleth(
        locations: Vec<String>,
        z: Vec<Option<f64>>,
        colorbar_title: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Figure {
            data: vec![Trace::Choropleth {
                locations,
                locationmode: COUNTRY_NAMES_MODE.to_string(),
                z,
                colorscale: BLUES_COLORSCALE.to_string(),
                colorbar: ColorBar {
                    title: Title::new(colorbar_title),
                },
            }],
            layout: Layout {
                title: Some(Title::new(title)),
                ..Layout::default()
            },
        }
    }

    /// Single line trace of `y` over `x`.
    pub fn line(
        x: Vec<NaiveDate>,
        y: Vec<Option<f64>>,
        x_title: &str,
        y_title: &str,
        title: impl Into<String>,
    ) -> Self {
        Figure {
            data: vec![Trace::Scatter {
                x,
                y,
                mode: LINES_MODE.to_string(),
                name: y_title.to_string(),
            }],
            layout: Layout {
                title: Some(Title::new(title)),
                xaxis: Some(Axis::titled(x_title)),
                yaxis: Some(Axis::titled(y_title)),
            },
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.layout.title.as_ref().map(|title| title.text.as_str())
    }

    pub fn is_placeholder(&self) -> bool {
        self.data.is_empty()
    }

    pub fn axes_hidden(&self) -> bool {
        let hidden = |axis: &Option<Axis>| axis.as_ref().map_or(false, Axis::is_hidden);
        hidden(&self.layout.xaxis) && hidden(&self.layout.yaxis)
    }

    pub fn to_json(&self) -> DashboardResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Both panels of the dashboard as one JSON document.
#[derive(Debug, Serialize, Deserialize)]
pub struct FigureExport {
    pub map: Figure,
    pub time_series: Figure,
}

/// Writes the map and time-series figures to `path` as pretty JSON.
pub fn write_figures(path: &Path, map: &Figure, time_series: &Figure) -> DashboardResult<()> {
    let io_error = |source| DashboardError::Io {
        path: path.to_path_buf(),
        source,
    };

    let export = FigureExport {
        map: map.clone(),
        time_series: time_series.clone(),
    };

    let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
    serde_json::to_writer_pretty(&mut writer, &export)?;
    writer.flush().map_err(io_error)?;
    Ok(())
}
