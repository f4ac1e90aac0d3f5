// src/charts.rs
//! Draws [`Figure`]s inside the dashboard panels.

use chrono::NaiveDate;
use iced::alignment::{Horizontal, Vertical};
use iced::widget::canvas::{self, Canvas, Frame, Geometry, Path, Stroke};
use iced::widget::{column, container, row, scrollable, text, Column, Space};
use iced::{mouse, Alignment, Color, Element, Length, Point, Rectangle, Renderer, Theme};

use crate::figure::{Figure, Trace};
use crate::ui::{blues, filled, normalize, Styles};

const MARGIN_LEFT: f32 = 80.0;
const MARGIN_RIGHT: f32 = 20.0;
const MARGIN_TOP: f32 = 20.0;
const MARGIN_BOTTOM: f32 = 40.0;
const TILE_WIDTH: f32 = 240.0;

/// Renders any figure: its title plus whatever trace it carries.
pub fn figure_view<'a, Message: 'a>(figure: &Figure, selected_country: Option<&str>, styles: &Styles) -> Element<'a, Message> {
    let title = figure.title().unwrap_or_default().to_string();

    if figure.is_placeholder() {
        return container(text(title).size(20).style(styles.fg).horizontal_alignment(Horizontal::Center))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x()
            .center_y()
            .into();
    }

    let body: Element<'a, Message> = match figure.data.first() {
        None => Space::with_height(Length::Fill).into(),
        Some(Trace::Choropleth { locations, z, .. }) => choropleth_tiles(locations, z, selected_country, styles),
        Some(Trace::Scatter { x, y, .. }) => Canvas::new(LineChart::new(x, y, styles))
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
    };

    column![text(title).size(20).style(styles.fg), body]
        .spacing(10)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// One shaded tile per country; the selected country is marked.
fn choropleth_tiles<'a, Message: 'a>(
    locations: &[String],
    z: &[Option<f64>],
    selected_country: Option<&str>,
    styles: &Styles,
) -> Element<'a, Message> {
    let (min, max) = value_range(z.iter().copied());

    let tiles: Vec<Element<'a, Message>> = locations.iter().zip(z).map(|(country, value)| {
        let is_selected = selected_country == Some(country.as_str());
        let (shade, label) = match value {
            Some(value) => (blues(normalize(*value, min, max)), format_value(*value)),
            None => (styles.panel_bg, "n/a".to_string()),
        };

        row![
            text(if is_selected { format!("▶ {country}") } else { country.clone() })
                .size(14)
                .style(if is_selected { styles.highlight } else { styles.fg })
                .width(Length::Fixed(TILE_WIDTH)),
            container(Space::new(Length::Fixed(48.0), Length::Fixed(14.0))).style(filled(shade)),
            text(label).size(14).style(styles.muted_fg),
        ]
        .spacing(10)
        .align_items(Alignment::Center)
        .into()
    }).collect();

    scrollable(Column::with_children(tiles).spacing(2))
        .height(Length::Fill)
        .into()
}

/// Time-series line drawn on a canvas; `None` values break the line.
pub struct LineChart {
    points: Vec<(NaiveDate, Option<f64>)>,
    line: Color,
    axis: Color,
    label: Color,
}

impl LineChart {
    pub fn new(x: &[NaiveDate], y: &[Option<f64>], styles: &Styles) -> Self {
        LineChart {
            points: x.iter().copied().zip(y.iter().copied()).collect(),
            line: styles.line,
            axis: styles.muted_fg,
            label: styles.fg,
        }
    }

    fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.points.iter().map(|(date, _)| *date).min()?;
        let last = self.points.iter().map(|(date, _)| *date).max()?;
        Some((first, last))
    }
}

impl<Message> canvas::Program<Message> for LineChart {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());

        let (first, last) = match self.date_range() {
            Some(range) => range,
            None => return vec![frame.into_geometry()],
        };
        let (min, max) = value_range(self.points.iter().map(|(_, value)| *value));

        let plot_width = (bounds.width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
        let plot_height = (bounds.height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);
        let origin = Point::new(MARGIN_LEFT, MARGIN_TOP + plot_height);
        let span_days = (last - first).num_days().max(1) as f32;

        let to_point = |date: NaiveDate, value: f64| {
            let x = origin.x + (date - first).num_days() as f32 / span_days * plot_width;
            let y = origin.y - normalize(value, min, max) * plot_height;
            Point::new(x, y)
        };

        let axes = Path::new(|builder| {
            builder.move_to(Point::new(origin.x, MARGIN_TOP));
            builder.line_to(origin);
            builder.line_to(Point::new(origin.x + plot_width, origin.y));
        });
        frame.stroke(&axes, Stroke::default().with_color(self.axis).with_width(1.0));

        let series = Path::new(|builder| {
            let mut pen_down = false;
            for (date, value) in &self.points {
                match value {
                    Some(value) => {
                        let point = to_point(*date, *value);
                        if pen_down {
                            builder.line_to(point);
                        } else {
                            builder.move_to(point);
                            pen_down = true;
                        }
                    }
                    None => pen_down = false,
                }
            }
        });
        frame.stroke(&series, Stroke::default().with_color(self.line).with_width(2.0));

        let label = |content: String, position: Point, horizontal: Horizontal, vertical: Vertical| canvas::Text {
            content,
            position,
            color: self.label,
            size: 12.0,
            horizontal_alignment: horizontal,
            vertical_alignment: vertical,
            ..canvas::Text::default()
        };

        frame.fill_text(label(format_value(max), Point::new(origin.x - 6.0, MARGIN_TOP), Horizontal::Right, Vertical::Center));
        frame.fill_text(label(format_value(min), Point::new(origin.x - 6.0, origin.y), Horizontal::Right, Vertical::Center));
        frame.fill_text(label(first.to_string(), Point::new(origin.x, origin.y + 8.0), Horizontal::Left, Vertical::Top));
        frame.fill_text(label(
            last.to_string(),
            Point::new(origin.x + plot_width, origin.y + 8.0),
            Horizontal::Right,
            Vertical::Top,
        ));

        vec![frame.into_geometry()]
    }
}

/// Min and max over the present values, `(0, 0)` when there are none.
fn value_range(values: impl Iterator<Item = Option<f64>>) -> (f64, f64) {
    values
        .flatten()
        .filter(|value| value.is_finite())
        .fold(None, |range: Option<(f64, f64)>, value| match range {
            Some((min, max)) => Some((min.min(value), max.max(value))),
            None => Some((value, value)),
        })
        .unwrap_or((0.0, 0.0))
}

/// Integer part with thousands separators, e.g. `1,234,567`.
pub fn format_value(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(999.0), "999");
        assert_eq!(format_value(1234.4), "1,234");
        assert_eq!(format_value(1234567.0), "1,234,567");
        assert_eq!(format_value(-45000.0), "-45,000");
    }

    #[test]
    fn test_value_range_skips_missing() {
        let values = vec![Some(4.0), None, Some(-2.0), Some(f64::NAN), Some(9.0)];
        assert_eq!(value_range(values.into_iter()), (-2.0, 9.0));
        assert_eq!(value_range(std::iter::empty()), (0.0, 0.0));
    }

    #[test]
    fn test_line_chart_date_range() {
        let d = |day| NaiveDate::from_ymd_opt(2021, 4, day).unwrap();
        let chart = LineChart::new(&[d(3), d(1), d(9)], &[Some(1.0), None, Some(2.0)], &crate::ui::DARK_THEME);
        assert_eq!(chart.date_range(), Some((d(1), d(9))));
    }
}
