//! Growth chart - one compound-interest line per bond
//!
//! Displays:
//! - One line per projected series, legend `principal | rate`
//! - X axis in years, Y axis in value with thousands separators
//! - Y axis padded, never below zero

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Widget},
};
use warbond_core::GrowthSeries;

use crate::theme::Theme;

pub const CHART_TITLE: &str = "Compound Interest";

/// Compound-growth chart widget
pub struct GrowthChart<'a> {
    series: &'a [GrowthSeries],
    theme: &'a Theme,
}

impl<'a> GrowthChart<'a> {
    pub fn new(series: &'a [GrowthSeries], theme: &'a Theme) -> Self {
        Self { series, theme }
    }
}

impl<'a> Widget for GrowthChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let points: Vec<Vec<(f64, f64)>> = self
            .series
            .iter()
            .map(|s| {
                s.values
                    .iter()
                    .enumerate()
                    .map(|(year, &v)| (year as f64, v))
                    .collect()
            })
            .collect();

        let datasets: Vec<Dataset> = self
            .series
            .iter()
            .zip(&points)
            .enumerate()
            .map(|(i, (s, data))| {
                Dataset::default()
                    .name(s.label.clone())
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(self.theme.series_color(i)))
                    .data(data)
            })
            .collect();

        let x_max = x_upper_bound(self.series);
        let (y_lower, y_upper) = y_bounds(self.series);
        let y_mid = (y_lower + y_upper) / 2.0;

        let x_labels = vec![
            Span::raw("0"),
            Span::raw(format!("{}", x_max / 2.0)),
            Span::raw(format!("{}", x_max as usize)),
        ];
        let y_labels = vec![
            Span::raw(format_thousands(y_lower)),
            Span::raw(format_thousands(y_mid)),
            Span::raw(format_thousands(y_upper)),
        ];

        let axis_title = Style::default().fg(self.theme.text_secondary);
        let chart = Chart::new(datasets)
            .block(
                Block::default()
                    .title(Span::styled(
                        format!(" {CHART_TITLE} "),
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.accent))
                    .style(Style::default().bg(self.theme.background)),
            )
            .x_axis(
                Axis::default()
                    .title(Span::styled("Years", axis_title))
                    .style(self.theme.muted_style())
                    .bounds([0.0, x_max])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title(Span::styled("Value", axis_title))
                    .style(self.theme.muted_style())
                    .bounds([y_lower, y_upper])
                    .labels(y_labels),
            )
            .legend_position(Some(LegendPosition::TopLeft))
            .hidden_legend_constraints((Constraint::Ratio(2, 3), Constraint::Ratio(2, 3)));

        chart.render(area, buf);
    }
}

/// Last year on the x axis. At least 1 so the axis never collapses.
pub fn x_upper_bound(series: &[GrowthSeries]) -> f64 {
    let years = series
        .iter()
        .map(|s| s.values.len().saturating_sub(1))
        .max()
        .unwrap_or(0);
    years.max(1) as f64
}

/// Y axis bounds with 5% padding. The lower bound never goes below zero.
pub fn y_bounds(series: &[GrowthSeries]) -> (f64, f64) {
    let values = series.iter().flat_map(|s| s.values.iter().copied());
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }

    let range = max - min;
    let pad = if range > 0.0 {
        range * 0.05
    } else {
        (max.abs() * 0.05).max(1.0)
    };
    ((min - pad).max(0.0), max + pad)
}

/// Whole number with comma thousands separators, e.g. `1,234,568`.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}
