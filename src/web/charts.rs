//! Server-side SVG charts for the dashboard pages.
//!
//! Every chart renders into an SVG string that the templates embed inline.
//! Empty inputs produce a small "no data" block instead of an empty plot.

use std::f64::consts::{FRAC_PI_2, TAU};

use handlebars::html_escape;
use log::error;
use plotters::prelude::*;

use crate::core::aggregate::{KeyedAmount, YearMonthPivot};
use crate::core::error::{DashboardError, Result};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 400;
const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);
const LINE_COLOR: RGBColor = RGBColor(214, 39, 40);
const MAX_LABEL_CHARS: usize = 24;
const MAX_LEGEND_ROWS: usize = 16;

/// Viridis-like colour stops for the heatmap, low to high
const HEAT_STOPS: [(u8, u8, u8); 3] = [(68, 1, 84), (33, 145, 140), (253, 231, 37)];

fn render_err<E: std::fmt::Display>(e: E) -> DashboardError {
    DashboardError::RenderError(e.to_string())
}

fn font(size: f64) -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal)
}

/// Upper bound for a value axis with a little headroom
fn axis_max<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let max = values.into_iter().fold(0.0_f64, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn short_label(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_CHARS {
        label.to_string()
    } else {
        let head: String = label.chars().take(MAX_LABEL_CHARS - 1).collect();
        format!("{}…", head)
    }
}

fn segment_label(labels: &[&str], value: &SegmentValue<usize>) -> String {
    match value {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
            labels.get(*i).map(|s| short_label(s)).unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    }
}

/// Placeholder shown instead of a chart with nothing to plot
pub fn empty_chart(title: &str) -> String {
    format!(
        "<div class=\"chart-empty\"><h4>{}</h4><p>No data to display</p></div>",
        html_escape(title)
    )
}

/// Use the rendered chart, or log the failure and show a notice
pub fn or_notice(chart: Result<String>) -> String {
    match chart {
        Ok(svg) => svg,
        Err(e) => {
            error!("Chart rendering error: {}", e);
            "<p class=\"chart-error\">Chart unavailable</p>".to_string()
        }
    }
}

/// Ranked rows as horizontal bars, first row on top
pub fn horizontal_bar(
    title: &str,
    x_desc: &str,
    y_desc: &str,
    rows: &[KeyedAmount],
) -> Result<String> {
    if rows.is_empty() {
        return Ok(empty_chart(title));
    }
    // segment 0 sits at the bottom of the y axis
    let labels: Vec<&str> = rows.iter().rev().map(|r| r.key.as_str()).collect();
    let x_max = axis_max(rows.iter().map(|r| r.amount));

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, font(18.0))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(170)
            .build_cartesian_2d(0f64..x_max, (0usize..rows.len() - 1).into_segmented())
            .map_err(render_err)?;

        let label_of = |v: &SegmentValue<usize>| segment_label(&labels, v);
        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(rows.len())
            .y_label_formatter(&label_of)
            .x_desc(x_desc)
            .y_desc(y_desc)
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(
                Histogram::horizontal(&chart)
                    .style(BAR_COLOR.filled())
                    .margin(4)
                    .data(rows.iter().rev().enumerate().map(|(i, r)| (i, r.amount))),
            )
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

/// Labelled values as vertical bars in the given order
pub fn vertical_bar(
    title: &str,
    x_desc: &str,
    y_desc: &str,
    rows: &[KeyedAmount],
) -> Result<String> {
    if rows.is_empty() {
        return Ok(empty_chart(title));
    }
    let labels: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
    let y_max = axis_max(rows.iter().map(|r| r.amount));

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, font(18.0))
            .margin(12)
            .x_label_area_size(60)
            .y_label_area_size(70)
            .build_cartesian_2d((0usize..rows.len() - 1).into_segmented(), 0f64..y_max)
            .map_err(render_err)?;

        let label_of = |v: &SegmentValue<usize>| segment_label(&labels, v);
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(rows.len())
            .x_label_formatter(&label_of)
            .x_desc(x_desc)
            .y_desc(y_desc)
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(BAR_COLOR.filled())
                    .margin(6)
                    .data(rows.iter().enumerate().map(|(i, r)| (i, r.amount))),
            )
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

/// A labelled series as a line with point markers
pub fn line(
    title: &str,
    x_desc: &str,
    y_desc: &str,
    labels: &[String],
    values: &[f64],
) -> Result<String> {
    if values.is_empty() {
        return Ok(empty_chart(title));
    }
    let y_max = axis_max(values.iter().copied());
    let x_end = values.len().max(2) - 1;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, font(18.0))
            .margin(12)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(0usize..x_end, 0f64..y_max)
            .map_err(render_err)?;

        let label_of = |i: &usize| labels.get(*i).cloned().unwrap_or_default();
        chart
            .configure_mesh()
            .x_labels(values.len().min(12))
            .x_label_formatter(&label_of)
            .x_desc(x_desc)
            .y_desc(y_desc)
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(LineSeries::new(
                values.iter().enumerate().map(|(i, v)| (i, *v)),
                LINE_COLOR.stroke_width(2),
            ))
            .map_err(render_err)?;
        chart
            .draw_series(
                values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| Circle::new((i, *v), 3, LINE_COLOR.filled())),
            )
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

/// Shares of a whole as a pie with a legend on the right
pub fn pie(title: &str, rows: &[KeyedAmount]) -> Result<String> {
    let total: f64 = rows.iter().map(|r| r.amount.max(0.0)).sum();
    if total <= 0.0 {
        return Ok(empty_chart(title));
    }

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        let area = root.titled(title, font(18.0)).map_err(render_err)?;

        let (width, height) = area.dim_in_pixel();
        let radius = (f64::from(height.min(width / 2)) / 2.0 - 10.0).max(10.0);
        let center = (radius as i32 + 20, height as i32 / 2);

        let mut start = -FRAC_PI_2;
        for (i, row) in rows.iter().enumerate() {
            let share = row.amount.max(0.0) / total;
            if share <= 0.0 {
                continue;
            }
            let end = start + share * TAU;
            let steps = ((share * 120.0).ceil() as usize).max(2);

            let mut points = Vec::with_capacity(steps + 2);
            points.push(center);
            for step in 0..=steps {
                let angle = start + (end - start) * step as f64 / steps as f64;
                points.push((
                    center.0 + (radius * angle.cos()).round() as i32,
                    center.1 + (radius * angle.sin()).round() as i32,
                ));
            }
            area.draw(&Polygon::new(points, Palette99::pick(i).filled()))
                .map_err(render_err)?;
            start = end;
        }

        let legend_x = center.0 + radius as i32 + 30;
        for (i, row) in rows.iter().take(MAX_LEGEND_ROWS).enumerate() {
            let y = 10 + i as i32 * 20;
            area.draw(&Rectangle::new(
                [(legend_x, y), (legend_x + 12, y + 12)],
                Palette99::pick(i).filled(),
            ))
            .map_err(render_err)?;
            let share = row.amount.max(0.0) / total * 100.0;
            area.draw(&Text::new(
                format!("{} ({:.1}%)", short_label(&row.key), share),
                (legend_x + 18, y),
                font(12.0),
            ))
            .map_err(render_err)?;
        }

        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

/// Colour for a value scaled into 0..=1
pub fn heat_color(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) * 2.0 } else { 0.0 };
    let (from, to, f) = if t <= 1.0 {
        (HEAT_STOPS[0], HEAT_STOPS[1], t)
    } else {
        (HEAT_STOPS[1], HEAT_STOPS[2], t - 1.0)
    };
    let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * f).round() as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

fn index_label(value: f64, len: usize) -> Option<usize> {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 || rounded as usize >= len {
        return None;
    }
    Some(rounded as usize)
}

/// Year x month pivot as coloured cells; empty months stay blank
pub fn heatmap(title: &str, pivot: &YearMonthPivot) -> Result<String> {
    let max = match pivot.max_value() {
        Some(max) if max > 0.0 => max,
        _ => return Ok(empty_chart(title)),
    };
    let rows = pivot.years.len();
    let cols = pivot.months.len();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, font(18.0))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..(cols as f64 - 0.5), -0.5f64..(rows as f64 - 0.5))
            .map_err(render_err)?;

        let month_of = |v: &f64| {
            index_label(*v, cols)
                .map(|i| pivot.months[i].to_string())
                .unwrap_or_default()
        };
        let year_of = |v: &f64| {
            index_label(*v, rows)
                .map(|i| pivot.years[i].to_string())
                .unwrap_or_default()
        };
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(cols)
            .y_labels(rows)
            .x_label_formatter(&month_of)
            .y_label_formatter(&year_of)
            .x_desc("Month")
            .y_desc("Year")
            .draw()
            .map_err(render_err)?;

        let cells = pivot.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter_map(move |(col, cell)| cell.map(|value| (row, col, value)))
        });
        chart
            .draw_series(cells.map(|(row, col, value)| {
                let (x, y) = (col as f64, row as f64);
                Rectangle::new(
                    [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                    heat_color(value / max).filled(),
                )
            }))
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregate::pivot_year_month;
    use crate::core::dataset::tests::sample_dataset;

    fn rows() -> Vec<KeyedAmount> {
        vec![
            KeyedAmount { key: "Bangalore".to_string(), amount: 4887.0 },
            KeyedAmount { key: "Gurgaon".to_string(), amount: 466.0 },
        ]
    }

    #[test]
    fn test_empty_inputs_render_placeholder() {
        let empty = horizontal_bar("Cities", "Amount", "City", &[]).unwrap();
        assert!(empty.contains("No data to display"));
        assert!(pie("<Sectors>", &[]).unwrap().contains("&lt;Sectors&gt;"));
        assert!(line("MoM", "Month", "Amount", &[], &[]).unwrap().contains("chart-empty"));
    }

    #[test]
    fn test_bar_charts_render_svg() {
        let svg = horizontal_bar("Most Funded Cities", "Amount", "City", &rows()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Bangalore"));

        let svg = vertical_bar("Biggest Investments", "Startup", "Amount", &rows()).unwrap();
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn test_single_row_bar_chart() {
        let svg = horizontal_bar("One", "Amount", "City", &rows()[..1]).unwrap();
        assert!(svg.starts_with("<svg"));
    }

    #[test]
    fn test_line_and_pie_render_svg() {
        let labels = vec!["01-2020".to_string(), "02-2020".to_string()];
        let svg = line("MoM", "Month", "Amount", &labels, &[10.0, 20.0]).unwrap();
        assert!(svg.contains("<polyline") || svg.contains("<path"));

        let svg = pie("Cities", &rows()).unwrap();
        assert!(svg.contains("<polygon"));
        assert!(svg.contains("Gurgaon"));
    }

    #[test]
    fn test_heatmap_renders_cells() {
        let pivot = pivot_year_month(sample_dataset().events());
        let svg = heatmap("Funding by Year and Month", &pivot).unwrap();
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn test_heat_color_endpoints() {
        assert_eq!(heat_color(0.0), RGBColor(68, 1, 84));
        assert_eq!(heat_color(0.5), RGBColor(33, 145, 140));
        assert_eq!(heat_color(1.0), RGBColor(253, 231, 37));
        assert_eq!(heat_color(f64::NAN), RGBColor(68, 1, 84));
    }

    #[test]
    fn test_short_label() {
        assert_eq!(short_label("Ola"), "Ola");
        let long = "A very long investor name that keeps going";
        assert_eq!(short_label(long).chars().count(), MAX_LABEL_CHARS);
    }

    #[test]
    fn test_or_notice_on_error() {
        let notice = or_notice(Err(DashboardError::RenderError("boom".to_string())));
        assert!(notice.contains("Chart unavailable"));
    }
}
