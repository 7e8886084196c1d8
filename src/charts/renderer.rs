//! Static Chart Renderer
//! Renders the report's PNG charts with plotters.

use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

use crate::stats::LinearFit;

// Palette
const BLUE: RGBColor = RGBColor(91, 155, 213);
const ORANGE: RGBColor = RGBColor(237, 125, 49);
const GREEN: RGBColor = RGBColor(112, 173, 71);
const GRAY: RGBColor = RGBColor(120, 120, 120);

const CHART_SIZE: (u32, u32) = (1000, 600);

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("failed to render {chart}: {message}")]
    Render {
        chart: &'static str,
        message: String,
    },
    #[error("no data to plot for {0}")]
    NoData(&'static str),
}

fn render_err<E: std::fmt::Display>(chart: &'static str, e: E) -> ChartError {
    ChartError::Render {
        chart,
        message: e.to_string(),
    }
}

/// Dual-axis time series: summed emissions (left axis) against mean
/// normalized GDP (right axis), per year.
pub fn global_trends_chart(path: &Path, rows: &[(i32, f64, f64)]) -> Result<(), ChartError> {
    const CHART: &str = "global trends";
    if rows.is_empty() {
        return Err(ChartError::NoData(CHART));
    }

    let year_min = rows.first().map(|r| r.0).unwrap_or(0);
    let year_max = rows.last().map(|r| r.0).unwrap_or(0) + 1;
    let emis_max = rows.iter().map(|r| r.1).fold(0.0f64, f64::max) * 1.1;
    let gdp_max = rows.iter().map(|r| r.2).fold(0.0f64, f64::max) * 1.1;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render_err(CHART, e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Global emissions and normalized GDP over time",
            ("sans-serif", 24),
        )
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(80)
        .right_y_label_area_size(60)
        .build_cartesian_2d(year_min..year_max, 0.0..emis_max)
        .map_err(|e| render_err(CHART, e))?
        .set_secondary_coord(year_min..year_max, 0.0..gdp_max);

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("Total emissions (MtCO2e)")
        .draw()
        .map_err(|e| render_err(CHART, e))?;
    chart
        .configure_secondary_axes()
        .y_desc("Mean normalized GDP")
        .draw()
        .map_err(|e| render_err(CHART, e))?;

    chart
        .draw_series(LineSeries::new(
            rows.iter().map(|&(y, e, _)| (y, e)),
            ORANGE.stroke_width(2),
        ))
        .map_err(|e| render_err(CHART, e))?
        .label("Total emissions")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ORANGE.stroke_width(2)));

    chart
        .draw_secondary_series(LineSeries::new(
            rows.iter().map(|&(y, _, g)| (y, g)),
            BLUE.stroke_width(2),
        ))
        .map_err(|e| render_err(CHART, e))?
        .label("Mean normalized GDP")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| render_err(CHART, e))?;

    root.present().map_err(|e| render_err(CHART, e))
}

/// Boxplot of emissions by industrialization status.
pub fn status_boxplot(
    path: &Path,
    industrialized: &[f64],
    developing: &[f64],
) -> Result<(), ChartError> {
    const CHART: &str = "status boxplot";
    if industrialized.is_empty() && developing.is_empty() {
        return Err(ChartError::NoData(CHART));
    }

    let y_max = industrialized
        .iter()
        .chain(developing.iter())
        .fold(0.0f32, |acc, &v| acc.max(v as f32))
        * 1.1;

    let categories = ["Industrialized", "Developing"];

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render_err(CHART, e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Emissions by industrialization status", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(80)
        .build_cartesian_2d(categories[..].into_segmented(), 0f32..y_max)
        .map_err(|e| render_err(CHART, e))?;

    chart
        .configure_mesh()
        .x_desc("Status")
        .y_desc("Emissions (MtCO2e)")
        .draw()
        .map_err(|e| render_err(CHART, e))?;

    let mut boxes = Vec::new();
    if !industrialized.is_empty() {
        boxes.push(
            Boxplot::new_vertical(
                SegmentValue::CenterOf(&categories[0]),
                &Quartiles::new(industrialized),
            )
            .width(60)
            .style(BLUE),
        );
    }
    if !developing.is_empty() {
        boxes.push(
            Boxplot::new_vertical(
                SegmentValue::CenterOf(&categories[1]),
                &Quartiles::new(developing),
            )
            .width(60)
            .style(ORANGE),
        );
    }
    chart
        .draw_series(boxes)
        .map_err(|e| render_err(CHART, e))?;

    root.present().map_err(|e| render_err(CHART, e))
}

/// Per-year mean emissions line for each status.
pub fn status_lines(
    path: &Path,
    industrialized: &[(i32, f64)],
    developing: &[(i32, f64)],
) -> Result<(), ChartError> {
    const CHART: &str = "status lines";
    if industrialized.is_empty() && developing.is_empty() {
        return Err(ChartError::NoData(CHART));
    }

    let years: Vec<i32> = industrialized
        .iter()
        .chain(developing.iter())
        .map(|r| r.0)
        .collect();
    let year_min = years.iter().min().copied().unwrap_or(0);
    let year_max = years.iter().max().copied().unwrap_or(0) + 1;
    let y_max = industrialized
        .iter()
        .chain(developing.iter())
        .map(|r| r.1)
        .fold(0.0f64, f64::max)
        * 1.1;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render_err(CHART, e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Mean emissions per year by status", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(80)
        .build_cartesian_2d(year_min..year_max, 0.0..y_max)
        .map_err(|e| render_err(CHART, e))?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("Mean emissions (MtCO2e)")
        .draw()
        .map_err(|e| render_err(CHART, e))?;

    for (name, series, color) in [
        ("Industrialized", industrialized, BLUE),
        ("Developing", developing, ORANGE),
    ] {
        if series.is_empty() {
            continue;
        }
        chart
            .draw_series(LineSeries::new(
                series.iter().copied(),
                color.stroke_width(2),
            ))
            .map_err(|e| render_err(CHART, e))?
            .label(name)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| render_err(CHART, e))?;

    root.present().map_err(|e| render_err(CHART, e))
}

/// Vertical bar chart of (country, emissions) pairs, in the given order.
pub fn emitters_bar_chart(
    path: &Path,
    title: &str,
    pairs: &[(String, f64)],
) -> Result<(), ChartError> {
    const CHART: &str = "emitters bar";
    if pairs.is_empty() {
        return Err(ChartError::NoData(CHART));
    }

    let y_max = pairs.iter().map(|p| p.1).fold(0.0f64, f64::max) * 1.1;
    let n = pairs.len() as i32;
    let labels: Vec<String> = pairs.iter().map(|p| p.0.clone()).collect();

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render_err(CHART, e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(110)
        .y_label_area_size(80)
        .build_cartesian_2d(0..n, 0.0..y_max)
        .map_err(|e| render_err(CHART, e))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(pairs.len())
        .x_label_formatter(&|idx| {
            labels
                .get(*idx as usize)
                .cloned()
                .unwrap_or_default()
        })
        .x_label_style(
            ("sans-serif", 14)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .y_desc("Emissions (MtCO2e)")
        .draw()
        .map_err(|e| render_err(CHART, e))?;

    chart
        .draw_series(pairs.iter().enumerate().map(|(i, (_, v))| {
            let i = i as i32;
            let mut bar = Rectangle::new([(i, 0.0), (i + 1, *v)], GREEN.filled());
            bar.set_margin(0, 0, 4, 4);
            bar
        }))
        .map_err(|e| render_err(CHART, e))?;

    root.present().map_err(|e| render_err(CHART, e))
}

/// Log-log scatter with the fitted trend line. `points` are already
/// ln-transformed.
pub fn log_scatter_chart(
    path: &Path,
    title: &str,
    x_desc: &str,
    points: &[(f64, f64)],
    fit: Option<&LinearFit>,
) -> Result<(), ChartError> {
    const CHART: &str = "log scatter";
    if points.is_empty() {
        return Err(ChartError::NoData(CHART));
    }

    let x_min = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let x_max = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let y_min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let y_max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let x_pad = (x_max - x_min).max(1.0) * 0.05;
    let y_pad = (y_max - y_min).max(1.0) * 0.05;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render_err(CHART, e))?;

    let caption = match fit {
        Some(fit) => format!("{} (r2 = {:.3})", title, fit.r2),
        None => title.to_string(),
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(80)
        .build_cartesian_2d(
            (x_min - x_pad)..(x_max + x_pad),
            (y_min - y_pad)..(y_max + y_pad),
        )
        .map_err(|e| render_err(CHART, e))?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("log(Emissions)")
        .draw()
        .map_err(|e| render_err(CHART, e))?;

    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, BLUE.mix(0.5).filled())),
        )
        .map_err(|e| render_err(CHART, e))?;

    if let Some(fit) = fit {
        chart
            .draw_series(LineSeries::new(
                [
                    (x_min, fit.predict(x_min)),
                    (x_max, fit.predict(x_max)),
                ],
                GRAY.stroke_width(2),
            ))
            .map_err(|e| render_err(CHART, e))?
            .label(format!("trend: slope {:.3}", fit.slope))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GRAY.stroke_width(2)));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| render_err(CHART, e))?;
    }

    root.present().map_err(|e| render_err(CHART, e))
}
