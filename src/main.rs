//! Emissions Report - Greenhouse-Gas Emissions EDA
//!
//! Batch pipeline: load the three source tables, reshape and merge them into
//! one tidy table, then render summary tables and charts into a Markdown
//! report. Runs once, top to bottom, and halts.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use emissions_report::analysis::{
    classify_industrialized, global_trend_rows, global_trends, latest_year, log_points,
    rank_emitters, rank_emitters_by_status, ranking_pairs, status_emissions, status_year_means,
    STATUS_DEVELOPING, STATUS_INDUSTRIALIZED,
};
use emissions_report::charts;
use emissions_report::config::ReportConfig;
use emissions_report::data::{
    emissions_long, gdp_long, impute_gdp, load_wide, merge_tables, population_long,
    EMISSIONS_SCHEMA, GDP_SCHEMA, POPULATION_SCHEMA,
};
use emissions_report::report::ReportBuilder;
use emissions_report::stats::{describe, linear_fit, DescriptiveStats, LinearFit};

use polars::prelude::*;

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) config & output dirs ─────────────────────────────────────
    let config = ReportConfig::load_or_default(Path::new("report.json"))?;
    let charts_dir = config.charts_dir();
    fs::create_dir_all(&charts_dir)?;

    // ─── 3) load the three wide tables ───────────────────────────────
    let emissions_wide =
        load_wide(&config.emissions_path, &EMISSIONS_SCHEMA).context("loading emissions table")?;
    let gdp_wide = load_wide(&config.gdp_path, &GDP_SCHEMA).context("loading GDP table")?;
    let population_wide = load_wide(&config.population_path, &POPULATION_SCHEMA)
        .context("loading population table")?;

    // ─── 4) reshape to long form ─────────────────────────────────────
    let (emissions, emissions_dropped) = emissions_long(&emissions_wide)?;
    let gdp_raw = gdp_long(&gdp_wide)?;
    let (population, population_dropped) = population_long(&population_wide)?;

    // ─── 5) fill missing GDP per country ─────────────────────────────
    let (gdp, impute_summary) = impute_gdp(&gdp_raw)?;

    // ─── 6) merge into the prepared table ────────────────────────────
    let (prepared, audit) = merge_tables(&emissions, &gdp, &population)?;

    // ─── 7) analysis ─────────────────────────────────────────────────
    let classified = classify_industrialized(&prepared, config.industrialized_threshold)?;
    let report_year = match config.report_year {
        Some(year) => year,
        None => latest_year(&classified)?,
    };
    info!(report_year, rows = classified.height(), "prepared table ready");

    let trends = global_trends(&classified)?;
    let trend_rows = global_trend_rows(&trends)?;

    let top10 = rank_emitters(&classified, report_year, 10, false)?;
    let bottom5 = rank_emitters(&classified, report_year, 5, true)?;
    let top_industrialized =
        rank_emitters_by_status(&classified, report_year, STATUS_INDUSTRIALIZED, 10)?;
    let top_developing = rank_emitters_by_status(&classified, report_year, STATUS_DEVELOPING, 10)?;

    let industrialized_emissions = status_emissions(&classified, STATUS_INDUSTRIALIZED)?;
    let developing_emissions = status_emissions(&classified, STATUS_DEVELOPING)?;
    let industrialized_means = status_year_means(&classified, STATUS_INDUSTRIALIZED)?;
    let developing_means = status_year_means(&classified, STATUS_DEVELOPING)?;

    let population_points = log_points(&classified, "Population")?;
    let gdp_points = log_points(&classified, "Gdp")?;
    let population_fit = fit_points(&population_points);
    let gdp_fit = fit_points(&gdp_points);

    // ─── 8) charts ───────────────────────────────────────────────────
    charts::global_trends_chart(&charts_dir.join("global_trends.png"), &trend_rows)?;
    charts::status_boxplot(
        &charts_dir.join("status_boxplot.png"),
        &industrialized_emissions,
        &developing_emissions,
    )?;
    charts::status_lines(
        &charts_dir.join("status_lines.png"),
        &industrialized_means,
        &developing_means,
    )?;
    charts::emitters_bar_chart(
        &charts_dir.join("top_emitters.png"),
        &format!("Top 10 emitters ({})", report_year),
        &ranking_pairs(&top10)?,
    )?;
    charts::emitters_bar_chart(
        &charts_dir.join("bottom_emitters.png"),
        &format!("Bottom 5 emitters ({})", report_year),
        &ranking_pairs(&bottom5)?,
    )?;
    charts::log_scatter_chart(
        &charts_dir.join("population_scatter.png"),
        "log(Emissions) vs log(Population)",
        "log(Population)",
        &population_points,
        population_fit.as_ref(),
    )?;
    charts::log_scatter_chart(
        &charts_dir.join("gdp_scatter.png"),
        "log(Emissions) vs log(normalized GDP)",
        "log(normalized GDP)",
        &gdp_points,
        gdp_fit.as_ref(),
    )?;
    info!(dir = %charts_dir.display(), "charts rendered");

    // ─── 9) report document ──────────────────────────────────────────
    let sorted = classified.sort(["Country", "Year"], Default::default())?;

    let mut report = ReportBuilder::new("Greenhouse-Gas Emissions and Socioeconomic Factors");
    report.paragraph(
        "Exploratory analysis of the relationship between national emissions, \
         GDP per capita and population. Three static sources are reshaped to \
         long form, merged on country and year, and summarized below.",
    );

    report.heading("Data preparation");
    report
        .bullet(&format!(
            "Emissions rows with missing values discarded during reshape: {}",
            emissions_dropped
        ))
        .bullet(&format!(
            "Population rows with missing values discarded during reshape: {}",
            population_dropped
        ))
        .bullet(&format!(
            "GDP values filled by per-country geometric mean: {} \
             (countries with no observation at all: {})",
            impute_summary.filled, impute_summary.countries_without_observations
        ))
        .bullet(&format!(
            "Emissions rows without a matching economic record: {} \
             (excluded by the inner join)",
            audit.unmatched_emissions
        ))
        .bullet(&format!(
            "Join candidates dropped for remaining missing fields: {}",
            audit.dropped_null
        ))
        .bullet(&format!("Prepared rows: {}", audit.prepared_rows))
        .end_list();

    report.heading("Prepared dataset");
    report.paragraph("First rows (sorted by country and year):");
    report.table(&sorted.head(Some(8)), 8)?;
    report.paragraph("Last rows:");
    report.table(&sorted.tail(Some(8)), 8)?;

    report.heading("Emissions by industrialization status");
    report.paragraph(&format!(
        "Countries with normalized GDP above {} are classified as industrialized.",
        config.industrialized_threshold
    ));
    report.table(
        &status_stats_table(&industrialized_emissions, &developing_emissions)?,
        10,
    )?;
    report.image("Emissions by status", "charts/status_boxplot.png");
    report.image("Mean emissions per year by status", "charts/status_lines.png");

    report.heading(&format!("Emitter rankings ({})", report_year));
    report.paragraph("Top 10 emitters:");
    report.table(&top10, 10)?;
    report.paragraph("Bottom 5 emitters:");
    report.table(&bottom5, 5)?;
    report.paragraph("Top 10 industrialized emitters:");
    report.table(&top_industrialized, 10)?;
    report.paragraph("Top 10 non-industrialized emitters:");
    report.table(&top_developing, 10)?;
    report.image("Top emitters", "charts/top_emitters.png");
    report.image("Bottom emitters", "charts/bottom_emitters.png");

    report.heading("Global trends");
    report.image("Global emissions and GDP", "charts/global_trends.png");

    report.heading("Emissions versus socioeconomic factors");
    describe_fit(&mut report, "population", population_fit.as_ref());
    report.image("Emissions vs population", "charts/population_scatter.png");
    describe_fit(&mut report, "normalized GDP", gdp_fit.as_ref());
    report.image("Emissions vs GDP", "charts/gdp_scatter.png");

    let report_path = config.output_dir.join("report.md");
    report.save(&report_path)?;
    info!(path = %report_path.display(), "report written");

    Ok(())
}

/// Least-squares fit over already log-transformed scatter points.
fn fit_points(points: &[(f64, f64)]) -> Option<LinearFit> {
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    linear_fit(&xs, &ys)
}

/// Descriptive statistics of emissions per status group, as a small frame
/// for the report table.
fn status_stats_table(industrialized: &[f64], developing: &[f64]) -> Result<DataFrame> {
    let rows: Vec<(&str, DescriptiveStats)> = vec![
        (STATUS_INDUSTRIALIZED, describe(industrialized)),
        (STATUS_DEVELOPING, describe(developing)),
    ];

    let df = df![
        "Group" => rows.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
        "N" => rows.iter().map(|(_, s)| s.count as i64).collect::<Vec<_>>(),
        "Mean" => rows.iter().map(|(_, s)| s.mean).collect::<Vec<_>>(),
        "Median" => rows.iter().map(|(_, s)| s.median).collect::<Vec<_>>(),
        "Std" => rows.iter().map(|(_, s)| s.std).collect::<Vec<_>>(),
        "P05" => rows.iter().map(|(_, s)| s.p05).collect::<Vec<_>>(),
        "P95" => rows.iter().map(|(_, s)| s.p95).collect::<Vec<_>>(),
    ]?;
    Ok(df)
}

fn describe_fit(report: &mut ReportBuilder, factor: &str, fit: Option<&LinearFit>) {
    match fit {
        Some(fit) => {
            let significance = if fit.is_significant() {
                "significant"
            } else {
                "not significant"
            };
            report.paragraph(&format!(
                "Linear trend of log(emissions) on log({}): slope {:.3}, \
                 r2 {:.3}, p {:.4} ({}, n = {}).",
                factor, fit.slope, fit.r2, fit.p_value, significance, fit.n
            ));
        }
        None => {
            report.paragraph(&format!(
                "Not enough data to fit a trend of log(emissions) on log({}).",
                factor
            ));
        }
    }
}
