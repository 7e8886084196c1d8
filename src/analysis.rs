//! Classification, aggregation and ranking over the prepared table.
//! Every function consumes the prepared table read-only and sorts its own
//! output; prepared-row order carries no meaning.

use polars::prelude::*;
use thiserror::Error;

pub const STATUS_INDUSTRIALIZED: &str = "Industrialized";
pub const STATUS_DEVELOPING: &str = "Developing";

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("prepared table is empty")]
    EmptyTable,
}

/// Tag each row with its industrialization status. Strictly greater than the
/// threshold (in normalized GDP units) counts as industrialized.
pub fn classify_industrialized(
    df: &DataFrame,
    threshold: f64,
) -> Result<DataFrame, AnalysisError> {
    let classified = df
        .clone()
        .lazy()
        .with_column(
            when(col("Gdp").gt(lit(threshold)))
                .then(lit(STATUS_INDUSTRIALIZED))
                .otherwise(lit(STATUS_DEVELOPING))
                .alias("Status"),
        )
        .collect()?;
    Ok(classified)
}

/// Most recent year present in the table.
pub fn latest_year(df: &DataFrame) -> Result<i32, AnalysisError> {
    df.column("Year")?
        .i32()?
        .max()
        .ok_or(AnalysisError::EmptyTable)
}

/// Per-year global totals: summed emissions and mean normalized GDP,
/// sorted by year.
pub fn global_trends(df: &DataFrame) -> Result<DataFrame, AnalysisError> {
    let trends = df
        .clone()
        .lazy()
        .group_by([col("Year")])
        .agg([
            col("Emissions").sum().alias("Total Emissions"),
            col("Gdp").mean().alias("Mean Gdp"),
        ])
        .sort(["Year"], Default::default())
        .collect()?;
    Ok(trends)
}

/// (year, total emissions, mean gdp) triples from [`global_trends`] output.
pub fn global_trend_rows(trends: &DataFrame) -> Result<Vec<(i32, f64, f64)>, AnalysisError> {
    let years = trends.column("Year")?.i32()?.clone();
    let emissions = trends.column("Total Emissions")?.f64()?.clone();
    let gdp = trends.column("Mean Gdp")?.f64()?.clone();

    let mut rows = Vec::with_capacity(trends.height());
    for i in 0..trends.height() {
        if let (Some(y), Some(e), Some(g)) = (years.get(i), emissions.get(i), gdp.get(i)) {
            rows.push((y, e, g));
        }
    }
    Ok(rows)
}

/// Top (or bottom) `n` emitters for one year, sorted by emissions.
pub fn rank_emitters(
    df: &DataFrame,
    year: i32,
    n: u32,
    bottom: bool,
) -> Result<DataFrame, AnalysisError> {
    let ranked = df
        .clone()
        .lazy()
        .filter(col("Year").eq(lit(year)))
        .select([col("Country"), col("Emissions"), col("Gdp"), col("Population")])
        .sort(
            ["Emissions"],
            SortMultipleOptions::default().with_order_descending(!bottom),
        )
        .limit(n)
        .collect()?;
    Ok(ranked)
}

/// Top `n` emitters for one year within a single industrialization status.
pub fn rank_emitters_by_status(
    df: &DataFrame,
    year: i32,
    status: &str,
    n: u32,
) -> Result<DataFrame, AnalysisError> {
    let ranked = df
        .clone()
        .lazy()
        .filter(
            col("Year")
                .eq(lit(year))
                .and(col("Status").eq(lit(status))),
        )
        .select([col("Country"), col("Emissions"), col("Gdp"), col("Population")])
        .sort(
            ["Emissions"],
            SortMultipleOptions::default().with_order_descending(true),
        )
        .limit(n)
        .collect()?;
    Ok(ranked)
}

/// (country, emissions) pairs from a ranking frame, for the bar charts.
pub fn ranking_pairs(ranked: &DataFrame) -> Result<Vec<(String, f64)>, AnalysisError> {
    let countries = ranked.column("Country")?;
    let emissions = ranked.column("Emissions")?.f64()?.clone();

    let mut pairs = Vec::with_capacity(ranked.height());
    for i in 0..ranked.height() {
        let country = countries.get(i)?.to_string().trim_matches('"').to_string();
        if let Some(v) = emissions.get(i) {
            pairs.push((country, v));
        }
    }
    Ok(pairs)
}

/// All emissions values for one status, for the boxplot.
pub fn status_emissions(df: &DataFrame, status: &str) -> Result<Vec<f64>, AnalysisError> {
    let filtered = df
        .clone()
        .lazy()
        .filter(col("Status").eq(lit(status)))
        .select([col("Emissions")])
        .collect()?;

    let values = filtered
        .column("Emissions")?
        .f64()?
        .into_iter()
        .flatten()
        .collect();
    Ok(values)
}

/// Per-year mean emissions for one status, sorted by year.
pub fn status_year_means(df: &DataFrame, status: &str) -> Result<Vec<(i32, f64)>, AnalysisError> {
    let means = df
        .clone()
        .lazy()
        .filter(col("Status").eq(lit(status)))
        .group_by([col("Year")])
        .agg([col("Emissions").mean().alias("Mean Emissions")])
        .sort(["Year"], Default::default())
        .collect()?;

    let years = means.column("Year")?.i32()?.clone();
    let values = means.column("Mean Emissions")?.f64()?.clone();

    let mut rows = Vec::with_capacity(means.height());
    for i in 0..means.height() {
        if let (Some(y), Some(v)) = (years.get(i), values.get(i)) {
            rows.push((y, v));
        }
    }
    Ok(rows)
}

/// (ln x, ln emissions) pairs for the log-log scatter plots. Non-positive
/// values cannot be log-transformed and are skipped.
pub fn log_points(df: &DataFrame, x_column: &str) -> Result<Vec<(f64, f64)>, AnalysisError> {
    let x = df.column(x_column)?.f64()?.clone();
    let y = df.column("Emissions")?.f64()?.clone();

    let mut points = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        if let (Some(xv), Some(yv)) = (x.get(i), y.get(i)) {
            if xv > 0.0 && yv > 0.0 {
                points.push((xv.ln(), yv.ln()));
            }
        }
    }
    Ok(points)
}
