//! Wide-to-long reshaping for the three source tables.
//! Each wrapper applies the dataset's own missing-value policy: emissions
//! and population drop missing rows, GDP keeps them for the imputer.

use polars::prelude::*;
use thiserror::Error;
use tracing::info;

use crate::data::loader::WideTable;

#[derive(Error, Debug)]
pub enum ReshapeError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Stack year columns into long rows: one output row per input row per year
/// column, in (year column, input row) order.
///
/// Output columns: the id columns as strings, "Year" (i32), and `value_name`
/// (f64, nullable). Missing cells and missing identifiers survive as nulls;
/// callers decide what to do with them.
pub fn stack_years(
    table: &WideTable,
    id_columns: &[&str],
    value_name: &str,
) -> Result<DataFrame, ReshapeError> {
    let df = &table.df;
    let height = df.height();
    let capacity = height * table.year_columns.len();

    let id_series: Vec<&Column> = id_columns
        .iter()
        .map(|name| df.column(name))
        .collect::<Result<_, _>>()?;

    let mut id_values: Vec<Vec<Option<String>>> =
        vec![Vec::with_capacity(capacity); id_columns.len()];
    let mut years: Vec<i32> = Vec::with_capacity(capacity);
    let mut values: Vec<Option<f64>> = Vec::with_capacity(capacity);

    for (col_name, year) in &table.year_columns {
        let value_f64 = df.column(col_name)?.cast(&DataType::Float64)?;
        let value_ca = value_f64.f64()?;

        for i in 0..height {
            for (slot, series) in id_values.iter_mut().zip(&id_series) {
                let v = series.get(i)?;
                if v.is_null() {
                    slot.push(None);
                } else {
                    slot.push(Some(v.to_string().trim_matches('"').to_string()));
                }
            }
            years.push(*year);
            values.push(value_ca.get(i).filter(|v| !v.is_nan()));
        }
    }

    let mut columns: Vec<Column> = id_values
        .into_iter()
        .zip(id_columns)
        .map(|(vals, name)| Column::new((*name).into(), vals))
        .collect();
    columns.push(Column::new("Year".into(), years));
    columns.push(Column::new(value_name.into(), values));

    Ok(DataFrame::new(columns)?)
}

/// Emissions: one row per (country, sector, gas, unit, year). Rows with a
/// missing emissions value are discarded; the known input loses at most a
/// handful of rows this way, so the count is logged for auditing.
pub fn emissions_long(table: &WideTable) -> Result<(DataFrame, usize), ReshapeError> {
    let stacked = stack_years(table, &["Country", "Sector", "Gas", "Unit"], "Emissions")?;
    let before = stacked.height();
    let long = stacked.lazy().drop_nulls(None).collect()?;
    let dropped = before - long.height();
    info!(dropped, rows = long.height(), "emissions reshaped to long");
    Ok((long, dropped))
}

/// GDP: one row per (country, year), missing values kept for the imputer.
/// Values are rescaled onto the normalized GDP scale (1 + GDP/100); the
/// industrialized threshold of 45 is only meaningful in this unit.
pub fn gdp_long(table: &WideTable) -> Result<DataFrame, ReshapeError> {
    let stacked = stack_years(table, &["Country Name", "Country Code"], "Gdp")?;
    let rescaled = stacked
        .lazy()
        .with_column((lit(1.0) + col("Gdp") / lit(100.0)).alias("Gdp"))
        .collect()?;
    info!(rows = rescaled.height(), "gdp reshaped to long");
    Ok(rescaled)
}

/// Population: one row per (country code, year). Missing counts are
/// unrecoverable and dropped; the country name is dropped too since the
/// merge key is the code.
pub fn population_long(table: &WideTable) -> Result<(DataFrame, usize), ReshapeError> {
    let stacked = stack_years(table, &["Country Name", "Country Code"], "Population")?;
    let before = stacked.height();
    let long = stacked
        .lazy()
        .select([col("Country Code"), col("Year"), col("Population")])
        .drop_nulls(None)
        .collect()?;
    let dropped = before - long.height();
    info!(dropped, rows = long.height(), "population reshaped to long");
    Ok((long, dropped))
}
