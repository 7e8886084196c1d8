//! CSV Data Loader Module
//! Loads the wide source tables with Polars and validates them against an
//! explicit schema instead of guessing which columns hold years.

use polars::prelude::*;
use std::ops::RangeInclusive;
use std::path::Path;
use thiserror::Error;

/// Missing-value marker shared by all three source files.
pub const MISSING_SENTINEL: &str = "N/A";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("input file not found: {0}")]
    MissingFile(String),
    #[error("failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("{table}: missing required column '{column}'")]
    MissingColumn { table: &'static str, column: String },
    #[error("{table}: unexpected column '{column}' (not an identifier and not a year in {lo}..={hi})")]
    UnexpectedColumn {
        table: &'static str,
        column: String,
        lo: i32,
        hi: i32,
    },
    #[error("{table}: no year columns found")]
    NoYearColumns { table: &'static str },
}

/// Declares the shape of one wide source table: which columns identify the
/// row, which are discarded, and which range of years is plausible.
pub struct WideSchema {
    pub table: &'static str,
    pub id_columns: &'static [&'static str],
    pub ignored_columns: &'static [&'static str],
    pub year_range: RangeInclusive<i32>,
}

/// Historical emissions source (one row per country/sector/gas).
pub const EMISSIONS_SCHEMA: WideSchema = WideSchema {
    table: "emissions",
    id_columns: &["Country", "Sector", "Gas", "Unit"],
    ignored_columns: &["Data source"],
    year_range: 1850..=2030,
};

/// World Bank GDP-per-capita source.
pub const GDP_SCHEMA: WideSchema = WideSchema {
    table: "gdp",
    id_columns: &["Country Name", "Country Code"],
    ignored_columns: &["Indicator Name", "Indicator Code"],
    year_range: 1900..=2030,
};

/// World Bank population source. Same shape as GDP without the indicator
/// metadata columns.
pub const POPULATION_SCHEMA: WideSchema = WideSchema {
    table: "population",
    id_columns: &["Country Name", "Country Code"],
    ignored_columns: &[],
    year_range: 1900..=2030,
};

/// A loaded, schema-validated wide table. `year_columns` holds the year
/// columns in header order, paired with their parsed year.
#[derive(Debug)]
pub struct WideTable {
    pub df: DataFrame,
    pub year_columns: Vec<(String, i32)>,
}

/// Load a wide CSV and validate it against `schema`.
///
/// The sentinel `"N/A"` is read as null. The World Bank exports are not
/// always valid UTF-8, so the read is lossy rather than failing on a stray
/// byte. Single pass, no retries.
pub fn load_wide(path: &Path, schema: &WideSchema) -> Result<WideTable, LoaderError> {
    if !path.exists() {
        return Err(LoaderError::MissingFile(path.display().to_string()));
    }

    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(10000))
        .with_null_values(Some(NullValues::AllColumnsSingle(MISSING_SENTINEL.into())))
        .with_encoding(CsvEncoding::LossyUtf8)
        .finish()?
        .collect()?;

    let year_columns = validate(&df, schema)?;
    Ok(WideTable { df, year_columns })
}

/// Check every column in the frame against the schema. Returns the year
/// columns in header order; anything unaccounted for is a hard error.
fn validate(df: &DataFrame, schema: &WideSchema) -> Result<Vec<(String, i32)>, LoaderError> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for id in schema.id_columns {
        if !names.iter().any(|n| n == id) {
            return Err(LoaderError::MissingColumn {
                table: schema.table,
                column: (*id).to_string(),
            });
        }
    }

    let mut year_columns = Vec::new();
    for name in &names {
        if schema.id_columns.contains(&name.as_str())
            || schema.ignored_columns.contains(&name.as_str())
        {
            continue;
        }
        match name.trim().parse::<i32>() {
            Ok(year) if schema.year_range.contains(&year) => {
                year_columns.push((name.clone(), year));
            }
            _ => {
                return Err(LoaderError::UnexpectedColumn {
                    table: schema.table,
                    column: name.clone(),
                    lo: *schema.year_range.start(),
                    hi: *schema.year_range.end(),
                });
            }
        }
    }

    if year_columns.is_empty() {
        return Err(LoaderError::NoYearColumns {
            table: schema.table,
        });
    }

    Ok(year_columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_expected_shape() {
        let df = df![
            "Country" => ["China"],
            "Data source" => ["CAIT"],
            "Sector" => ["Total including LUCF"],
            "Gas" => ["All GHG"],
            "Unit" => ["MtCO2e"],
            "2018" => [11706.0],
            "2019" => [12055.0],
        ]
        .unwrap();

        let years = validate(&df, &EMISSIONS_SCHEMA).unwrap();
        assert_eq!(
            years,
            vec![("2018".to_string(), 2018), ("2019".to_string(), 2019)]
        );
    }

    #[test]
    fn test_validate_rejects_unexpected_column() {
        let df = df![
            "Country" => ["China"],
            "Sector" => ["Total including LUCF"],
            "Gas" => ["All GHG"],
            "Unit" => ["MtCO2e"],
            "Notes" => ["?"],
            "2019" => [12055.0],
        ]
        .unwrap();

        let err = validate(&df, &EMISSIONS_SCHEMA).unwrap_err();
        assert!(matches!(err, LoaderError::UnexpectedColumn { column, .. } if column == "Notes"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_year() {
        let df = df![
            "Country Name" => ["China"],
            "Country Code" => ["CHN"],
            "1776" => [1.0],
        ]
        .unwrap();

        let err = validate(&df, &POPULATION_SCHEMA).unwrap_err();
        assert!(matches!(err, LoaderError::UnexpectedColumn { column, .. } if column == "1776"));
    }

    #[test]
    fn test_validate_requires_id_columns() {
        let df = df![
            "Country Name" => ["China"],
            "2019" => [1.0],
        ]
        .unwrap();

        let err = validate(&df, &GDP_SCHEMA).unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn { .. }));
    }

    #[test]
    fn test_validate_requires_year_columns() {
        let df = df![
            "Country Name" => ["China"],
            "Country Code" => ["CHN"],
        ]
        .unwrap();

        let err = validate(&df, &POPULATION_SCHEMA).unwrap_err();
        assert!(matches!(err, LoaderError::NoYearColumns { .. }));
    }

    #[test]
    fn test_load_wide_missing_file() {
        let err = load_wide(Path::new("no_such_file.csv"), &EMISSIONS_SCHEMA).unwrap_err();
        assert!(matches!(err, LoaderError::MissingFile(_)));
    }
}
