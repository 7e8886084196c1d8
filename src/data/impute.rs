//! Per-country geometric-mean imputation for the normalized GDP table.
//!
//! A missing value is filled with the geometric mean of that country's own
//! observed values (nth root of the product of n values, computed as
//! exp(mean(ln v))). A country with nothing observed keeps its nulls; those
//! rows fall out of the inner join later.

use polars::prelude::*;
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ImputeError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// What the imputation pass did, for the report's audit section.
#[derive(Debug, Default, Clone)]
pub struct ImputeSummary {
    /// Null cells replaced with a per-country geometric mean.
    pub filled: usize,
    /// Countries with no usable observation at all; left untouched.
    pub countries_without_observations: usize,
    /// Observed values excluded from the mean because ln() needs v > 0.
    pub skipped_non_positive: usize,
}

/// Fill missing normalized-GDP values per country. Idempotent: running it
/// again on already-imputed data changes nothing.
pub fn impute_gdp(df: &DataFrame) -> Result<(DataFrame, ImputeSummary), ImputeError> {
    let countries = df.column("Country Name")?;
    let gdp = df.column("Gdp")?.f64()?.clone();
    let height = df.height();

    // First pass: per-country ln-sum and count of usable observations.
    let mut groups: HashMap<String, (f64, usize)> = HashMap::new();
    let mut has_nulls: HashMap<String, bool> = HashMap::new();
    let mut summary = ImputeSummary::default();

    for i in 0..height {
        let country = countries.get(i)?.to_string().trim_matches('"').to_string();
        match gdp.get(i) {
            Some(v) if v > 0.0 => {
                let entry = groups.entry(country).or_insert((0.0, 0));
                entry.0 += v.ln();
                entry.1 += 1;
            }
            Some(_) => {
                summary.skipped_non_positive += 1;
                groups.entry(country).or_insert((0.0, 0));
            }
            None => {
                has_nulls.insert(country, true);
            }
        }
    }

    let geo_means: HashMap<String, f64> = groups
        .iter()
        .filter(|(_, (_, count))| *count > 0)
        .map(|(country, (ln_sum, count))| (country.clone(), (ln_sum / *count as f64).exp()))
        .collect();

    summary.countries_without_observations = has_nulls
        .keys()
        .filter(|country| !geo_means.contains_key(*country))
        .count();

    // Second pass: rebuild the GDP column with nulls filled where a mean
    // exists.
    let mut filled: Vec<Option<f64>> = Vec::with_capacity(height);
    for i in 0..height {
        match gdp.get(i) {
            Some(v) => filled.push(Some(v)),
            None => {
                let country = countries.get(i)?.to_string().trim_matches('"').to_string();
                match geo_means.get(&country) {
                    Some(mean) => {
                        filled.push(Some(*mean));
                        summary.filled += 1;
                    }
                    None => filled.push(None),
                }
            }
        }
    }

    let mut out = df.clone();
    out.replace("Gdp", Series::new("Gdp".into(), filled))?;

    info!(
        filled = summary.filled,
        without_observations = summary.countries_without_observations,
        skipped_non_positive = summary.skipped_non_positive,
        "gdp imputation complete"
    );

    Ok((out, summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gdp_frame(names: &[&str], codes: &[&str], years: &[i32], gdp: &[Option<f64>]) -> DataFrame {
        df![
            "Country Name" => names,
            "Country Code" => codes,
            "Year" => years,
            "Gdp" => gdp,
        ]
        .unwrap()
    }

    #[test]
    fn test_fills_with_geometric_mean() {
        let df = gdp_frame(
            &["A", "A", "A"],
            &["AAA", "AAA", "AAA"],
            &[2017, 2018, 2019],
            &[Some(2.0), Some(8.0), None],
        );

        let (out, summary) = impute_gdp(&df).unwrap();
        let gdp = out.column("Gdp").unwrap().f64().unwrap();

        // Geometric mean of [2, 8] = sqrt(16) = 4
        assert!((gdp.get(2).unwrap() - 4.0).abs() < 1e-9);
        assert_eq!(summary.filled, 1);
        assert_eq!(out.column("Gdp").unwrap().null_count(), 0);
    }

    #[test]
    fn test_single_observation_imputes_to_itself() {
        let df = gdp_frame(
            &["A", "A", "A"],
            &["AAA", "AAA", "AAA"],
            &[2017, 2018, 2019],
            &[None, Some(32.02), None],
        );

        let (out, summary) = impute_gdp(&df).unwrap();
        let gdp = out.column("Gdp").unwrap().f64().unwrap();

        assert!((gdp.get(0).unwrap() - 32.02).abs() < 1e-9);
        assert!((gdp.get(2).unwrap() - 32.02).abs() < 1e-9);
        assert_eq!(summary.filled, 2);
    }

    #[test]
    fn test_groups_do_not_leak_across_countries() {
        let df = gdp_frame(
            &["A", "A", "B", "B"],
            &["AAA", "AAA", "BBB", "BBB"],
            &[2018, 2019, 2018, 2019],
            &[Some(10.0), None, Some(1000.0), None],
        );

        let (out, _) = impute_gdp(&df).unwrap();
        let gdp = out.column("Gdp").unwrap().f64().unwrap();

        assert!((gdp.get(1).unwrap() - 10.0).abs() < 1e-9);
        assert!((gdp.get(3).unwrap() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_country_without_observations_left_null() {
        let df = gdp_frame(
            &["A", "A"],
            &["AAA", "AAA"],
            &[2018, 2019],
            &[None, None],
        );

        let (out, summary) = impute_gdp(&df).unwrap();
        assert_eq!(out.column("Gdp").unwrap().null_count(), 2);
        assert_eq!(summary.filled, 0);
        assert_eq!(summary.countries_without_observations, 1);
    }

    #[test]
    fn test_non_positive_values_excluded_from_mean() {
        let df = gdp_frame(
            &["A", "A", "A"],
            &["AAA", "AAA", "AAA"],
            &[2017, 2018, 2019],
            &[Some(-5.0), Some(4.0), None],
        );

        let (out, summary) = impute_gdp(&df).unwrap();
        let gdp = out.column("Gdp").unwrap().f64().unwrap();

        // The -5 observation is kept in the table but not in the mean.
        assert!((gdp.get(0).unwrap() + 5.0).abs() < 1e-9);
        assert!((gdp.get(2).unwrap() - 4.0).abs() < 1e-9);
        assert_eq!(summary.skipped_non_positive, 1);
    }

    #[test]
    fn test_idempotent() {
        let df = gdp_frame(
            &["A", "A", "A"],
            &["AAA", "AAA", "AAA"],
            &[2017, 2018, 2019],
            &[Some(2.0), Some(8.0), None],
        );

        let (once, _) = impute_gdp(&df).unwrap();
        let (twice, summary) = impute_gdp(&once).unwrap();

        assert_eq!(summary.filled, 0);
        assert!(once.equals(&twice));
    }
}
