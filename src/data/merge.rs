//! Joins the three long tables into the prepared dataset.
//!
//! Country names must match exactly between the emissions and economic
//! sources; rows that find no partner are excluded, never errors. The audit
//! counts make that loss visible without changing the behavior.

use polars::prelude::*;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Row accounting for the merge, surfaced in the report.
#[derive(Debug, Default, Clone)]
pub struct MergeAudit {
    pub emissions_rows: usize,
    pub indicator_rows: usize,
    /// Emissions rows whose (country, year) found no economic partner.
    pub unmatched_emissions: usize,
    /// Join candidates discarded because a field was still null
    /// (typically missing population).
    pub dropped_null: usize,
    pub prepared_rows: usize,
}

/// Build the prepared table:
/// 1. GDP LEFT JOIN population on (Country Code, Year) — rows survive even
///    without a population count.
/// 2. Emissions INNER JOIN the result on (Country = Country Name, Year).
/// 3. Drop every row with any remaining null.
///
/// Row order of the result is not meaningful; consumers sort explicitly.
pub fn merge_tables(
    emissions: &DataFrame,
    gdp: &DataFrame,
    population: &DataFrame,
) -> Result<(DataFrame, MergeAudit), MergeError> {
    let indicators = gdp
        .clone()
        .lazy()
        .join(
            population.clone().lazy(),
            [col("Country Code"), col("Year")],
            [col("Country Code"), col("Year")],
            JoinArgs::new(JoinType::Left),
        )
        .collect()?;

    let candidates = emissions
        .clone()
        .lazy()
        .join(
            indicators.clone().lazy(),
            [col("Country"), col("Year")],
            [col("Country Name"), col("Year")],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;

    let prepared = candidates.clone().lazy().drop_nulls(None).collect()?;

    let audit = MergeAudit {
        emissions_rows: emissions.height(),
        indicator_rows: indicators.height(),
        unmatched_emissions: emissions.height().saturating_sub(candidates.height()),
        dropped_null: candidates.height() - prepared.height(),
        prepared_rows: prepared.height(),
    };

    info!(
        emissions = audit.emissions_rows,
        indicators = audit.indicator_rows,
        unmatched = audit.unmatched_emissions,
        dropped_null = audit.dropped_null,
        prepared = audit.prepared_rows,
        "merge complete"
    );

    Ok((prepared, audit))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emissions() -> DataFrame {
        df![
            "Country" => ["China", "China", "United States", "Narnia"],
            "Sector" => ["Total including LUCF"; 4],
            "Gas" => ["All GHG"; 4],
            "Unit" => ["MtCO2e"; 4],
            "Year" => [2018, 2019, 2019, 2019],
            "Emissions" => [11706.0, 12000.0, 5771.0, 3.0],
        ]
        .unwrap()
    }

    fn gdp() -> DataFrame {
        df![
            "Country Name" => ["China", "China", "United States", "Atlantis"],
            "Country Code" => ["CHN", "CHN", "USA", "ATL"],
            "Year" => [2018, 2019, 2019, 2019],
            "Gdp" => [100.05, 102.43, 653.8, 11.0],
        ]
        .unwrap()
    }

    fn population() -> DataFrame {
        df![
            "Country Code" => ["CHN", "CHN", "USA"],
            "Year" => [2018, 2019, 2019],
            "Population" => [1_392_730_000.0, 1_397_715_000.0, 328_239_523.0],
        ]
        .unwrap()
    }

    #[test]
    fn test_matching_row_survives_fully_populated() {
        let (prepared, _) = merge_tables(&emissions(), &gdp(), &population()).unwrap();

        let china_2019 = prepared
            .clone()
            .lazy()
            .filter(col("Country").eq(lit("China")).and(col("Year").eq(lit(2019))))
            .collect()
            .unwrap();

        assert_eq!(china_2019.height(), 1);
        let emis = china_2019.column("Emissions").unwrap().f64().unwrap();
        let gdp = china_2019.column("Gdp").unwrap().f64().unwrap();
        let pop = china_2019.column("Population").unwrap().f64().unwrap();
        assert!((emis.get(0).unwrap() - 12000.0).abs() < 1e-9);
        assert!((gdp.get(0).unwrap() - 102.43).abs() < 1e-9);
        assert!((pop.get(0).unwrap() - 1_397_715_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_unmatched_country_excluded_and_counted() {
        let (prepared, audit) = merge_tables(&emissions(), &gdp(), &population()).unwrap();

        // Narnia has emissions but no economic data.
        let narnia = prepared
            .clone()
            .lazy()
            .filter(col("Country").eq(lit("Narnia")))
            .collect()
            .unwrap();
        assert_eq!(narnia.height(), 0);
        assert_eq!(audit.unmatched_emissions, 1);
    }

    #[test]
    fn test_country_without_population_excluded() {
        let mut emissions_df = emissions();
        emissions_df = emissions_df
            .lazy()
            .filter(col("Country").neq(lit("Narnia")))
            .collect()
            .unwrap();
        // Give Atlantis an emissions row: it has GDP but no population.
        let atlantis = df![
            "Country" => ["Atlantis"],
            "Sector" => ["Total including LUCF"],
            "Gas" => ["All GHG"],
            "Unit" => ["MtCO2e"],
            "Year" => [2019],
            "Emissions" => [1.2],
        ]
        .unwrap();
        let emissions_df = emissions_df.vstack(&atlantis).unwrap();

        let (prepared, audit) = merge_tables(&emissions_df, &gdp(), &population()).unwrap();

        let found = prepared
            .clone()
            .lazy()
            .filter(col("Country").eq(lit("Atlantis")))
            .collect()
            .unwrap();
        assert_eq!(found.height(), 0);
        assert_eq!(audit.dropped_null, 1);
    }

    #[test]
    fn test_output_bounded_by_inputs() {
        let (prepared, audit) = merge_tables(&emissions(), &gdp(), &population()).unwrap();

        assert!(prepared.height() <= audit.emissions_rows);
        assert!(prepared.height() <= audit.indicator_rows);
        assert_eq!(prepared.height(), audit.prepared_rows);
    }
}
