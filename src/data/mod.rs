//! Data module - loading, reshaping, imputation and merging

pub mod impute;
pub mod loader;
pub mod merge;
pub mod reshape;

pub use impute::{impute_gdp, ImputeSummary};
pub use loader::{load_wide, WideSchema, WideTable, EMISSIONS_SCHEMA, GDP_SCHEMA, POPULATION_SCHEMA};
pub use merge::{merge_tables, MergeAudit};
pub use reshape::{emissions_long, gdp_long, population_long, stack_years};
