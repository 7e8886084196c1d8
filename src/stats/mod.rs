//! Stats module - descriptive statistics and trend fitting

mod calculator;

pub use calculator::{describe, linear_fit, DescriptiveStats, LinearFit, SIGNIFICANCE_THRESHOLD};
