//! Emissions Report - Greenhouse-Gas Emissions EDA
//!
//! Loads three static tables (historical emissions by country, GDP per
//! capita, population), reshapes and merges them into one tidy table, and
//! renders a Markdown report with summary tables and charts.

pub mod analysis;
pub mod charts;
pub mod config;
pub mod data;
pub mod report;
pub mod stats;
