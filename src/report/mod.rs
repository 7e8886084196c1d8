//! Report module - Markdown document assembly

mod writer;

pub use writer::{ReportBuilder, ReportError};
