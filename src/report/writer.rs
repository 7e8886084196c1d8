//! Markdown report assembly.
//! The report is built in memory and written in one shot at the end of the
//! run, so a fatal error earlier never leaves a partial document behind.

use polars::prelude::*;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Accumulates Markdown sections and writes the final document.
pub struct ReportBuilder {
    body: String,
}

impl ReportBuilder {
    pub fn new(title: &str) -> Self {
        let mut body = String::new();
        let _ = writeln!(body, "# {}\n", title);
        Self { body }
    }

    pub fn heading(&mut self, text: &str) -> &mut Self {
        let _ = writeln!(self.body, "## {}\n", text);
        self
    }

    pub fn paragraph(&mut self, text: &str) -> &mut Self {
        let _ = writeln!(self.body, "{}\n", text);
        self
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        let _ = writeln!(self.body, "- {}", text);
        self
    }

    pub fn end_list(&mut self) -> &mut Self {
        let _ = writeln!(self.body);
        self
    }

    pub fn image(&mut self, caption: &str, relative_path: &str) -> &mut Self {
        let _ = writeln!(self.body, "![{}]({})\n", caption, relative_path);
        self
    }

    /// Render a DataFrame as a Markdown table, at most `max_rows` data rows.
    pub fn table(&mut self, df: &DataFrame, max_rows: usize) -> Result<&mut Self, ReportError> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let _ = writeln!(self.body, "| {} |", names.join(" | "));
        let _ = writeln!(
            self.body,
            "|{}|",
            names.iter().map(|_| " --- ").collect::<Vec<_>>().join("|")
        );

        let columns = df.get_columns();
        for i in 0..df.height().min(max_rows) {
            let mut cells = Vec::with_capacity(columns.len());
            for column in columns {
                cells.push(format_value(&column.get(i)?));
            }
            let _ = writeln!(self.body, "| {} |", cells.join(" | "));
        }

        if df.height() > max_rows {
            let _ = writeln!(self.body, "\n*... {} rows total*", df.height());
        }
        let _ = writeln!(self.body);
        Ok(self)
    }

    pub fn save(&self, path: &Path) -> Result<(), ReportError> {
        fs::write(path, &self.body)?;
        Ok(())
    }

    #[cfg(test)]
    fn body(&self) -> &str {
        &self.body
    }
}

fn format_value(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => "-".to_string(),
        AnyValue::Float64(v) => format!("{:.3}", v),
        AnyValue::Float32(v) => format!("{:.3}", v),
        other => other.to_string().trim_matches('"').to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_renders_rows_and_formats() {
        let df = df![
            "Country" => ["China", "Vanuatu"],
            "Year" => [2019, 2019],
            "Emissions" => [Some(12000.0), None],
        ]
        .unwrap();

        let mut report = ReportBuilder::new("Test");
        report.table(&df, 10).unwrap();
        let body = report.body();

        assert!(body.contains("| Country | Year | Emissions |"));
        assert!(body.contains("| China | 2019 | 12000.000 |"));
        assert!(body.contains("| Vanuatu | 2019 | - |"));
    }

    #[test]
    fn test_table_truncates_at_max_rows() {
        let df = df![
            "Year" => [2015, 2016, 2017, 2018, 2019],
        ]
        .unwrap();

        let mut report = ReportBuilder::new("Test");
        report.table(&df, 2).unwrap();
        let body = report.body();

        assert!(body.contains("| 2016 |"));
        assert!(!body.contains("| 2017 |"));
        assert!(body.contains("5 rows total"));
    }

    #[test]
    fn test_sections_in_order() {
        let mut report = ReportBuilder::new("Title");
        report
            .heading("Section")
            .paragraph("Some prose.")
            .image("chart", "charts/chart.png");
        let body = report.body();

        let title = body.find("# Title").unwrap();
        let section = body.find("## Section").unwrap();
        let image = body.find("![chart](charts/chart.png)").unwrap();
        assert!(title < section && section < image);
    }
}
