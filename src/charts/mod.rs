//! Charts module - static chart rendering

mod renderer;

pub use renderer::{
    emitters_bar_chart, global_trends_chart, log_scatter_chart, status_boxplot, status_lines,
    ChartError,
};
