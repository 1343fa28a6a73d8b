//! Chart adapter module. Renders badge histories for chat and console.

pub mod badge_chart;

pub use badge_chart::{
    ChartError, chart_attachment, csv_attachment, cumulative_series, monthly_bars, plot_points,
    render_png, series_to_csv,
};
