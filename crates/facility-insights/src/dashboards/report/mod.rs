mod map;
mod summary;
mod tables;
pub mod views;

pub use map::{map_view, DEFAULT_CENTER, DEFAULT_ZOOM};
pub use summary::{bar_chart, build_dashboard, donut_view, summary_cards};
pub use tables::{export_csv, table_view};
