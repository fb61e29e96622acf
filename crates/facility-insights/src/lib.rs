pub mod config;
pub mod dashboards;
pub mod error;
pub mod telemetry;
