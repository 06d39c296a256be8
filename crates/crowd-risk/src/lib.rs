//! Stampede risk assessment for crowded events: analyzers, weighted aggregation,
//! recommendations, and the HTTP surface used by operations dashboards.

pub mod config;
pub mod error;
pub mod risk;
pub mod telemetry;
