pub mod config;
pub mod dashboard;
pub mod error;
pub mod properties;
pub mod telemetry;
pub mod tenancy;
