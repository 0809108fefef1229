pub mod config;
pub mod error;
pub mod importers;
pub mod policy;
pub mod report;
pub mod telemetry;
