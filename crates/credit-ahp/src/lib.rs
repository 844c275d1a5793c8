//! Credit scoring for loan applicants with the Analytic Hierarchy Process.

pub mod config;
pub mod error;
pub mod matrix;
pub mod scoring;
pub mod telemetry;
