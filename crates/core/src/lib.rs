//! Core library: classification stage, audit and clean policy, CSV tables, reports.

pub mod audit;
pub mod classifier;
pub mod clean;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod table;
pub mod taxonomy;
