//! Emotion score classification and aggregation for employee wellbeing check-ins.
//!
//! Scores in `[-1.0, 1.0]` come from an external sentiment model. This crate
//! buckets them, derives positive-day streaks and reputation points, and
//! serves cached, cursor-paginated aggregates over them.

pub mod api;
pub mod cache;
pub mod config;
pub mod database;
pub mod errors;
pub mod logging;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod scoring;
pub mod service;


pub use config::AppConfig;
pub use errors::*;
