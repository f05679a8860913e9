//! Aggregation and filtering engine behind the employee burnout dashboard.
//!
//! Records come from an [`source::AnalyticsSource`], are narrowed by a
//! [`models::FilterState`] and reduced into the views a dashboard renders.
//! Every view is recomputed from scratch whenever scope or filters change.

pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod filter;
pub mod models;
pub mod report;
pub mod risk;
pub mod series;
pub mod source;
