//! Data models for dashboard entities.
//!
//! This module contains the payload structures for the dataset endpoints:
//!
//! - `DatasetEntry`: list-view row
//! - `Dataset`: full detail with statistics and `Equipment` rows
//! - `DatasetSummary`: nested per-metric statistics and type distribution

pub mod dataset;

pub use dataset::{
    Dataset, DatasetEntry, DatasetSummary, Equipment, MetricStats, SummaryStatistics, TypeCount,
};
