//! Dataset and equipment payloads.
//!
//! These mirror the backend serializers field-for-field; the client passes
//! them through without reinterpreting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One equipment row from an uploaded CSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    pub id: i64,
    pub equipment_name: String,
    pub equipment_type: String,
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
}

/// List-view row for a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub id: i64,
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
    pub total_count: i64,
    pub equipment_count: i64,
}

/// Full dataset detail with flat min/avg/max statistics and equipment rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub id: i64,
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
    pub total_count: i64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    pub min_flowrate: f64,
    pub max_flowrate: f64,
    pub min_pressure: f64,
    pub max_pressure: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    #[serde(default)]
    pub equipment: Vec<Equipment>,
    pub equipment_count: i64,
}

/// Min/avg/max for one metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

/// Count of equipment rows sharing a type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeCount {
    pub equipment_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub flowrate: MetricStats,
    pub pressure: MetricStats,
    pub temperature: MetricStats,
}

/// Nested summary payload from `/datasets/{id}/summary/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub id: i64,
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
    pub total_count: i64,
    pub statistics: SummaryStatistics,
    #[serde(default)]
    pub type_distribution: Vec<TypeCount>,
}

impl DatasetSummary {
    /// Most common equipment type; the server orders the distribution by
    /// descending count.
    pub fn top_type(&self) -> Option<&TypeCount> {
        self.type_distribution.first()
    }
}
