use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShipmentStatus {
    Pending,
    Assigned,
    InTransit,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRequest {
    pub id: u64,
    // Human-readable handle, derived from the numeric id ("REQ-1235", ...).
    pub request_id: String,
    pub user_id: u64,
    pub requestor_name: String,
    pub company: String,
    pub cargo_type: String,
    pub weight: f64,
    pub volume: Option<f64>,
    pub packaging_type: Option<String>,
    pub special_requirements: Option<String>,
    pub pickup_address: String,
    pub delivery_address: String,
    // Dates stay opaque strings on purpose: the upstream forms send local
    // wall-clock dates and parsing them invites timezone drift.
    pub pickup_date: String,
    pub delivery_date: String,
    pub pickup_contact: Option<String>,
    pub delivery_contact: Option<String>,
    pub vehicle_type: String,
    pub vehicle_size: Option<String>,
    pub additional_equipment: Vec<String>,
    pub status: ShipmentStatus,
    pub assigned_provider_id: Option<u64>,
    pub created_at: DateTime<Utc>,
}
