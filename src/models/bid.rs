use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
}

impl BidStatus {
    /// Accepted and Rejected are terminal; only a pending bid can be decided.
    pub fn is_decided(self) -> bool {
        self != BidStatus::Pending
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: u64,
    pub shipment_request_id: u64,
    pub provider_id: u64,
    pub price: f64,
    pub currency: String,
    pub transit_time: f64,
    pub transit_time_unit: String,
    pub availability: String,
    pub valid_until: Option<String>,
    pub notes: Option<String>,
    pub status: BidStatus,
    pub created_at: DateTime<Utc>,
}
