use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: u64,
    pub shipment_request_id: u64,
    pub provider_id: u64,
    pub rating: u8,
    pub on_time_performance: bool,
    pub cargo_condition: String,
    pub comments: Option<String>,
    pub would_reuse: bool,
    pub created_at: DateTime<Utc>,
}
