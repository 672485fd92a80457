use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProviderStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: u64,
    pub user_id: u64,
    pub company_name: String,
    pub rfc: String,
    pub vehicle_types: Vec<String>,
    pub service_areas: Vec<String>,
    pub currency: String,
    pub certifications: Vec<String>,
    pub status: ProviderStatus,
    // Mean of all feedback ratings for this provider; recomputed on every
    // feedback insert, never edited directly.
    pub score: f64,
    pub on_time_rate: f64,
    pub response_time_hours: f64,
    pub completed_jobs: u32,
    pub created_at: DateTime<Utc>,
}

/// A provider decorated with its rank percentage for one match query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedProvider {
    #[serde(flatten)]
    pub provider: Provider,
    pub match_percentage: i32,
}
