use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    Agent,
    Provider,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub username: String,
    // Mock credential carried over from the demo login; never checked.
    pub password_hash: String,
    pub role: Role,
    pub company_name: String,
    pub created_at: DateTime<Utc>,
}
