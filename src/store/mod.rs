use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::matching::rank_providers;
use crate::models::bid::{Bid, BidStatus};
use crate::models::feedback::Feedback;
use crate::models::provider::{MatchedProvider, Provider, ProviderStatus};
use crate::models::shipment::{ShipmentRequest, ShipmentStatus};
use crate::models::user::{Role, User};

// Human-readable request handles start counting from here, so the first
// stored request (id 1) reads "REQ-1235".
const REQUEST_ID_BASE: u64 = 1234;

/// In-memory store over the five entity maps. One instance lives in
/// `AppState` for the lifetime of the process; nothing is durable and no
/// entity is ever deleted. Ids are per-entity auto-increment counters.
pub struct Store {
    users: DashMap<u64, User>,
    providers: DashMap<u64, Provider>,
    shipment_requests: DashMap<u64, ShipmentRequest>,
    bids: DashMap<u64, Bid>,
    feedback: DashMap<u64, Feedback>,
    user_seq: AtomicU64,
    provider_seq: AtomicU64,
    shipment_seq: AtomicU64,
    bid_seq: AtomicU64,
    feedback_seq: AtomicU64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StoreCounts {
    pub users: usize,
    pub providers: usize,
    pub shipment_requests: usize,
    pub bids: usize,
    pub feedback: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProvider {
    pub user_id: u64,
    pub company_name: String,
    pub rfc: String,
    #[serde(default)]
    pub vehicle_types: Vec<String>,
    #[serde(default)]
    pub service_areas: Vec<String>,
    pub currency: String,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub on_time_rate: f64,
    #[serde(default)]
    pub response_time_hours: f64,
    #[serde(default)]
    pub completed_jobs: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShipmentRequest {
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
    pub pickup_date: String,
    pub delivery_date: String,
    pub pickup_contact: Option<String>,
    pub delivery_contact: Option<String>,
    pub vehicle_type: String,
    pub vehicle_size: Option<String>,
    #[serde(default)]
    pub additional_equipment: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBid {
    pub shipment_request_id: u64,
    pub provider_id: u64,
    pub price: f64,
    pub currency: String,
    pub transit_time: f64,
    pub transit_time_unit: String,
    pub availability: String,
    pub valid_until: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeedback {
    pub shipment_request_id: u64,
    pub provider_id: u64,
    pub rating: u8,
    pub on_time_performance: bool,
    pub cargo_condition: String,
    pub comments: Option<String>,
    pub would_reuse: bool,
}

impl Store {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            providers: DashMap::new(),
            shipment_requests: DashMap::new(),
            bids: DashMap::new(),
            feedback: DashMap::new(),
            user_seq: AtomicU64::new(0),
            provider_seq: AtomicU64::new(0),
            shipment_seq: AtomicU64::new(0),
            bid_seq: AtomicU64::new(0),
            feedback_seq: AtomicU64::new(0),
        }
    }

    pub fn counts(&self) -> StoreCounts {
        StoreCounts {
            users: self.users.len(),
            providers: self.providers.len(),
            shipment_requests: self.shipment_requests.len(),
            bids: self.bids.len(),
            feedback: self.feedback.len(),
        }
    }

    // --- users ---

    /// Get-or-create by username. A second login with a known username
    /// returns the existing record untouched, whatever role it sends.
    pub fn login(&self, username: &str, role: Role, company_name: Option<String>) -> User {
        if let Some(existing) = self
            .users
            .iter()
            .find(|entry| entry.value().username == username)
        {
            return existing.value().clone();
        }

        let id = next_id(&self.user_seq);
        let user = User {
            id,
            username: username.to_string(),
            password_hash: format!("mock${username}"),
            role,
            company_name: company_name.unwrap_or_else(|| "Independent".to_string()),
            created_at: Utc::now(),
        };

        self.users.insert(id, user.clone());
        user
    }

    // --- providers ---

    pub fn create_provider(&self, input: NewProvider) -> Provider {
        let id = next_id(&self.provider_seq);
        let provider = Provider {
            id,
            user_id: input.user_id,
            company_name: input.company_name,
            rfc: input.rfc,
            vehicle_types: input.vehicle_types,
            service_areas: input.service_areas,
            currency: input.currency,
            certifications: input.certifications,
            status: ProviderStatus::Pending,
            score: 0.0,
            on_time_rate: input.on_time_rate,
            response_time_hours: input.response_time_hours,
            completed_jobs: input.completed_jobs,
            created_at: Utc::now(),
        };

        self.providers.insert(id, provider.clone());
        provider
    }

    pub fn get_provider(&self, id: u64) -> Option<Provider> {
        self.providers.get(&id).map(|entry| entry.value().clone())
    }

    pub fn list_providers(&self) -> Vec<Provider> {
        let mut providers: Vec<Provider> = self
            .providers
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        providers.sort_by_key(|provider| provider.id);
        providers
    }

    /// Approved providers ordered by score descending, ties broken by id.
    pub fn top_providers(&self, limit: usize) -> Vec<Provider> {
        let mut approved: Vec<Provider> = self
            .providers
            .iter()
            .filter(|entry| entry.value().status == ProviderStatus::Approved)
            .map(|entry| entry.value().clone())
            .collect();

        approved.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.id.cmp(&b.id))
        });
        approved.truncate(limit);
        approved
    }

    pub fn update_provider_status(
        &self,
        id: u64,
        status: ProviderStatus,
    ) -> Result<Provider, AppError> {
        let mut provider = self
            .providers
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("provider {id} not found")))?;

        provider.status = status;
        Ok(provider.clone())
    }

    // --- shipment requests ---

    pub fn create_shipment_request(&self, input: NewShipmentRequest) -> ShipmentRequest {
        let id = next_id(&self.shipment_seq);
        let request = ShipmentRequest {
            id,
            request_id: format!("REQ-{}", REQUEST_ID_BASE + id),
            user_id: input.user_id,
            requestor_name: input.requestor_name,
            company: input.company,
            cargo_type: input.cargo_type,
            weight: input.weight,
            volume: input.volume,
            packaging_type: input.packaging_type,
            special_requirements: input.special_requirements,
            pickup_address: input.pickup_address,
            delivery_address: input.delivery_address,
            pickup_date: input.pickup_date,
            delivery_date: input.delivery_date,
            pickup_contact: input.pickup_contact,
            delivery_contact: input.delivery_contact,
            vehicle_type: input.vehicle_type,
            vehicle_size: input.vehicle_size,
            additional_equipment: input.additional_equipment,
            status: ShipmentStatus::Pending,
            assigned_provider_id: None,
            created_at: Utc::now(),
        };

        self.shipment_requests.insert(id, request.clone());
        request
    }

    // Misses are real misses here. The original store fell back to the first
    // stored record on an unknown id, which masked absent-entity errors; the
    // route layer turns `None` into a 404 instead.
    pub fn get_shipment_request(&self, id: u64) -> Option<ShipmentRequest> {
        self.shipment_requests
            .get(&id)
            .map(|entry| entry.value().clone())
    }

    pub fn list_shipment_requests(&self, user_id: Option<u64>) -> Vec<ShipmentRequest> {
        let mut requests: Vec<ShipmentRequest> = self
            .shipment_requests
            .iter()
            .filter(|entry| user_id.is_none_or(|uid| entry.value().user_id == uid))
            .map(|entry| entry.value().clone())
            .collect();
        requests.sort_by_key(|request| request.id);
        requests
    }

    pub fn update_shipment_request_status(
        &self,
        id: u64,
        status: ShipmentStatus,
    ) -> Result<ShipmentRequest, AppError> {
        let mut request = self
            .shipment_requests
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("shipment request {id} not found")))?;

        request.status = status;
        Ok(request.clone())
    }

    /// Sets the assigned provider and moves the request to Assigned in one
    /// step. Both ids are checked before anything is written, so a failed
    /// assign leaves every record as it was.
    pub fn assign_provider(
        &self,
        request_id: u64,
        provider_id: u64,
    ) -> Result<ShipmentRequest, AppError> {
        if !self.providers.contains_key(&provider_id) {
            return Err(AppError::NotFound(format!(
                "provider {provider_id} not found"
            )));
        }

        let mut request = self.shipment_requests.get_mut(&request_id).ok_or_else(|| {
            AppError::NotFound(format!("shipment request {request_id} not found"))
        })?;

        request.assigned_provider_id = Some(provider_id);
        request.status = ShipmentStatus::Assigned;
        Ok(request.clone())
    }

    /// Ranked provider candidates for a request. The request id is only
    /// checked for existence; the ranking itself is positional over the
    /// approved directory (see `matching`).
    pub fn matching_candidates(
        &self,
        request_id: u64,
    ) -> Result<Vec<MatchedProvider>, AppError> {
        if !self.shipment_requests.contains_key(&request_id) {
            return Err(AppError::NotFound(format!(
                "shipment request {request_id} not found"
            )));
        }

        Ok(rank_providers(self.list_providers()))
    }

    // --- bids ---

    pub fn create_bid(&self, input: NewBid) -> Result<Bid, AppError> {
        if !self.shipment_requests.contains_key(&input.shipment_request_id) {
            return Err(AppError::NotFound(format!(
                "shipment request {} not found",
                input.shipment_request_id
            )));
        }
        if !self.providers.contains_key(&input.provider_id) {
            return Err(AppError::NotFound(format!(
                "provider {} not found",
                input.provider_id
            )));
        }

        let id = next_id(&self.bid_seq);
        let bid = Bid {
            id,
            shipment_request_id: input.shipment_request_id,
            provider_id: input.provider_id,
            price: input.price,
            currency: input.currency,
            transit_time: input.transit_time,
            transit_time_unit: input.transit_time_unit,
            availability: input.availability,
            valid_until: input.valid_until,
            notes: input.notes,
            status: BidStatus::Pending,
            created_at: Utc::now(),
        };

        self.bids.insert(id, bid.clone());
        Ok(bid)
    }

    pub fn get_bid(&self, id: u64) -> Option<Bid> {
        self.bids.get(&id).map(|entry| entry.value().clone())
    }

    pub fn list_bids(
        &self,
        shipment_request_id: Option<u64>,
        provider_id: Option<u64>,
    ) -> Vec<Bid> {
        let mut bids: Vec<Bid> = self
            .bids
            .iter()
            .filter(|entry| {
                let bid = entry.value();
                shipment_request_id.is_none_or(|sid| bid.shipment_request_id == sid)
                    && provider_id.is_none_or(|pid| bid.provider_id == pid)
            })
            .map(|entry| entry.value().clone())
            .collect();
        bids.sort_by_key(|bid| bid.id);
        bids
    }

    pub fn update_bid_status(&self, id: u64, status: BidStatus) -> Result<Bid, AppError> {
        if status == BidStatus::Pending {
            return Err(AppError::BadRequest(
                "a bid cannot be moved back to Pending".to_string(),
            ));
        }

        let mut bid = self
            .bids
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("bid {id} not found")))?;

        if bid.status.is_decided() {
            return Err(AppError::Conflict(format!(
                "bid {id} is already {:?}",
                bid.status
            )));
        }

        bid.status = status;
        Ok(bid.clone())
    }

    // --- feedback ---

    /// Inserts the feedback and recomputes the provider's score as the mean
    /// of every rating submitted for it so far.
    pub fn create_feedback(&self, input: NewFeedback) -> Result<Feedback, AppError> {
        if !self.shipment_requests.contains_key(&input.shipment_request_id) {
            return Err(AppError::NotFound(format!(
                "shipment request {} not found",
                input.shipment_request_id
            )));
        }
        if !self.providers.contains_key(&input.provider_id) {
            return Err(AppError::NotFound(format!(
                "provider {} not found",
                input.provider_id
            )));
        }

        let id = next_id(&self.feedback_seq);
        let feedback = Feedback {
            id,
            shipment_request_id: input.shipment_request_id,
            provider_id: input.provider_id,
            rating: input.rating,
            on_time_performance: input.on_time_performance,
            cargo_condition: input.cargo_condition,
            comments: input.comments,
            would_reuse: input.would_reuse,
            created_at: Utc::now(),
        };

        self.feedback.insert(id, feedback.clone());
        self.recompute_provider_score(input.provider_id);
        Ok(feedback)
    }

    pub fn get_feedback(&self, id: u64) -> Option<Feedback> {
        self.feedback.get(&id).map(|entry| entry.value().clone())
    }

    pub fn list_feedback(
        &self,
        shipment_request_id: Option<u64>,
        provider_id: Option<u64>,
    ) -> Vec<Feedback> {
        let mut items: Vec<Feedback> = self
            .feedback
            .iter()
            .filter(|entry| {
                let fb = entry.value();
                shipment_request_id.is_none_or(|sid| fb.shipment_request_id == sid)
                    && provider_id.is_none_or(|pid| fb.provider_id == pid)
            })
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by_key(|fb| fb.id);
        items
    }

    fn recompute_provider_score(&self, provider_id: u64) {
        let ratings: Vec<u8> = self
            .feedback
            .iter()
            .filter(|entry| entry.value().provider_id == provider_id)
            .map(|entry| entry.value().rating)
            .collect();

        if ratings.is_empty() {
            return;
        }

        let mean = ratings.iter().map(|r| f64::from(*r)).sum::<f64>() / ratings.len() as f64;

        if let Some(mut provider) = self.providers.get_mut(&provider_id) {
            provider.score = mean;
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

fn next_id(seq: &AtomicU64) -> u64 {
    seq.fetch_add(1, Ordering::Relaxed) + 1
}
