pub mod bid;
pub mod feedback;
pub mod provider;
pub mod shipment;
pub mod user;
