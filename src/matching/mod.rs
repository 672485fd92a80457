use crate::models::provider::{MatchedProvider, Provider, ProviderStatus};

const BASE_PERCENTAGE: i32 = 95;
const RANK_STEP: i32 = 7;

/// Positional percentage for a candidate at `rank` in the result list.
///
/// This is a directory decoration, not a comparison against the shipment
/// request: the first candidate gets 95, each later one loses 7 points, and
/// no floor is applied (large directories can rank below zero). A real
/// scoring function over vehicle types, service areas and on-time history
/// would replace this, but that is a product decision.
pub fn match_percentage(rank: usize) -> i32 {
    BASE_PERCENTAGE - RANK_STEP * rank as i32
}

/// Filters the directory down to approved providers and decorates each with
/// its rank percentage. Output is sorted descending by percentage, which is
/// the input order since the percentage only decays with rank.
pub fn rank_providers(providers: Vec<Provider>) -> Vec<MatchedProvider> {
    providers
        .into_iter()
        .filter(|provider| provider.status == ProviderStatus::Approved)
        .enumerate()
        .map(|(rank, provider)| MatchedProvider {
            provider,
            match_percentage: match_percentage(rank),
        })
        .collect()
}
