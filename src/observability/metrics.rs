use prometheus::{Encoder, GaugeVec, Histogram, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub entities_created_total: IntCounterVec,
    pub bid_decisions_total: IntCounterVec,
    pub match_candidates: Histogram,
    pub provider_score: GaugeVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let entities_created_total = IntCounterVec::new(
            Opts::new("entities_created_total", "Records created by entity type"),
            &["entity"],
        )
        .expect("valid entities_created_total metric");

        let bid_decisions_total = IntCounterVec::new(
            Opts::new("bid_decisions_total", "Bid decisions by outcome"),
            &["outcome"],
        )
        .expect("valid bid_decisions_total metric");

        let match_candidates = Histogram::with_opts(
            prometheus::HistogramOpts::new(
                "match_candidates",
                "Number of candidates returned per match query",
            )
            .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0]),
        )
        .expect("valid match_candidates metric");

        let provider_score = GaugeVec::new(
            Opts::new("provider_score", "Provider feedback score [0..5]"),
            &["provider_id"],
        )
        .expect("valid provider_score metric");

        registry
            .register(Box::new(entities_created_total.clone()))
            .expect("register entities_created_total");
        registry
            .register(Box::new(bid_decisions_total.clone()))
            .expect("register bid_decisions_total");
        registry
            .register(Box::new(match_candidates.clone()))
            .expect("register match_candidates");
        registry
            .register(Box::new(provider_score.clone()))
            .expect("register provider_score");

        Self {
            registry,
            entities_created_total,
            bid_decisions_total,
            match_candidates,
            provider_score,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
