use crate::observability::metrics::Metrics;
use crate::store::Store;

pub struct AppState {
    pub store: Store,
    pub metrics: Metrics,
    pub demo_canned_create: bool,
}

impl AppState {
    pub fn new(demo_canned_create: bool) -> Self {
        Self {
            store: Store::new(),
            metrics: Metrics::new(),
            demo_canned_create,
        }
    }
}
