use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use crate::models::PairPage;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Entry {
    page: Arc<PairPage>,
    stored_at: Instant,
}

/// Single-slot cache for the last fetched page.
///
/// Readers never block each other. Two callers missing at once will both
/// fetch and the later `store` wins.
pub struct PairCache {
    slot: RwLock<Option<Entry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl PairCache {
    pub fn new(ttl_seconds: u64) -> Self {
        Self::with_clock(ttl_seconds, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl_seconds: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: RwLock::new(None),
            ttl: Duration::from_secs(ttl_seconds),
            clock,
        }
    }

    /// The stored page, if it is younger than the TTL.
    pub fn get(&self) -> Option<Arc<PairPage>> {
        let slot = self.slot.read();
        let entry = slot.as_ref()?;
        if self.clock.now().saturating_duration_since(entry.stored_at) < self.ttl {
            Some(entry.page.clone())
        } else {
            None
        }
    }

    pub fn store(&self, page: PairPage) -> Arc<PairPage> {
        let page = Arc::new(page);
        *self.slot.write() = Some(Entry {
            page: page.clone(),
            stored_at: self.clock.now(),
        });
        page
    }

    #[allow(dead_code)]
    pub fn clear(&self) {
        *self.slot.write() = None;
    }
}
