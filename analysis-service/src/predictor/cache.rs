use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use super::{AppliancePrediction, PredictionRequest};

type BatchResult = HashMap<String, AppliancePrediction>;

#[derive(Default)]
struct Entries {
    by_key: HashMap<String, BatchResult>,
    order: VecDeque<String>,
}

/// Bounded cache of batch prediction results keyed by the request content.
///
/// Oldest entries are evicted first once `capacity` is reached.
pub struct PredictionCache {
    capacity: usize,
    entries: Mutex<Entries>,
}

impl PredictionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(Entries::default()),
        }
    }

    /// Content digest of a batch. Identical requests in the same order share a key.
    pub fn key_for(requests: &[PredictionRequest]) -> Option<String> {
        let bytes = serde_json::to_vec(requests).ok()?;
        Some(blake3::hash(&bytes).to_hex().to_string())
    }

    pub fn get(&self, key: &str) -> Option<BatchResult> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.by_key.get(key).cloned()
    }

    pub fn insert(&self, key: String, value: BatchResult) {
        if self.capacity == 0 {
            return;
        }

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.by_key.insert(key.clone(), value).is_none() {
            entries.order.push_back(key);
        }
        while entries.order.len() > self.capacity {
            if let Some(oldest) = entries.order.pop_front() {
                entries.by_key.remove(&oldest);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn request(name: &str, total: f64) -> PredictionRequest {
        PredictionRequest {
            appliance_name: name.to_string(),
            details: Map::new(),
            total_bill: total,
        }
    }

    #[test]
    fn identical_batches_share_a_key() {
        let a = [request("ac", 300.0), request("fridge", 300.0)];
        let b = [request("ac", 300.0), request("fridge", 300.0)];
        let c = [request("ac", 301.0), request("fridge", 300.0)];

        assert_eq!(PredictionCache::key_for(&a), PredictionCache::key_for(&b));
        assert_ne!(PredictionCache::key_for(&a), PredictionCache::key_for(&c));
    }

    #[test]
    fn evicts_oldest_entry_past_capacity() {
        let cache = PredictionCache::new(2);
        cache.insert("k1".into(), HashMap::new());
        cache.insert("k2".into(), HashMap::new());
        cache.insert("k3".into(), HashMap::new());

        assert_eq!(cache.len(), 2);
        assert!(cache.get("k1").is_none());
        assert!(cache.get("k3").is_some());
    }

    #[test]
    fn zero_capacity_disables_caching() {
        let cache = PredictionCache::new(0);
        cache.insert("k1".into(), HashMap::new());
        assert!(cache.is_empty());
    }
}
