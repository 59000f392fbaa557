use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};

use crate::metrics::CACHE_SIZE;
use crate::models::{Job, JobOutput};

// Cache entry with timestamp
#[derive(Clone)]
pub struct CacheEntry {
    pub output: JobOutput,
    pub created_at: Instant,
}

// Create a cache key (hash of job kind + normalized idea)
pub fn make_cache_key(job: &Job) -> String {
    let mut hasher = Sha256::new();
    hasher.update(job.kind());
    hasher.update([0u8]);
    hasher.update(job.idea().trim().to_lowercase());
    format!("{:x}", hasher.finalize())
}

// provider outputs, valid for ttl
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<JobOutput> {
        let entry = self.entries.get(key)?;
        if entry.created_at.elapsed() < self.ttl {
            Some(entry.output.clone())
        } else {
            None
        }
    }

    pub fn insert(&self, key: String, output: JobOutput) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.insert(
            key,
            CacheEntry {
                output,
                created_at: Instant::now(),
            },
        );
        CACHE_SIZE.set(self.entries.len() as f64);
    }

    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.created_at.elapsed() < self.ttl);
        CACHE_SIZE.set(self.entries.len() as f64);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
