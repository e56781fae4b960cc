//! Render-resource cache usage source.
//!
//! The frame metrics only ever consume the aggregate byte count of the render
//! cache. How the cache stores or evicts resources is its own business; it
//! just has to answer `used_capacity_bytes` when asked.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use thiserror::Error;

/// Error reported by a cache that cannot answer right now.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("render cache unavailable: {0}")]
    Unavailable(String),
}

/// Anything that can report how many bytes the render-resource cache holds.
pub trait RenderResourceCache: Send + Sync {
    /// Bytes currently in use by cached render resources.
    fn used_capacity_bytes(&self) -> Result<u64, CacheError>;
}

/// Lock-free usage counter a cache implementation updates as resources come
/// and go.
#[derive(Debug)]
pub struct CacheUsageGauge {
    used: AtomicU64,
    capacity: u64,
    online: AtomicBool,
}

impl CacheUsageGauge {
    /// Gauge for a cache limited to `capacity` bytes (0 = unbounded).
    pub fn new(capacity: u64) -> Self {
        Self {
            used: AtomicU64::new(0),
            capacity,
            online: AtomicBool::new(true),
        }
    }

    pub fn set(&self, bytes: u64) {
        self.used.store(bytes, Ordering::Relaxed);
    }

    /// Account for a newly cached resource.
    pub fn add(&self, bytes: u64) {
        self.used.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Account for an evicted resource. Saturates at zero.
    pub fn sub(&self, bytes: u64) {
        let _ = self
            .used
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |used| {
                Some(used.saturating_sub(bytes))
            });
    }

    pub fn used(&self) -> u64 {
        self.used.load(Ordering::Relaxed)
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Used bytes as a fraction of capacity (0.0 to 1.0, may exceed 1.0 if
    /// the cache overshoots before evicting).
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.used() as f64 / self.capacity as f64
    }

    /// Mark the cache as reachable or not. While offline, queries fail with
    /// `CacheError::Unavailable`.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }
}

impl Default for CacheUsageGauge {
    fn default() -> Self {
        Self::new(0)
    }
}

impl RenderResourceCache for CacheUsageGauge {
    fn used_capacity_bytes(&self) -> Result<u64, CacheError> {
        if !self.online.load(Ordering::Relaxed) {
            return Err(CacheError::Unavailable("cache is offline".into()));
        }
        Ok(self.used())
    }
}
