//! In-memory caching using moka
//!
//! Holds equipment listings (rates change rarely, short TTL keeps edits
//! visible) and the per-session availability monitors.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::booking::models::Equipment;
use crate::booking::AvailabilityMonitor;

/// Application cache
#[derive(Clone)]
pub struct AppCache {
    /// Equipment listings (id -> Equipment)
    pub equipment: Cache<Uuid, Arc<Equipment>>,
    /// Availability monitors (session id -> monitor)
    pub monitors: Cache<String, Arc<AvailabilityMonitor>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Equipment: 1000 entries, 5 min TTL
            equipment: Cache::builder()
                .max_capacity(1000)
                .time_to_live(Duration::from_secs(5 * 60))
                .build(),

            // Monitors: dropped after 30 min without a check
            monitors: Cache::builder()
                .max_capacity(10_000)
                .time_to_idle(Duration::from_secs(30 * 60))
                .build(),
        }
    }

    /// Monitor for a client session, created on first use
    pub async fn monitor_for(&self, session_id: &str) -> Arc<AvailabilityMonitor> {
        self.monitors
            .get_with(session_id.to_string(), async { Arc::new(AvailabilityMonitor::new()) })
            .await
    }

    /// Monitor for a session if one exists
    pub async fn existing_monitor(&self, session_id: &str) -> Option<Arc<AvailabilityMonitor>> {
        self.monitors.get(session_id).await
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            equipment_size: self.equipment.entry_count(),
            monitors_size: self.monitors.entry_count(),
        }
    }

    /// Invalidate one equipment listing
    pub async fn invalidate_equipment(&self, equipment_id: Uuid) {
        self.equipment.invalidate(&equipment_id).await;
        info!("Cache invalidated for equipment: {}", equipment_id);
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub equipment_size: u64,
    pub monitors_size: u64,
}
