//! Availability checks against existing bookings and the owner calendar.
//!
//! A clean result is advisory only: nothing is held between the check and
//! the booking write, which the backend re-validates.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppError;

use super::dates::{format_storage_date, DateRange};
use super::store::BookingStore;

/// Message shown when the store could not be reached
pub const AVAILABILITY_UNVERIFIED_MESSAGE: &str =
    "Couldn't verify availability for these dates. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictType {
    Overlap,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingConflict {
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    pub message: String,
}

impl BookingConflict {
    pub fn new(conflict_type: ConflictType, message: impl Into<String>) -> Self {
        Self {
            conflict_type,
            message: message.into(),
        }
    }

    /// Synthetic conflict used when the store call fails
    pub fn unverified() -> Self {
        Self::new(ConflictType::Unavailable, AVAILABILITY_UNVERIFIED_MESSAGE)
    }
}

/// Result of one availability check
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictCheck {
    Checked(Vec<BookingConflict>),
    TimedOut,
}

impl ConflictCheck {
    pub fn is_bookable(&self) -> bool {
        matches!(self, ConflictCheck::Checked(conflicts) if conflicts.is_empty())
    }
}

/// Check a proposed range for conflicts.
///
/// Store errors become a single `unavailable` conflict so the booking stays
/// blocked; exceeding `timeout` yields [`ConflictCheck::TimedOut`].
pub async fn check_booking_conflicts(
    store: &dyn BookingStore,
    equipment_id: Uuid,
    range: &DateRange,
    timeout: Duration,
) -> ConflictCheck {
    match tokio::time::timeout(timeout, collect_conflicts(store, equipment_id, range)).await {
        Ok(Ok(conflicts)) => {
            debug!(
                "Availability check for {} {}..{}: {} conflict(s)",
                equipment_id,
                range.start_string(),
                range.end_string(),
                conflicts.len()
            );
            ConflictCheck::Checked(conflicts)
        }
        Ok(Err(e)) => {
            warn!("Availability check failed for {}: {}", equipment_id, e);
            ConflictCheck::Checked(vec![BookingConflict::unverified()])
        }
        Err(_) => {
            warn!(
                "Availability check for {} timed out after {:?}",
                equipment_id, timeout
            );
            ConflictCheck::TimedOut
        }
    }
}

async fn collect_conflicts(
    store: &dyn BookingStore,
    equipment_id: Uuid,
    range: &DateRange,
) -> Result<Vec<BookingConflict>, AppError> {
    let until = range.end_exclusive();
    let (reservations, overrides) = tokio::try_join!(
        store.find_reservations_overlapping(equipment_id, range.from, until),
        store.find_availability_overrides(equipment_id, range.from, until),
    )?;

    // Re-filter locally so the half-open rule holds whatever the store returns
    let mut conflicts: Vec<BookingConflict> = reservations
        .iter()
        .filter(|r| r.is_blocking() && range.overlaps(r.start_date, r.end_date))
        .map(|r| {
            BookingConflict::new(
                ConflictType::Overlap,
                format!(
                    "Already booked from {} to {}",
                    format_storage_date(r.start_date),
                    format_storage_date(r.end_date)
                ),
            )
        })
        .collect();

    conflicts.extend(
        overrides
            .iter()
            .filter(|o| !o.is_available && range.contains_night(o.date))
            .map(|o| {
                BookingConflict::new(
                    ConflictType::Unavailable,
                    format!("Not available on {}", format_storage_date(o.date)),
                )
            }),
    );

    Ok(conflicts)
}

/// Identifier of one issued availability check
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Latest availability state seen by one client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AvailabilityState {
    Idle,
    Checking {
        request_id: RequestId,
    },
    Ready {
        request_id: RequestId,
        conflicts: Vec<BookingConflict>,
    },
    TimedOut {
        request_id: RequestId,
    },
}

/// Applies only the newest availability check.
///
/// Every check gets a generation number from [`AvailabilityMonitor::begin`];
/// [`AvailabilityMonitor::commit`] drops outcomes whose generation has been
/// superseded. In-flight queries are not cancelled, their results are ignored.
pub struct AvailabilityMonitor {
    latest: AtomicU64,
    state: watch::Sender<AvailabilityState>,
}

impl AvailabilityMonitor {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AvailabilityState::Idle);
        Self {
            latest: AtomicU64::new(0),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AvailabilityState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> AvailabilityState {
        self.state.borrow().clone()
    }

    /// Whether no newer check has begun since `request_id`
    pub fn is_latest(&self, request_id: RequestId) -> bool {
        self.latest.load(Ordering::SeqCst) == request_id.0
    }

    /// Issue a new generation and mark the state as checking.
    pub fn begin(&self) -> RequestId {
        let mut issued = 0;
        // Issue under the channel lock so begin/commit are serialized
        self.state.send_modify(|state| {
            issued = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            *state = AvailabilityState::Checking {
                request_id: RequestId(issued),
            };
        });
        RequestId(issued)
    }

    /// Publish `outcome` if `request_id` is still the latest generation.
    ///
    /// Returns the published state, or `None` when the outcome was stale.
    pub fn commit(&self, request_id: RequestId, outcome: ConflictCheck) -> Option<AvailabilityState> {
        let mut published = None;
        self.state.send_if_modified(|state| {
            if !self.is_latest(request_id) {
                return false;
            }
            let next = match outcome {
                ConflictCheck::Checked(conflicts) => AvailabilityState::Ready {
                    request_id,
                    conflicts,
                },
                ConflictCheck::TimedOut => AvailabilityState::TimedOut { request_id },
            };
            *state = next.clone();
            published = Some(next);
            true
        });

        if published.is_none() {
            debug!("Discarding stale availability result {}", request_id.0);
        }
        published
    }

    /// Begin, check and commit in one call.
    pub async fn run(
        &self,
        store: &dyn BookingStore,
        equipment_id: Uuid,
        range: &DateRange,
        timeout: Duration,
    ) -> (RequestId, Option<AvailabilityState>) {
        let request_id = self.begin();
        let outcome = check_booking_conflicts(store, equipment_id, range, timeout).await;
        (request_id, self.commit(request_id, outcome))
    }
}

impl Default for AvailabilityMonitor {
    fn default() -> Self {
        Self::new()
    }
}
