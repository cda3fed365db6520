use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use crate::domain::models::reservation::{Hold, SeatState, SeatStatus};
use crate::domain::ports::ReservationStore;
use crate::error::AppError;

/// Per-seat sale state machine:
///
/// ```text
/// available --request_hold--> held      (expires after the hold TTL)
/// available --reserve-------> reserved  (organizer hold, never expires)
/// held      --release-------> available
/// held      --expire--------> available (sweeper, or lazily on any read)
/// held      --commit--------> sold      (terminal)
/// available --block---------> blocked   (terminal until unblocked)
/// ```
///
/// The engine never reads state to decide a transition; it issues the
/// conditional write first and only reads afterwards to classify a failure.
/// The classifying read can itself race with other callers, but it only
/// affects which error is reported, never who owns the seat.
pub struct ReservationEngine {
    store: Arc<dyn ReservationStore>,
}

impl ReservationEngine {
    pub fn new(store: Arc<dyn ReservationStore>) -> Self {
        Self { store }
    }

    /// Grants a time-bounded hold. Among concurrent requests for the same
    /// seat exactly one succeeds; losers get `SeatUnavailable` immediately,
    /// there is no queueing.
    pub async fn request_hold(
        &self,
        map_id: &str,
        seat_id: &str,
        holder_token: &str,
        ttl: Duration,
    ) -> Result<Hold, AppError> {
        let now = Utc::now();
        let expires_at = now + ttl;

        if self
            .store
            .try_claim(map_id, seat_id, holder_token, Some(expires_at), now)
            .await?
        {
            debug!("Hold granted on seat {} until {}", seat_id, expires_at);
            return Ok(Hold {
                seat_map_id: map_id.to_string(),
                seat_id: seat_id.to_string(),
                holder_token: holder_token.to_string(),
                expires_at: Some(expires_at),
            });
        }

        Err(self.classify_claim_failure(map_id, seat_id).await?)
    }

    /// Organizer hold outside the buyer flow (comp tickets). Behaves like a
    /// hold but carries no expiry.
    pub async fn reserve(
        &self,
        map_id: &str,
        seat_id: &str,
        holder_token: &str,
    ) -> Result<Hold, AppError> {
        let now = Utc::now();

        if self.store.try_claim(map_id, seat_id, holder_token, None, now).await? {
            info!("Seat {} reserved by organizer", seat_id);
            return Ok(Hold {
                seat_map_id: map_id.to_string(),
                seat_id: seat_id.to_string(),
                holder_token: holder_token.to_string(),
                expires_at: None,
            });
        }

        Err(self.classify_claim_failure(map_id, seat_id).await?)
    }

    /// Releasing an already-expired or already-released hold is a no-op.
    /// Only a live hold owned by a different token is an error.
    pub async fn release_hold(
        &self,
        map_id: &str,
        seat_id: &str,
        holder_token: &str,
    ) -> Result<(), AppError> {
        let now = Utc::now();

        if self.store.release(map_id, seat_id, holder_token, now).await? {
            debug!("Hold released on seat {}", seat_id);
            return Ok(());
        }

        match self.store.find_state(map_id, seat_id).await? {
            None => Err(AppError::SeatNotFound(seat_id.to_string())),
            Some(state) => match state.effective_status(now) {
                SeatStatus::Held | SeatStatus::Reserved
                    if state.holder_token.as_deref() != Some(holder_token) =>
                {
                    Err(AppError::NotHolder)
                }
                _ => Ok(()),
            },
        }
    }

    /// Promotes a hold to a sale. The hold must still be owned by the
    /// caller and unexpired at the instant of commit; a commit racing an
    /// expiry resolves deterministically against the stored expiry.
    pub async fn commit(
        &self,
        map_id: &str,
        seat_id: &str,
        holder_token: &str,
    ) -> Result<(), AppError> {
        let now = Utc::now();

        if self.store.commit_sale(map_id, seat_id, holder_token, now).await? {
            info!("Seat {} sold", seat_id);
            return Ok(());
        }

        match self.store.find_state(map_id, seat_id).await? {
            None => Err(AppError::SeatNotFound(seat_id.to_string())),
            Some(state) => match state.parsed_status() {
                SeatStatus::Blocked => Err(AppError::SeatBlocked(seat_id.to_string())),
                SeatStatus::Sold => Err(AppError::SeatUnavailable("seat already sold".into())),
                SeatStatus::Reserved if state.holder_token.as_deref() != Some(holder_token) => {
                    Err(AppError::NotHolder)
                }
                // AVAILABLE, or HELD by whoever claimed the seat after the
                // caller's hold lapsed: either way the caller's hold is gone.
                _ => Err(AppError::HoldExpired),
            },
        }
    }

    /// Organizer escape hatch for permanently unsellable seats. Only an
    /// available seat (or one with a lapsed hold) can be blocked.
    pub async fn block_seat(&self, map_id: &str, seat_id: &str) -> Result<(), AppError> {
        let now = Utc::now();

        if self.store.set_blocked(map_id, seat_id, now).await? {
            info!("Seat {} blocked", seat_id);
            return Ok(());
        }

        match self.store.find_state(map_id, seat_id).await? {
            None => Err(AppError::SeatNotFound(seat_id.to_string())),
            Some(state) => match state.parsed_status() {
                SeatStatus::Blocked => Ok(()),
                _ => Err(AppError::SeatUnavailable(
                    "cannot block a seat that is held, reserved or sold".into(),
                )),
            },
        }
    }

    pub async fn unblock_seat(&self, map_id: &str, seat_id: &str) -> Result<(), AppError> {
        let now = Utc::now();

        if self.store.set_unblocked(map_id, seat_id, now).await? {
            info!("Seat {} unblocked", seat_id);
            return Ok(());
        }

        match self.store.find_state(map_id, seat_id).await? {
            None => Err(AppError::SeatNotFound(seat_id.to_string())),
            // Not blocked in the first place.
            Some(_) => Ok(()),
        }
    }

    /// Resolves expired holds before reporting, whether or not the sweeper
    /// has caught up.
    pub async fn status_of(&self, map_id: &str, seat_id: &str) -> Result<SeatStatus, AppError> {
        let now = Utc::now();
        let state = self
            .store
            .find_state(map_id, seat_id)
            .await?
            .ok_or_else(|| AppError::SeatNotFound(seat_id.to_string()))?;
        Ok(state.effective_status(now))
    }

    /// Full-chart status for rendering, seat id to status.
    pub async fn bulk_status(&self, map_id: &str) -> Result<HashMap<String, SeatStatus>, AppError> {
        let now = Utc::now();
        let states = self.store.list_states(map_id).await?;
        Ok(states
            .into_iter()
            .map(|s| {
                let status = s.effective_status(now);
                (s.seat_id, status)
            })
            .collect())
    }

    /// Unexpired holds owned by the token; what a session currently has.
    pub async fn held_by(
        &self,
        map_id: &str,
        holder_token: &str,
    ) -> Result<Vec<SeatState>, AppError> {
        self.store.list_held_by(map_id, holder_token, Utc::now()).await
    }

    /// Every hold still carrying the token, expired or not, in seat-id
    /// order. Checkout commits from this list so lapsed holds fail loudly
    /// through commit's own revalidation instead of being skipped.
    pub async fn holds_of(
        &self,
        map_id: &str,
        holder_token: &str,
    ) -> Result<Vec<SeatState>, AppError> {
        let mut states: Vec<SeatState> = self
            .store
            .list_states(map_id)
            .await?
            .into_iter()
            .filter(|s| {
                s.parsed_status() == SeatStatus::Held
                    && s.holder_token.as_deref() == Some(holder_token)
            })
            .collect();
        states.sort_by(|a, b| a.seat_id.cmp(&b.seat_id));
        Ok(states)
    }

    async fn classify_claim_failure(&self, map_id: &str, seat_id: &str) -> Result<AppError, AppError> {
        let now = Utc::now();
        Ok(match self.store.find_state(map_id, seat_id).await? {
            None => AppError::SeatNotFound(seat_id.to_string()),
            Some(state) => match state.effective_status(now) {
                SeatStatus::Blocked => AppError::SeatBlocked(seat_id.to_string()),
                SeatStatus::Sold => AppError::SeatUnavailable("seat already sold".into()),
                SeatStatus::Held | SeatStatus::Reserved => {
                    AppError::SeatUnavailable("seat is held by another session".into())
                }
                // Freed between our failed claim and this read; the caller
                // lost the race but may simply retry.
                SeatStatus::Available => AppError::SeatUnavailable("seat is contended, retry".into()),
            },
        })
    }
}
