use crate::domain::models::{
    category::PriceCategory, reservation::SeatState, seat::Seat, seat_map::SeatMap,
    selection::SelectionSession,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait SeatMapRepository: Send + Sync {
    async fn create(&self, map: &SeatMap) -> Result<SeatMap, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<SeatMap>, AppError>;
    async fn freeze(&self, id: &str) -> Result<(), AppError>;

    async fn add_category(&self, category: &PriceCategory) -> Result<PriceCategory, AppError>;
    async fn find_category(&self, map_id: &str, category_id: &str) -> Result<Option<PriceCategory>, AppError>;
    async fn list_categories(&self, map_id: &str) -> Result<Vec<PriceCategory>, AppError>;

    /// Inserts the seat together with its initial reservation state row in
    /// one transaction; a validation failure leaves no partial write.
    async fn add_seat(&self, seat: &Seat) -> Result<Seat, AppError>;
    async fn find_seat(&self, map_id: &str, seat_id: &str) -> Result<Option<Seat>, AppError>;
    async fn list_seats(&self, map_id: &str) -> Result<Vec<Seat>, AppError>;
    async fn update_seat(&self, seat: &Seat) -> Result<Seat, AppError>;
    /// Removes the seat and its state row. Fails with `SeatUnavailable` if
    /// the seat is currently held, reserved or sold.
    async fn remove_seat(&self, map_id: &str, seat_id: &str) -> Result<(), AppError>;
}

/// Atomic keyed store for per-seat sale state. Implementations must make
/// every mutating operation a single check-and-set: the legal source states
/// are encoded in the write itself and the store only reports whether a row
/// changed. Interpreting a failed write is the reservation engine's job.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Claim the seat for `holder_token`. Succeeds from AVAILABLE or from a
    /// HELD row whose expiry has elapsed (the stale hold is overwritten in
    /// the same statement). `expires_at = None` claims an organizer
    /// RESERVED state, exempt from expiry.
    async fn try_claim(
        &self,
        map_id: &str,
        seat_id: &str,
        holder_token: &str,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// HELD or RESERVED with matching token back to AVAILABLE.
    async fn release(
        &self,
        map_id: &str,
        seat_id: &str,
        holder_token: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// Unexpired HELD or RESERVED with matching token to SOLD (terminal).
    async fn commit_sale(
        &self,
        map_id: &str,
        seat_id: &str,
        holder_token: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// AVAILABLE (or expired HELD) to BLOCKED, mirrored onto the seat's
    /// `is_blocked` flag.
    async fn set_blocked(&self, map_id: &str, seat_id: &str, now: DateTime<Utc>) -> Result<bool, AppError>;
    /// BLOCKED back to AVAILABLE.
    async fn set_unblocked(&self, map_id: &str, seat_id: &str, now: DateTime<Utc>) -> Result<bool, AppError>;

    /// Sweep every expired HELD row back to AVAILABLE, returning the count.
    async fn release_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;

    async fn find_state(&self, map_id: &str, seat_id: &str) -> Result<Option<SeatState>, AppError>;
    async fn list_states(&self, map_id: &str) -> Result<Vec<SeatState>, AppError>;

    /// Unexpired HELD rows owned by `holder_token`, ordered by seat id.
    async fn list_held_by(
        &self,
        map_id: &str,
        holder_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<SeatState>, AppError>;
}

#[async_trait]
pub trait SelectionRepository: Send + Sync {
    async fn create(&self, session: &SelectionSession) -> Result<SelectionSession, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<SelectionSession>, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

/// External image storage collaborator. Accepts an uploaded chart image and
/// returns a stable reference; rejects bad uploads with `UploadRejected`.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn store(&self, file_name: &str, content_type: &str, bytes: &[u8]) -> Result<String, AppError>;
}

/// Downstream handoff at checkout completion: the committed seat ids and
/// their total price go to the event/ticket records for payment processing.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn checkout_completed(
        &self,
        session_id: &str,
        seat_map_id: &str,
        seat_ids: &[String],
        total_price_cents: i64,
    ) -> Result<(), AppError>;
}
