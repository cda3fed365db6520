use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::models::selection::SelectionSession;
use crate::domain::ports::{CheckoutGateway, SeatMapRepository, SelectionRepository};
use crate::domain::services::reservation::ReservationEngine;
use crate::error::AppError;

#[derive(Debug, Serialize, Clone)]
pub struct HeldSeatInfo {
    pub seat_id: String,
    pub label: String,
    pub category_id: String,
    pub category_name: String,
    pub unit_price_cents: i64,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Clone)]
pub struct SelectionSummary {
    pub session_id: String,
    pub seat_map_id: String,
    pub max_seats: i32,
    pub seats: Vec<HeldSeatInfo>,
    pub total_price_cents: i64,
}

#[derive(Debug, Serialize, Clone)]
pub struct CommittedSeat {
    pub seat_id: String,
    pub label: String,
    pub unit_price_cents: i64,
}

#[derive(Debug, Serialize, Clone)]
pub struct FailedSeat {
    pub seat_id: String,
    pub code: String,
    pub error: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct CheckoutOutcome {
    pub session_id: String,
    pub committed: Vec<CommittedSeat>,
    pub failed: Vec<FailedSeat>,
    pub total_price_cents: i64,
    /// Whether the committed seats were handed to the downstream checkout
    /// collaborator. Sold seats stay sold even when forwarding fails.
    pub forwarded: bool,
}

/// One buyer's interaction with the reservation engine. The session never
/// touches the seat map store directly; its only mutation surface is the
/// hold protocol.
pub struct SelectionService {
    selection_repo: Arc<dyn SelectionRepository>,
    seat_map_repo: Arc<dyn SeatMapRepository>,
    checkout_gateway: Arc<dyn CheckoutGateway>,
    engine: Arc<ReservationEngine>,
    hold_ttl: Duration,
    default_max_seats: i32,
}

impl SelectionService {
    pub fn new(
        selection_repo: Arc<dyn SelectionRepository>,
        seat_map_repo: Arc<dyn SeatMapRepository>,
        checkout_gateway: Arc<dyn CheckoutGateway>,
        engine: Arc<ReservationEngine>,
        hold_ttl: Duration,
        default_max_seats: i32,
    ) -> Self {
        Self {
            selection_repo,
            seat_map_repo,
            checkout_gateway,
            engine,
            hold_ttl,
            default_max_seats,
        }
    }

    /// `max_seats` comes from the event records collaborator; absent that,
    /// the configured default applies.
    pub async fn create_session(
        &self,
        seat_map_id: &str,
        max_seats: Option<i32>,
    ) -> Result<SelectionSession, AppError> {
        self.seat_map_repo
            .find_by_id(seat_map_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Seat map {} not found", seat_map_id)))?;

        let max_seats = max_seats.unwrap_or(self.default_max_seats);
        if max_seats <= 0 {
            return Err(AppError::Validation("max_seats must be positive".into()));
        }

        let session = SelectionSession::new(seat_map_id.to_string(), max_seats);
        self.selection_repo.create(&session).await
    }

    /// The seats-per-checkout cap is enforced before any hold is requested.
    pub async fn select_seat(&self, session_id: &str, seat_id: &str) -> Result<SelectionSummary, AppError> {
        let session = self.require_session(session_id).await?;

        let held = self
            .engine
            .held_by(&session.seat_map_id, &session.holder_token)
            .await?;
        if held.len() as i32 >= session.max_seats {
            return Err(AppError::SelectionLimit(session.max_seats));
        }

        self.engine
            .request_hold(&session.seat_map_id, seat_id, &session.holder_token, self.hold_ttl)
            .await?;

        self.summarize(&session).await
    }

    pub async fn deselect_seat(&self, session_id: &str, seat_id: &str) -> Result<SelectionSummary, AppError> {
        let session = self.require_session(session_id).await?;
        self.engine
            .release_hold(&session.seat_map_id, seat_id, &session.holder_token)
            .await?;
        self.summarize(&session).await
    }

    pub async fn summary(&self, session_id: &str) -> Result<SelectionSummary, AppError> {
        let session = self.require_session(session_id).await?;
        self.summarize(&session).await
    }

    /// Commits every held seat in ascending seat-id order. Commits are
    /// individually terminal: a failure mid-way leaves earlier successes
    /// sold and is reported per seat so the caller can re-offer the rest.
    ///
    /// Expiry is re-validated by the commit itself, so a hold that lapsed
    /// since selection shows up as a per-seat `hold_expired` failure rather
    /// than silently vanishing from the order.
    pub async fn checkout(&self, session_id: &str) -> Result<CheckoutOutcome, AppError> {
        let session = self.require_session(session_id).await?;

        let held = self
            .engine
            .holds_of(&session.seat_map_id, &session.holder_token)
            .await?;
        if held.is_empty() {
            return Err(AppError::Validation("No seats held by this session".into()));
        }

        let info = self.seat_info(&session.seat_map_id).await?;

        let mut committed = Vec::new();
        let mut failed = Vec::new();
        let mut total_price_cents = 0;

        for state in &held {
            match self
                .engine
                .commit(&session.seat_map_id, &state.seat_id, &session.holder_token)
                .await
            {
                Ok(()) => {
                    let (label, price) = info
                        .get(state.seat_id.as_str())
                        .map(|(l, p)| (l.clone(), *p))
                        .unwrap_or_default();
                    total_price_cents += price;
                    committed.push(CommittedSeat {
                        seat_id: state.seat_id.clone(),
                        label,
                        unit_price_cents: price,
                    });
                }
                Err(e @ (AppError::Database(_) | AppError::Internal | AppError::InternalWithMsg(_))) => {
                    // Storage faults are fatal, not a per-seat outcome.
                    return Err(e);
                }
                Err(e) => {
                    failed.push(FailedSeat {
                        seat_id: state.seat_id.clone(),
                        code: e.code().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let forwarded = if committed.is_empty() {
            false
        } else {
            let seat_ids: Vec<String> = committed.iter().map(|c| c.seat_id.clone()).collect();
            match self
                .checkout_gateway
                .checkout_completed(&session.id, &session.seat_map_id, &seat_ids, total_price_cents)
                .await
            {
                Ok(()) => true,
                Err(e) => {
                    warn!("Checkout forwarding failed for session {}: {}", session.id, e);
                    false
                }
            }
        };

        if failed.is_empty() {
            self.selection_repo.delete(&session.id).await?;
            info!(
                "Session {} checked out: {} seats, {} cents",
                session.id,
                committed.len(),
                total_price_cents
            );
        } else {
            warn!(
                "Session {} checkout partially failed: {} committed, {} failed",
                session.id,
                committed.len(),
                failed.len()
            );
        }

        Ok(CheckoutOutcome {
            session_id: session.id,
            committed,
            failed,
            total_price_cents,
            forwarded,
        })
    }

    /// Releases every live hold and destroys the session.
    pub async fn cancel_session(&self, session_id: &str) -> Result<(), AppError> {
        let session = self.require_session(session_id).await?;

        let held = self
            .engine
            .held_by(&session.seat_map_id, &session.holder_token)
            .await?;
        for state in held {
            self.engine
                .release_hold(&session.seat_map_id, &state.seat_id, &session.holder_token)
                .await?;
        }

        self.selection_repo.delete(&session.id).await?;
        info!("Session {} cancelled", session_id);
        Ok(())
    }

    async fn require_session(&self, session_id: &str) -> Result<SelectionSession, AppError> {
        self.selection_repo
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", session_id)))
    }

    async fn summarize(&self, session: &SelectionSession) -> Result<SelectionSummary, AppError> {
        let held = self
            .engine
            .held_by(&session.seat_map_id, &session.holder_token)
            .await?;

        let seats = self.seat_map_repo.list_seats(&session.seat_map_id).await?;
        let categories = self.seat_map_repo.list_categories(&session.seat_map_id).await?;
        let category_info: HashMap<&str, (&str, i64)> = categories
            .iter()
            .map(|c| (c.id.as_str(), (c.name.as_str(), c.unit_price_cents)))
            .collect();
        let seat_by_id: HashMap<&str, &crate::domain::models::seat::Seat> =
            seats.iter().map(|s| (s.id.as_str(), s)).collect();

        let mut infos = Vec::new();
        let mut total_price_cents = 0;
        for state in &held {
            let Some(seat) = seat_by_id.get(state.seat_id.as_str()) else {
                continue;
            };
            let (category_name, unit_price_cents) = category_info
                .get(seat.category_id.as_str())
                .map(|(n, p)| (n.to_string(), *p))
                .unwrap_or_default();
            total_price_cents += unit_price_cents;
            infos.push(HeldSeatInfo {
                seat_id: seat.id.clone(),
                label: seat.label.clone(),
                category_id: seat.category_id.clone(),
                category_name,
                unit_price_cents,
                expires_at: state.expires_at,
            });
        }

        Ok(SelectionSummary {
            session_id: session.id.clone(),
            seat_map_id: session.seat_map_id.clone(),
            max_seats: session.max_seats,
            seats: infos,
            total_price_cents,
        })
    }

    /// seat id -> (label, unit price) for the map.
    async fn seat_info(&self, map_id: &str) -> Result<HashMap<String, (String, i64)>, AppError> {
        let seats = self.seat_map_repo.list_seats(map_id).await?;
        let categories = self.seat_map_repo.list_categories(map_id).await?;
        let prices: HashMap<&str, i64> = categories
            .iter()
            .map(|c| (c.id.as_str(), c.unit_price_cents))
            .collect();
        Ok(seats
            .into_iter()
            .map(|s| {
                let price = prices.get(s.category_id.as_str()).copied().unwrap_or(0);
                (s.id, (s.label, price))
            })
            .collect())
    }
}
