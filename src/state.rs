use std::sync::Arc;
use crate::domain::ports::{
    CheckoutGateway, ImageStore, ReservationStore, SeatMapRepository, SelectionRepository,
};
use crate::domain::services::authoring::AuthoringService;
use crate::domain::services::reservation::ReservationEngine;
use crate::domain::services::selection::SelectionService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub seat_map_repo: Arc<dyn SeatMapRepository>,
    pub reservation_store: Arc<dyn ReservationStore>,
    pub selection_repo: Arc<dyn SelectionRepository>,
    pub image_store: Arc<dyn ImageStore>,
    pub checkout_gateway: Arc<dyn CheckoutGateway>,
    pub reservation: Arc<ReservationEngine>,
    pub authoring: Arc<AuthoringService>,
    pub selection: Arc<SelectionService>,
}
