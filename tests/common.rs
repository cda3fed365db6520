use seatmap_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::ports::{CheckoutGateway, ImageStore},
    domain::services::authoring::AuthoringService,
    domain::services::reservation::ReservationEngine,
    domain::services::selection::SelectionService,
    infra::repositories::{
        sqlite_reservation_store::SqliteReservationStore,
        sqlite_seat_map_repo::SqliteSeatMapRepo,
        sqlite_selection_repo::SqliteSelectionRepo,
    },
    error::{AppError, UploadRejectReason},
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use async_trait::async_trait;
use axum::Router;
use chrono::Duration as ChronoDuration;

pub struct MockImageStore;

#[async_trait]
impl ImageStore for MockImageStore {
    async fn store(&self, file_name: &str, content_type: &str, bytes: &[u8]) -> Result<String, AppError> {
        if !content_type.starts_with("image/") {
            return Err(AppError::UploadRejected(UploadRejectReason::InvalidType));
        }
        if bytes.len() > 5 * 1024 * 1024 {
            return Err(AppError::UploadRejected(UploadRejectReason::TooLarge));
        }
        Ok(format!("mock://images/{}", file_name))
    }
}

#[derive(Debug, Clone)]
pub struct CheckoutRecord {
    pub session_id: String,
    pub seat_ids: Vec<String>,
    pub total_price_cents: i64,
}

pub struct MockCheckoutGateway {
    pub calls: Arc<Mutex<Vec<CheckoutRecord>>>,
}

#[async_trait]
impl CheckoutGateway for MockCheckoutGateway {
    async fn checkout_completed(
        &self,
        session_id: &str,
        _seat_map_id: &str,
        seat_ids: &[String],
        total_price_cents: i64,
    ) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(CheckoutRecord {
            session_id: session_id.to_string(),
            seat_ids: seat_ids.to_vec(),
            total_price_cents,
        });
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub checkout_calls: Arc<Mutex<Vec<CheckoutRecord>>>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::new_with(300, 8).await
    }

    pub async fn new_with(hold_ttl_secs: i64, max_seats_per_selection: i32) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            image_service_url: "http://localhost".to_string(),
            image_service_token: "token".to_string(),
            checkout_service_url: "http://localhost".to_string(),
            checkout_service_token: "token".to_string(),
            hold_ttl_secs,
            max_seats_per_selection,
            sweep_interval_secs: 30,
            seat_overlap_epsilon: 0.5,
        };

        let seat_map_repo = Arc::new(SqliteSeatMapRepo::new(pool.clone()));
        let reservation_store = Arc::new(SqliteReservationStore::new(pool.clone()));
        let selection_repo = Arc::new(SqliteSelectionRepo::new(pool.clone()));
        let image_store = Arc::new(MockImageStore);
        let checkout_calls = Arc::new(Mutex::new(Vec::new()));
        let checkout_gateway = Arc::new(MockCheckoutGateway {
            calls: checkout_calls.clone(),
        });

        let reservation = Arc::new(ReservationEngine::new(reservation_store.clone()));
        let authoring = Arc::new(AuthoringService::new(
            seat_map_repo.clone(),
            image_store.clone(),
            config.seat_overlap_epsilon,
        ));
        let selection = Arc::new(SelectionService::new(
            selection_repo.clone(),
            seat_map_repo.clone(),
            checkout_gateway.clone(),
            reservation.clone(),
            ChronoDuration::seconds(config.hold_ttl_secs),
            config.max_seats_per_selection,
        ));

        let state = Arc::new(AppState {
            config,
            seat_map_repo,
            reservation_store,
            selection_repo,
            image_store,
            checkout_gateway,
            reservation,
            authoring,
            selection,
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            checkout_calls,
        }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
