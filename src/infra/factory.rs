use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use chrono::Duration as ChronoDuration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::ports::{CheckoutGateway, ImageStore, ReservationStore, SeatMapRepository, SelectionRepository};
use crate::domain::services::authoring::AuthoringService;
use crate::domain::services::reservation::ReservationEngine;
use crate::domain::services::selection::SelectionService;
use crate::infra::payment::http_checkout_gateway::HttpCheckoutGateway;
use crate::infra::storage::http_image_store::HttpImageStore;
use crate::infra::repositories::{
    postgres_reservation_store::PostgresReservationStore,
    postgres_seat_map_repo::PostgresSeatMapRepo,
    postgres_selection_repo::PostgresSelectionRepo,
    sqlite_reservation_store::SqliteReservationStore,
    sqlite_seat_map_repo::SqliteSeatMapRepo,
    sqlite_selection_repo::SqliteSelectionRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let image_store: Arc<dyn ImageStore> = Arc::new(HttpImageStore::new(
        config.image_service_url.clone(),
        config.image_service_token.clone(),
    ));
    let checkout_gateway: Arc<dyn CheckoutGateway> = Arc::new(HttpCheckoutGateway::new(
        config.checkout_service_url.clone(),
        config.checkout_service_token.clone(),
    ));

    let (seat_map_repo, reservation_store, selection_repo): (
        Arc<dyn SeatMapRepository>,
        Arc<dyn ReservationStore>,
        Arc<dyn SelectionRepository>,
    ) = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        (
            Arc::new(PostgresSeatMapRepo::new(pool.clone())),
            Arc::new(PostgresReservationStore::new(pool.clone())),
            Arc::new(PostgresSelectionRepo::new(pool)),
        )
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        (
            Arc::new(SqliteSeatMapRepo::new(pool.clone())),
            Arc::new(SqliteReservationStore::new(pool.clone())),
            Arc::new(SqliteSelectionRepo::new(pool)),
        )
    };

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

    AppState {
        config: config.clone(),
        seat_map_repo,
        reservation_store,
        selection_repo,
        image_store,
        checkout_gateway,
        reservation,
        authoring,
        selection,
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
