pub mod postgres_reservation_store;
pub mod postgres_seat_map_repo;
pub mod postgres_selection_repo;
pub mod sqlite_reservation_store;
pub mod sqlite_seat_map_repo;
pub mod sqlite_selection_repo;
