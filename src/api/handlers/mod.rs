pub mod health;
pub mod reservation;
pub mod seat_map;
pub mod selection;
