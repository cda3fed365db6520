pub mod category;
pub mod reservation;
pub mod seat;
pub mod seat_map;
pub mod selection;
