pub mod cafe;
pub mod cafe_table;
pub mod menu_set;
pub mod order_set;
pub mod reservation;
pub mod table_assignment;

pub use cafe_table::TableKind;
pub use reservation::ReservationStatus;
