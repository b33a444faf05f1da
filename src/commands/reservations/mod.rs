pub mod book_table_command;
pub mod cancel_reservation_command;

pub use book_table_command::{BookTableCommand, BookedReservation, BookingOutcome};
pub use cancel_reservation_command::CancelReservationCommand;
