pub mod cafes;
pub mod health;
pub mod reservations;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;
