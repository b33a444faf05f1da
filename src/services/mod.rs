// Allocation policy, free of I/O
pub mod allocation;

// Booking lifecycle and read models
pub mod reservations;

// Cafes, tables and menu sets
pub mod inventory;

pub use inventory::InventoryService;
pub use reservations::ReservationService;
