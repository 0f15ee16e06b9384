//! Trip services, the trip manager that coordinates them, and path helpers.

pub mod services;
pub mod trip_manager;
pub mod utils;

pub use trip_manager::{TripManager, TripSession, TripSummary};
