pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::BookingError;
pub use router::{booking_routes, BookingState};
pub use services::booking::BookingEngine;
