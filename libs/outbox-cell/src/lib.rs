pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::OutboxError;
pub use router::{event_routes, EventsState};
pub use services::publisher::{EventSink, HttpEventSink, OutboxPublisher};
