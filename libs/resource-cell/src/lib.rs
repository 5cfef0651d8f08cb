pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::RegistryError;
pub use router::{resource_routes, ResourceState};
pub use services::registry::{windows_in_range, RegistryService};
