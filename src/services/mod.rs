pub mod application_service;
pub mod async_notifier;

pub use application_service::{ApplicationError, ApplicationService};
pub use async_notifier::AsyncNotifier;
