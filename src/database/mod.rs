pub mod manager;
pub mod models;
pub mod repository;

pub use manager::{connect_lazy, health_check, run_migrations, DatabaseError};
pub use repository::{ApplicationRepository, KingdomRepository, UserRepository};
