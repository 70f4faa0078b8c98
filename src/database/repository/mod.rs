pub mod application;
pub mod kingdom;
pub mod user;

pub use application::ApplicationRepository;
pub use kingdom::KingdomRepository;
pub use user::UserRepository;
