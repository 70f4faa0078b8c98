pub mod application;
pub mod kingdom;
pub mod user;

pub use application::{
    ApplicationState, ApplicationWithKingdoms, KingdomFromApplication, RulerApplication, TransitionActor,
};
pub use kingdom::{Kingdom, KingdomInput, KINGDOM_STATE_CONQUERED};
pub use user::{Role, User};
