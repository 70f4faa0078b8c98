pub mod fill;
pub mod migrate;
pub mod token;
pub mod user;
