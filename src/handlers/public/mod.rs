pub mod auth;
pub mod kingdoms;
pub mod root;
