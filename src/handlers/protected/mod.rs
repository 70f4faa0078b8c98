pub mod applications;
pub mod session;
