pub mod applications;
pub mod kingdoms;
