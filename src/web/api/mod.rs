pub mod analyze;
pub mod error;
