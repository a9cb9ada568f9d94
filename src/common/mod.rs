pub mod error;
pub mod platform;
pub mod utils;
