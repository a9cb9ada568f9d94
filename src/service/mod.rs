#[cfg(feature = "desktop")]
pub mod commands;
pub mod dispatch;
pub mod executor;
pub mod materializer;
pub mod paths;

pub use dispatch::{ServiceController, ServiceOperation};
pub use executor::{CommandSpec, Elevation, ExecutionResult};
