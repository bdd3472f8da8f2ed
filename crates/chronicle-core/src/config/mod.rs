//! Configuration system for Chronicle

mod loader;
mod types;
pub mod validation;

pub use loader::*;
pub use types::*;
pub use validation::*;
