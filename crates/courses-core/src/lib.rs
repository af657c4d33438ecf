//! # Courses Core
//!
//! Error definitions, the entity identity contract, validation helpers, and
//! tracing setup shared by the student courses data-access crates.

pub mod entity;
pub mod error;
pub mod result;
pub mod telemetry;
pub mod validation;

pub use entity::*;
pub use error::*;
pub use result::*;
pub use telemetry::*;
pub use validation::*;

// Re-export shaku for dependency injection
pub use shaku::Interface;
