//! Application layer: services and use cases
//!
//! This layer turns settings into domain operations and reports.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
