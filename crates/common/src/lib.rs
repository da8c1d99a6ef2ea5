//! Wire types and errors shared between the envelope service and its callers.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
