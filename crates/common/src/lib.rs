//! Common types, protocol definitions, and errors shared across `cipher-svc` crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
