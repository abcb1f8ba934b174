//! # Surcharge Core
//!
//! The domain layer of the surcharge calculation service.
//! This crate contains the business rules and the cache-aside percentage
//! lookup, expressed only against the ports it defines.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
