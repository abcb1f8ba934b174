//! # Surcharge Shared
//!
//! Wire types shared by the API server and its clients.

pub mod dto;
pub mod response;

pub use dto::{CalculationQuery, CallLogPageQuery, CallLogResponse, HealthResponse};
pub use response::ErrorResponse;
