//! Infrastructure: HTTP transport behind the `ApiTransport` seam, plus
//! telemetry installation.

pub mod api;
pub mod error;
pub mod telemetry;

pub use api::{ApiTransport, HttpTransport};
pub use error::{ApiError, InfraError};
