//! Infrastructure adapters and runtime bootstrap.

pub mod error;
pub mod geocoding;
pub mod http;
pub mod session;
pub mod telemetry;
pub mod token;
pub mod uploads;
