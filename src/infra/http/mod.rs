//! REST client for the gallery backend.

mod client;
mod repos;

pub use client::{ApiClient, ApiError, LogRedirect, LoginRedirect};
