//! Client for the Buenos Aires street-art gallery.
//!
//! `domain` holds the pure rules (filters, address resolution, submission
//! checks), `application` the stateful controllers built on repository
//! traits, and `infra` the HTTP, session, geocoding and upload adapters.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub(crate) mod util;
