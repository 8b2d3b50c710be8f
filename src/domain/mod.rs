//! Domain layer types and invariants.

pub mod filters;
pub mod geocode;
pub mod images;
pub mod moderation;
pub mod region;
pub mod submission;
