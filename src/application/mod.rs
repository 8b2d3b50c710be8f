//! Application services layer.

pub mod auth;
pub mod debounce;
pub mod filter_options;
pub mod moderation;
pub mod murals;
pub mod pagination;
pub mod repos;
pub mod submission;
