#![deny(clippy::all, clippy::pedantic)]

pub mod admin;
pub mod filters;
pub mod geocode;
pub mod murals;
pub mod submit;
