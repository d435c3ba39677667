//! Shared building blocks for the sleep tracker crates: logging setup,
//! startup environment checks, the health payload and date handling.

pub mod types;
pub mod utils;
pub mod env;
pub mod time;
