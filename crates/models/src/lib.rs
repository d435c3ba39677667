//! Persistence models for the sleep tracker.
//!
//! - `record`: canonical `NightRecord` shape and input normalization
//! - `night`, `prior_substance`: SeaORM entities and their queries
//! - `db`: connection bootstrap

pub mod errors;
pub mod db;
pub mod record;
pub mod night;
pub mod prior_substance;

pub use record::{Interruption, NightProperty, NightRecord, SubstanceDose};

#[cfg(test)]
mod tests;
