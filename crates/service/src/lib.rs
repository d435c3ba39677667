//! Service layer for the sleep tracker.
//! - `nights::repository` abstracts persistence (SeaORM and in-memory).
//! - `nights::service` holds the business rules: normalization, week
//!   windows, analytics range checks.
//! - Errors are classified once here so the HTTP layer only maps them.

pub mod errors;
pub mod nights;
#[cfg(test)]
pub mod test_support;
