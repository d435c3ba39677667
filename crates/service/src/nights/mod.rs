pub mod domain;
pub mod repository;
pub mod service;

pub use domain::{AnalyticsPoint, WeekPolicy};
pub use repository::{NightRepository, SeaOrmNightRepository};
pub use service::NightService;
