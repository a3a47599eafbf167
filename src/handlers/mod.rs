// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components

pub mod health;
pub mod places;
pub mod planner;
pub mod reviews;
pub mod trips;

pub use health::config as health_config;
pub use places::config as places_config;
pub use planner::config as planner_config;
pub use reviews::config as reviews_config;
pub use trips::config as trips_config;
