// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod cache;
pub mod favorite_service;
pub mod gemini_client;
pub mod place_service;
pub mod planner_service;
pub mod review_service;
pub mod trip_service;

pub use cache::*;
pub use favorite_service::*;
pub use gemini_client::*;
pub use place_service::*;
pub use planner_service::*;
pub use review_service::*;
pub use trip_service::*;
