// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod place;
pub mod planner;
pub mod profile;
pub mod review;
pub mod trip;

pub use place::*;
pub use planner::*;
pub use profile::*;
pub use review::*;
pub use trip::*;
