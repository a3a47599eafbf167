// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export database components

pub mod favorite_repository;
pub mod place_repository;
pub mod profile_repository;
pub mod review_repository;
pub mod trip_repository;

pub use favorite_repository::*;
pub use place_repository::*;
pub use profile_repository::*;
pub use review_repository::*;
pub use trip_repository::*;
