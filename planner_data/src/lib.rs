//! Data layer for the study planner
//!
//! This module contains the data access layer for accounts and study plans,
//! including database entities, repositories, and data-specific errors.

pub mod entities;
pub mod repositories;
pub mod error;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

pub use entities::*;
pub use repositories::*;
pub use error::*;
