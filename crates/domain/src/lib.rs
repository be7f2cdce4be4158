//! feed-doctor domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `scoring`: Rule-based dimension scorers
//! - `content`: Title, description, and keyword rewriting
//! - `rules`: Optimization rule selection
//! - `usecases`: Analysis, bulk processing, and stats

pub mod content;
pub mod model;
pub mod ports;
pub mod rules;
pub mod scoring;
pub mod usecases;

pub use model::*;
pub use ports::*;
