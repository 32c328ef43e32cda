//! dreampost domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `usecases`: Synthesis and publish pipelines
//! - `policy`: Caption and hashtag constraints
//! - `scratch`: Scoped local image files

pub mod model;
pub mod policy;
pub mod ports;
pub mod scratch;
pub mod usecases;

pub use model::*;
pub use ports::*;
