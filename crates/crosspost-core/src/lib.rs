//! # Crosspost Core
//!
//! The domain layer of the Crosspost scheduler.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! the post/publication-log entities, the repository and auth ports, and the
//! publish-sweep engine that transitions due posts to their terminal status.

pub mod domain;
pub mod error;
pub mod ports;
pub mod publish;

pub use error::DomainError;
