//! SeaORM entities and their conversions to the domain types.

pub mod post;
pub mod publication_log;
pub mod user;
