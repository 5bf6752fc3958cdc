//! Background processing.

#[cfg(feature = "scheduler")]
pub mod scheduler;
