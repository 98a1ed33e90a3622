//! Core domain types and logic.

pub mod observation;
pub mod series;
pub mod position;
pub mod engine;
pub mod align;
pub mod error;
