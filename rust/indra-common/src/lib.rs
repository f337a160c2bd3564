//! Core definitions relied upon by all indra-* crates.

pub mod error;
pub mod result;

pub use result::Result;
