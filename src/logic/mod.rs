//! Logic modules that turn raw host sources into capability answers.
//!
//! # Modules
//!
//! - `chain`: Ordered, named source attempts where the first hit wins
//! - `resolver`: The per-capability query surface

pub mod chain;
pub mod resolver;
