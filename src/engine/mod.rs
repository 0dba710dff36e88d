//! Engine modules: the pure numeric core.
//!
//! The engine layer sits between raw measurements (what the host reports)
//! and presentation (what the resolver returns). It has no I/O.

pub mod normalize;
