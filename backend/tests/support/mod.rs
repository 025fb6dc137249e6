//! Shared helpers for backend integration tests.
//!
//! Integration tests compile as separate crates, so doubles used by more
//! than one suite live here and each suite pulls them in with `mod support;`.

pub mod fake_stripe;
pub mod in_memory;
