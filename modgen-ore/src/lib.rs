//! Odds and ends shared by every `modgen` crate.

pub mod assert;
pub mod env;
pub mod path;
