//! Small shared helpers used across the manifold crates.

pub mod case;
pub mod hash;
