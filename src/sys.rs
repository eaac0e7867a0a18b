//! Interfaces to the world outside the policy core.

pub mod geometry;
pub mod scene;
