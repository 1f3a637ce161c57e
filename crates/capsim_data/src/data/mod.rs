//! Core data structures for the capsule simulation.

pub mod boundary;
pub mod event;
pub mod identity;
pub mod snapshot;
