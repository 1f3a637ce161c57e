//! Per-tick phases of the population ticker.
//!
//! Each phase is a free function over the population slice plus a context
//! struct with what it reads. Phases that change the population size collect
//! first and apply after the pass.

pub mod action;
pub mod contact;
pub mod growth;
pub mod removal;
pub mod stats;
