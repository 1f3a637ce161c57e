//! # Capsim Core
//!
//! The mechanics engine for capsim, an agent-based simulator of rod-shaped
//! bacteria modeled as capsules (a segment swept by a sphere).
//!
//! This crate contains:
//! - Capsule geometry and the broad/narrow collision tests
//! - The bacterium agent (internal spring, logistic growth, division)
//! - A uniform neighbor grid rebuilt every tick
//! - The quasi-static relaxation mover
//! - Chemical fields, species behaviors and contact rules
//! - Metrics, structured logging, lineage tracking and run history
//!
//! ## Architecture
//!
//! - **One concrete agent type**: species differ by a closed set of
//!   [`behavior::Behavior`] strategies, not by subtypes
//! - **Phase functions**: the ticker calls the free functions in [`systems`]
//!   in a fixed order every tick
//! - **Parallel force accumulation**: each agent sums the forces it receives
//!   from its neighbors with Rayon; no shared accumulator is written
//! - **Deterministic**: all randomness flows from seeded `ChaCha8Rng` streams
//!
//! ## Example
//!
//! ```
//! use capsim_core::bacterium::{Bacterium, BacteriumParams};
//! use capsim_data::{BacteriumId, Lineage, SpeciesId};
//! use glam::DVec3;
//!
//! let mut cell = Bacterium::new(
//!     Lineage::founder(BacteriumId(1)),
//!     SpeciesId(0),
//!     DVec3::new(1.0, 1.0, 0.5),
//!     DVec3::new(4.0, 1.0, 0.5),
//!     BacteriumParams {
//!         radius: 0.5,
//!         l_max: 8.0,
//!         asymmetry: 1.0,
//!         k_growth: 0.5,
//!         division_threshold: 7.0,
//!     },
//! );
//! cell.grow(0.05);
//! assert!(cell.length > 3.0);
//! ```

/// The capsule bacterium agent
pub mod bacterium;
/// Species behaviors and contact rules
pub mod behavior;
/// Configuration management for simulation parameters
pub mod config;
/// Simulation box and the fields inside it
pub mod environment;
/// Setup and runtime error types
pub mod error;
/// Chemical fields (uniform and box-bucketed)
pub mod field;
/// Segment distance and oriented rectangle overlap
pub mod geometry;
/// Event and population frame logging
pub mod history;
/// Lineage tracking for every bacterium that ever lived
pub mod lineage_registry;
/// Division tree construction and DOT export
pub mod lineage_tree;
/// Performance metrics collection and logging
pub mod metrics;
/// Quasi-static relaxation of capsule positions
pub mod mover;
/// Random streams and parameter sampling
pub mod rng;
/// Spatial hashing for neighbor queries
pub mod spatial_hash;
/// Per-tick phases (action, contact, growth, removal, stats)
pub mod systems;

pub use metrics::{init_logging, Metrics};
