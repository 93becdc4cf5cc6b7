// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error types.
//!
//! Shutdown is not an error (see `station::StationMonitor`, which
//! expresses it as `None`/empty/unplaced return shapes). These types
//! cover what's left: invalid configuration and programmer error.

use thiserror::Error;

/// An invalid `SimConfig`. Returned by `SimConfig::new`; not
/// recoverable by the simulation itself, only by the caller supplying
/// different numbers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("need at least one bike type, got {0}")]
    NoBikeTypes(u8),
    #[error("need at least 2 sites (depot + 1), got {0}")]
    TooFewSites(usize),
    #[error("station capacity {capacity} is smaller than the number of bike types {types}")]
    CapacityBelowTypes { capacity: usize, types: u8 },
    #[error("van capacity must be at least 1, got {0}")]
    ZeroVanCapacity(usize),
    #[error("depot load per cycle must be at least 1, got {0}")]
    ZeroDepotLoad(usize),
    #[error("depot load per cycle {depot_load} exceeds van capacity {van_capacity}")]
    DepotLoadExceedsVanCapacity {
        depot_load: usize,
        van_capacity: usize,
    },
    #[error("need at least one person, got {0}")]
    NoPersons(usize),
}

/// A programmer error: a monitor method was called with a bike type
/// index outside `[0, T)`. Per the error taxonomy this is not
/// recoverable — the caller should propagate it and stop the worker
/// rather than paper over it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("bike type index {index} out of range, must be < {num_types}")]
pub struct PreconditionError {
    pub index: u8,
    pub num_types: u8,
}
