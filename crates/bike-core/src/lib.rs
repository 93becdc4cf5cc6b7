// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Concurrent coordination core for a bike-sharing simulation.
//!
//! The centerpiece is [`station::StationMonitor`]: a bounded, typed,
//! multi-producer multi-consumer queue guarded by one mutex and a
//! condition-variable family, mediating between many [`person::PersonWorker`]
//! threads and one [`rebalancer::RebalancerAgent`]. See each module for
//! the concurrency contract it implements.

pub mod bike;
pub mod config;
pub mod error;
pub mod observer;
pub mod person;
pub mod random;
pub mod rebalancer;
pub mod station;

pub use bike::{Bike, BikeType, SiteId};
pub use config::SimConfig;
pub use error::{ConfigError, PreconditionError};
pub use observer::{NullObserver, Observer, TracingObserver};
pub use person::PersonWorker;
pub use random::{RandomSource, SeededRandom, SystemRandom};
pub use rebalancer::RebalancerAgent;
pub use station::StationMonitor;
