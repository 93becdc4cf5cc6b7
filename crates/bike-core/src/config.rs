// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Simulation-wide configuration (conc.sim constants, validated).

use crate::bike::BikeType;
use crate::error::ConfigError;

/// Immutable configuration shared by every worker, built once at
/// start-up and handed out by reference — never a global/static (see
/// the design notes on avoiding process-wide static state).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// T: number of distinct bike types.
    pub num_bike_types: u8,
    /// S: total number of sites, including the depot at index 0.
    pub num_sites: usize,
    /// C / BORNES: per-station slot count.
    pub station_capacity: usize,
    /// Maximum bikes the rebalancer can carry at once.
    pub van_capacity: usize,
    /// Bikes loaded from the depot at the start of each rebalancer cycle.
    pub depot_load_per_cycle: usize,
    /// Number of person workers to run.
    pub num_persons: usize,
}

impl SimConfig {
    pub fn new(
        num_bike_types: u8,
        num_sites: usize,
        station_capacity: usize,
        van_capacity: usize,
        depot_load_per_cycle: usize,
        num_persons: usize,
    ) -> Result<Self, ConfigError> {
        if num_bike_types == 0 {
            return Err(ConfigError::NoBikeTypes(num_bike_types));
        }
        if num_sites < 2 {
            return Err(ConfigError::TooFewSites(num_sites));
        }
        if station_capacity < num_bike_types as usize {
            return Err(ConfigError::CapacityBelowTypes {
                capacity: station_capacity,
                types: num_bike_types,
            });
        }
        if van_capacity == 0 {
            return Err(ConfigError::ZeroVanCapacity(van_capacity));
        }
        if depot_load_per_cycle == 0 {
            return Err(ConfigError::ZeroDepotLoad(depot_load_per_cycle));
        }
        if depot_load_per_cycle > van_capacity {
            return Err(ConfigError::DepotLoadExceedsVanCapacity {
                depot_load: depot_load_per_cycle,
                van_capacity,
            });
        }
        if num_persons == 0 {
            return Err(ConfigError::NoPersons(num_persons));
        }
        Ok(Self {
            num_bike_types,
            num_sites,
            station_capacity,
            van_capacity,
            depot_load_per_cycle,
            num_persons,
        })
    }

    /// BORNES − 2: the per-station level the rebalancer aims for.
    ///
    /// Saturates at 0 rather than panicking if capacity is very small;
    /// `balance()` treats a target of 0 the same as any other target.
    pub fn target_level(&self) -> usize {
        self.station_capacity.saturating_sub(2)
    }

    pub fn bike_types(&self) -> impl Iterator<Item = BikeType> {
        (0..self.num_bike_types).map(BikeType)
    }
}
