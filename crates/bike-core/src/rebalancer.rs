// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Rebalancer agent (conc.sim rebalancing policy) — the single van
//! that cyclically visits every site and nudges bike counts toward a
//! per-station target, preferring type diversity over raw count.

use std::sync::Arc;

use crate::bike::{Bike, BikeType, SiteId};
use crate::config::SimConfig;
use crate::observer::Observer;
use crate::random::RandomSource;
use crate::station::StationMonitor;

/// Runs the rebalancer's drive/load/balance/return cycle until it
/// either is asked to stop or detects global shutdown (every station
/// having closed, observed when a full-cargo return-to-depot is
/// entirely rejected).
pub struct RebalancerAgent<'a> {
    config: &'a SimConfig,
    stations: &'a [StationMonitor],
    observer: Arc<dyn Observer>,
    random: Arc<dyn RandomSource>,
    cargo: Vec<Bike>,
    current_site: SiteId,
    /// Single-writer flag: only this struct's own loop reads or
    /// writes it, so no atomic/mutex is needed (per the concurrency
    /// model's note on the stop flag).
    stop: bool,
}

impl<'a> RebalancerAgent<'a> {
    pub fn new(
        config: &'a SimConfig,
        stations: &'a [StationMonitor],
        observer: Arc<dyn Observer>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            config,
            stations,
            observer,
            random,
            cargo: Vec::with_capacity(config.van_capacity),
            current_site: SiteId::DEPOT,
            stop: false,
        }
    }

    fn depot(&self) -> &StationMonitor {
        &self.stations[SiteId::DEPOT.0]
    }

    pub fn has_stopped(&self) -> bool {
        self.stop
    }

    /// Run cycles until `stop` is set. Each cycle is one drive/load/
    /// visit-every-site/return sweep.
    pub fn run(&mut self) {
        while !self.stop {
            self.cycle();
        }
        self.observer
            .console_append_text(0, "van stops cleanly");
    }

    /// One full cycle: depot → every non-depot site in index order → depot.
    pub fn cycle(&mut self) {
        self.load_at_depot();

        for s in 1..self.config.num_sites {
            let site = SiteId(s);
            self.drive_to(site);
            self.balance(site);
        }

        self.return_to_depot();
    }

    fn drive_to(&mut self, dest: SiteId) {
        if self.current_site == dest {
            return;
        }
        let duration_ms = self.random.travel_time_ms();
        self.observer
            .van_travel(self.current_site, dest, duration_ms);
        self.current_site = dest;
    }

    fn load_at_depot(&mut self) {
        self.drive_to(SiteId::DEPOT);
        self.cargo.clear();

        let available = self.depot().count_total();
        let to_load = self.config.depot_load_per_cycle.min(available);
        if to_load > 0 {
            let loaded = self.depot().take_many(to_load);
            self.cargo.extend(loaded);
        }

        self.observer
            .set_bikes(SiteId::DEPOT, self.depot().count_total());
    }

    /// Apply the surplus/deficit/on-target policy at `site`.
    fn balance(&mut self, site: SiteId) {
        debug_assert!(!site.is_depot());
        let station = &self.stations[site.0];

        let target = self.config.target_level();
        let current = station.count_total();

        if current > target {
            let surplus = current - target;
            let free_space = self.config.van_capacity - self.cargo.len();
            let c = surplus.min(free_space);
            if c > 0 {
                let taken = station.take_many(c);
                self.cargo.extend(taken);
            }
        } else if current < target {
            let deficit = target - current;
            let c = deficit.min(self.cargo.len());
            let deposit = self.build_deposit(station, c);
            if !deposit.is_empty() {
                let rejected = station.put_many(deposit);
                self.cargo.extend(rejected);
            }
        }

        self.observer.set_bikes(site, station.count_total());
        self.observer
            .set_bikes(SiteId::DEPOT, self.depot().count_total());
    }

    /// Build the deposit list for a deficit of up to `c` bikes.
    ///
    /// Diversity phase first: for each type missing at the station,
    /// pull one matching bike out of cargo if one exists. Only once
    /// every missing type has been considered (or `c` is reached) does
    /// the fill phase take whatever's left in cargo, LIFO — there's no
    /// ordering contract on cargo, so popping from the end is cheapest.
    fn build_deposit(&mut self, station: &StationMonitor, c: usize) -> Vec<Bike> {
        let mut deposit = Vec::with_capacity(c);

        for t in self.config.bike_types() {
            if deposit.len() >= c {
                break;
            }
            let present = station
                .count_of(t)
                .expect("bike type from SimConfig is always in range");
            if present == 0 {
                if let Some(bike) = self.take_from_cargo(t) {
                    deposit.push(bike);
                }
            }
        }

        while deposit.len() < c {
            match self.cargo.pop() {
                Some(bike) => deposit.push(bike),
                None => break,
            }
        }

        deposit
    }

    /// Remove one bike of `kind` from cargo, if present. `swap_remove`
    /// is fine — cargo has no ordering contract.
    fn take_from_cargo(&mut self, kind: BikeType) -> Option<Bike> {
        let idx = self.cargo.iter().position(|b| b.kind == kind)?;
        Some(self.cargo.swap_remove(idx))
    }

    /// Drive back to the depot and unload cargo. If *nothing* could be
    /// placed (every station including the depot has shut down), this
    /// is the rebalancer's only termination signal: set `stop` and
    /// return.
    fn return_to_depot(&mut self) {
        self.drive_to(SiteId::DEPOT);

        if self.cargo.is_empty() {
            self.observer
                .set_bikes(SiteId::DEPOT, self.depot().count_total());
            return;
        }

        let outgoing = std::mem::take(&mut self.cargo);
        let outgoing_len = outgoing.len();
        let rejected = self.depot().put_many(outgoing);
        let fully_rejected = rejected.len() == outgoing_len;
        self.cargo = rejected;

        if fully_rejected {
            self.stop = true;
            return;
        }

        self.observer
            .set_bikes(SiteId::DEPOT, self.depot().count_total());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NullObserver;
    use crate::random::SeededRandom;

    fn bike(t: u8) -> Bike {
        Bike::new(BikeType(t))
    }

    fn harness(config: &SimConfig) -> (Vec<StationMonitor>, Arc<dyn Observer>, Arc<dyn RandomSource>) {
        let stations = (0..config.num_sites)
            .map(|_| StationMonitor::new(config.station_capacity, config.num_bike_types))
            .collect();
        (stations, Arc::new(NullObserver), Arc::new(SeededRandom::new(1)))
    }

    #[test]
    fn bulk_diversity_rebalance_prefers_missing_types() {
        let config = SimConfig::new(3, 2, 5, 3, 2, 1).unwrap();
        let (stations, observer, random) = harness(&config);

        // Station has 2 bikes of type 0, nothing else; target = 3.
        stations[1].put(bike(0));
        stations[1].put(bike(0));

        let mut van = RebalancerAgent::new(&config, &stations, observer, random);
        van.cargo = vec![bike(0), bike(1), bike(2)];

        van.balance(SiteId(1));

        // Only one bike fits (target 3 - current 2 = 1), and it must
        // be a missing type (1 or 2), not the already-present type 0.
        assert_eq!(stations[1].count_total(), 3);
        assert_eq!(stations[1].count_of(BikeType(0)).unwrap(), 2);
        let has_type1 = stations[1].count_of(BikeType(1)).unwrap() == 1;
        let has_type2 = stations[1].count_of(BikeType(2)).unwrap() == 1;
        assert!(has_type1 ^ has_type2);
    }

    #[test]
    fn surplus_site_loads_cargo_up_to_van_capacity() {
        let config = SimConfig::new(2, 2, 5, 2, 2, 1).unwrap();
        let (stations, observer, random) = harness(&config);
        for _ in 0..5 {
            stations[1].put(bike(0));
        }

        let mut van = RebalancerAgent::new(&config, &stations, observer, random);
        van.balance(SiteId(1));

        // target = 3, surplus = 2, van capacity 2 -> takes 2.
        assert_eq!(van.cargo.len(), 2);
        assert_eq!(stations[1].count_total(), 3);
    }

    #[test]
    fn global_shutdown_detected_on_fully_rejected_return() {
        let config = SimConfig::new(2, 2, 4, 2, 2, 1).unwrap();
        let (stations, observer, random) = harness(&config);
        for s in &stations {
            s.shutdown();
        }

        let mut van = RebalancerAgent::new(&config, &stations, observer, random);
        van.cargo = vec![bike(0), bike(1)];
        van.return_to_depot();

        assert!(van.has_stopped());
        assert_eq!(van.cargo.len(), 2);
    }

    #[test]
    fn on_target_site_is_left_untouched() {
        let config = SimConfig::new(1, 2, 5, 3, 2, 1).unwrap();
        let (stations, observer, random) = harness(&config);
        for _ in 0..config.target_level() {
            stations[1].put(bike(0));
        }

        let mut van = RebalancerAgent::new(&config, &stations, observer, random);
        van.balance(SiteId(1));

        assert_eq!(stations[1].count_total(), config.target_level());
        assert!(van.cargo.is_empty());
    }
}
