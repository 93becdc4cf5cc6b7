// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Person worker (conc.sim client contract) — the only client of a
//! `StationMonitor` that uses the single-bike `put`/`take` calls
//! rather than the bulk operations.

use crate::bike::{BikeType, SiteId};
use crate::observer::Observer;
use crate::random::RandomSource;
use crate::station::StationMonitor;

/// One simulated person: an id, a preferred bike type fixed at
/// construction, and a current site. `run` blocks on the monitor
/// exclusively — travel/walk simulation never happens while holding
/// any lock.
pub struct PersonWorker {
    id: u32,
    preferred_type: BikeType,
    current_site: SiteId,
}

impl PersonWorker {
    /// Picks `preferred_type` uniformly over `[0, num_bike_types)`.
    pub fn new(id: u32, home_site: SiteId, num_bike_types: u8, random: &dyn RandomSource) -> Self {
        let preferred_type = BikeType(random.uniform_index(num_bike_types as usize) as u8);
        Self {
            id,
            preferred_type,
            current_site: home_site,
        }
    }

    /// take → ride → deposit → walk, forever, until `take` observes
    /// shutdown (returns `None`), at which point the worker exits.
    pub fn run(
        &mut self,
        stations: &[StationMonitor],
        num_sites: usize,
        observer: &dyn Observer,
        random: &dyn RandomSource,
    ) {
        loop {
            let bike = match stations[self.current_site.0].take(self.preferred_type) {
                Ok(Some(bike)) => bike,
                Ok(None) => {
                    observer.console_append_text(
                        self.id,
                        "simulation ending, exiting",
                    );
                    return;
                }
                Err(_) => unreachable!("preferred_type is always in range"),
            };
            observer.set_bikes(self.current_site, stations[self.current_site.0].count_total());

            let destination = random.site_except(num_sites, self.current_site);
            let ride_ms = random.travel_time_ms() + 1000;
            observer.travel(self.id, self.current_site, destination, ride_ms);
            self.current_site = destination;

            // Single `put`, never `put_many` — per the error-handling
            // design, a bike lost on shutdown here is an accepted,
            // deliberate leak; the person doesn't retry or re-queue it.
            if stations[self.current_site.0].put(bike).is_some() {
                observer.console_append_text(
                    self.id,
                    "station closed while depositing, bike leaked on shutdown",
                );
            }
            observer.set_bikes(self.current_site, stations[self.current_site.0].count_total());

            let walk_to = random.site_except(num_sites, self.current_site);
            let walk_ms = random.travel_time_ms() + 2000;
            observer.walk(self.id, self.current_site, walk_to, walk_ms);
            self.current_site = walk_to;
        }
    }

    pub fn preferred_type(&self) -> BikeType {
        self.preferred_type
    }

    pub fn current_site(&self) -> SiteId {
        self.current_site
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NullObserver;
    use crate::random::SeededRandom;
    use std::sync::Arc;

    #[test]
    fn exits_cleanly_on_shutdown() {
        let stations = vec![StationMonitor::new(4, 2)];
        stations[0].shutdown();
        let random = SeededRandom::new(1);
        let observer = NullObserver;

        let mut person = PersonWorker::new(0, SiteId(0), 2, &random);
        // run() must return promptly rather than block forever.
        person.run(&stations, 1, &observer, &random);
    }

    #[test]
    fn take_on_already_closed_station_leaves_queued_bike_untouched() {
        let stations: Vec<StationMonitor> = (0..2)
            .map(|_| StationMonitor::new(4, 1))
            .collect();
        stations[0].put(crate::bike::Bike::new(BikeType(0)));
        stations[0].shutdown();
        stations[1].shutdown();

        let random = SeededRandom::new(2);
        let observer = NullObserver;
        let mut person = PersonWorker::new(1, SiteId(0), 1, &random);
        person.run(&stations, 2, &observer, &random);

        // `take` on an already-closed station returns `None` without
        // inspecting the queue, so the bike placed before shutdown is
        // still sitting there — untouched, not leaked.
        let total: usize = stations.iter().map(StationMonitor::count_total).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn uses_arc_random_source_across_threads() {
        let random: Arc<dyn RandomSource> = Arc::new(SeededRandom::new(3));
        let person = PersonWorker::new(2, SiteId(0), 3, random.as_ref());
        assert!(person.preferred_type().index() < 3);
    }
}
