// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Wires up a `SimConfig`, the station array, and the worker threads,
//! runs the simulation for a fixed duration, then shuts every station
//! down and prints a summary. Thread spawning and bootstrap live here
//! deliberately — the concurrency core in `bike-core` has no idea how
//! many threads exist or how the process is started.

use std::sync::Arc;
use std::thread;

use bike_core::{
    Bike, BikeType, Observer, PersonWorker, RandomSource, RebalancerAgent, SeededRandom, SimConfig,
    SiteId, StationMonitor, SystemRandom, TracingObserver,
};

use crate::cli::{Cli, Format};

pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = SimConfig::new(
        cli.bike_types,
        cli.sites,
        cli.capacity,
        cli.van_capacity,
        cli.depot_load,
        cli.persons,
    )?;

    let observer: Arc<dyn Observer> = Arc::new(TracingObserver);
    let random: Arc<dyn RandomSource> = match cli.seed {
        Some(seed) => Arc::new(SeededRandom::new(seed)),
        None => Arc::new(SystemRandom::new()),
    };

    let stations = Arc::new(build_stations(&config));
    seed_depot(&stations[SiteId::DEPOT.0], &config);

    let person_handles: Vec<_> = (0..config.num_persons)
        .map(|id| spawn_person(id as u32, &config, &stations, &observer, &random))
        .collect();
    let rebalancer_handle = spawn_rebalancer(&config, &stations, &observer, &random);

    thread::sleep(cli.run_for);
    tracing::info!("run duration elapsed, shutting down every station");
    for station in stations.iter() {
        station.shutdown();
    }

    for handle in person_handles {
        let _ = handle.join();
    }
    let _ = rebalancer_handle.join();

    print_summary(&cli, &stations);
    Ok(())
}

fn build_stations(config: &SimConfig) -> Vec<StationMonitor> {
    (0..config.num_sites)
        .map(|_| StationMonitor::new(config.station_capacity, config.num_bike_types))
        .collect()
}

/// Give the depot an initial supply, round-robin across types, so the
/// simulation has something to circulate. Bootstrap-only concern: the
/// core itself never seeds or assumes initial contents.
fn seed_depot(depot: &StationMonitor, config: &SimConfig) {
    for i in 0..config.station_capacity {
        let kind = BikeType((i % config.num_bike_types as usize) as u8);
        depot.put(Bike::new(kind));
    }
}

fn spawn_person(
    id: u32,
    config: &SimConfig,
    stations: &Arc<Vec<StationMonitor>>,
    observer: &Arc<dyn Observer>,
    random: &Arc<dyn RandomSource>,
) -> thread::JoinHandle<()> {
    let config = config.clone();
    let stations = stations.clone();
    let observer = observer.clone();
    let random = random.clone();

    thread::Builder::new()
        .name(format!("person-{id}"))
        .spawn(move || {
            let mut person = PersonWorker::new(id, SiteId::DEPOT, config.num_bike_types, random.as_ref());
            person.run(&stations, config.num_sites, observer.as_ref(), random.as_ref());
        })
        .expect("failed to spawn person thread")
}

fn spawn_rebalancer(
    config: &SimConfig,
    stations: &Arc<Vec<StationMonitor>>,
    observer: &Arc<dyn Observer>,
    random: &Arc<dyn RandomSource>,
) -> thread::JoinHandle<()> {
    let config = config.clone();
    let stations = stations.clone();
    let observer = observer.clone();
    let random = random.clone();

    thread::Builder::new()
        .name("rebalancer".to_string())
        .spawn(move || {
            let mut van = RebalancerAgent::new(&config, &stations, observer, random);
            van.run();
        })
        .expect("failed to spawn rebalancer thread")
}

fn print_summary(cli: &Cli, stations: &[StationMonitor]) {
    let counts: Vec<usize> = stations.iter().map(StationMonitor::count_total).collect();
    let total: usize = counts.iter().sum();

    match cli.format {
        Format::Human => {
            println!("simulation finished after {:?}", cli.run_for);
            for (site, count) in counts.iter().enumerate() {
                println!("  site {site}: {count} bikes");
            }
            println!("total bikes in circulation: {total}");
        }
        Format::Json => {
            let sites: Vec<String> = counts
                .iter()
                .enumerate()
                .map(|(site, count)| format!(r#"{{"site":{site},"count":{count}}}"#))
                .collect();
            println!(
                r#"{{"run_for_ms":{},"total":{},"sites":[{}]}}"#,
                cli.run_for.as_millis(),
                total,
                sites.join(",")
            );
        }
    }
}
