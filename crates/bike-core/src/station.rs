// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Station monitor (conc.sim core) — a bounded, typed, multi-producer
//! multi-consumer bike queue guarded by one mutex and a condition
//! variable family.
//!
//! Mesa-style monitor: every predicate is re-checked in a `while` loop
//! after waking, so a spurious or imprecise wake can never falsify an
//! invariant. One lock guards every byte of mutable state (the queues
//! and the shutdown flag); the condition variables live alongside it
//! but are logically bound to it, never locked independently.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};

use crate::bike::{Bike, BikeType};
use crate::error::PreconditionError;

struct Inner {
    /// Per-type FIFO queues. `queues[t]` holds bikes of type `t`, head
    /// = oldest (O1: dequeuing from the head gives per-type FIFO).
    queues: Vec<VecDeque<Bike>>,
    shutdown: bool,
}

impl Inner {
    fn total(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }
}

/// A bounded typed bike queue for one site.
///
/// `put`/`take`/`put_many` are the only suspension points; every other
/// method is non-blocking. No operation here calls out to the
/// `Observer` while the lock is held — callers (person/rebalancer
/// workers) notify the observer themselves after the monitor call
/// returns.
pub struct StationMonitor {
    capacity: usize,
    num_types: u8,
    inner: Mutex<Inner>,
    /// Signalled whenever capacity frees up (a `take`/`take_many`
    /// removed something) or on shutdown.
    putters: Condvar,
    /// One condition per bike type, co-located with `inner`'s mutex.
    /// A single shared condition would wake every taker regardless of
    /// type on every `put`; per-type conditions let `put`/`take` wake
    /// exactly the threads that might have work to do.
    takers: Vec<Condvar>,
}

impl StationMonitor {
    /// Build an empty, open station. `num_types` is `T`; capacities
    /// below `T` are legal here (validation lives in `SimConfig`) but
    /// make the station immediately full-feeling for diverse loads.
    pub fn new(capacity: usize, num_types: u8) -> Self {
        let queues = (0..num_types).map(|_| VecDeque::new()).collect();
        let takers = (0..num_types).map(|_| Condvar::new()).collect();
        Self {
            capacity,
            num_types,
            inner: Mutex::new(Inner {
                queues,
                shutdown: false,
            }),
            putters: Condvar::new(),
            takers,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_type(&self, kind: BikeType) -> Result<(), PreconditionError> {
        if kind.index() >= self.num_types as usize {
            Err(PreconditionError {
                index: kind.0,
                num_types: self.num_types,
            })
        } else {
            Ok(())
        }
    }

    /// Block until there's room or the station shuts down. On
    /// shutdown, returns the bike to the caller unplaced — it does not
    /// get enqueued (see the module-level error-handling design: an
    /// orphaned bike on shutdown is the caller's problem).
    pub fn put(&self, bike: Bike) -> Option<Bike> {
        let mut guard = self.lock();
        loop {
            if guard.shutdown {
                return Some(bike);
            }
            if guard.total() < self.capacity {
                break;
            }
            guard = self
                .putters
                .wait(guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }

        let t = bike.kind.index();
        guard.queues[t].push_back(bike);
        self.takers[t].notify_one();
        self.putters.notify_one();
        None
    }

    /// Block until a bike of `kind` is available or the station shuts
    /// down. Returns `Ok(None)` on shutdown — not an error, per the
    /// shutdown-observed classification.
    pub fn take(&self, kind: BikeType) -> Result<Option<Bike>, PreconditionError> {
        self.check_type(kind)?;
        let t = kind.index();
        let mut guard = self.lock();
        while !guard.shutdown && guard.queues[t].is_empty() {
            guard = self.takers[t]
                .wait(guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }

        if guard.shutdown {
            return Ok(None);
        }

        let bike = guard.queues[t].pop_front().expect("checked non-empty above");
        self.putters.notify_one();
        // Mesa-style relay: wake one more waiter of this type in case
        // the queue was refilled concurrently while we were still
        // holding the lock between wake and re-check.
        self.takers[t].notify_one();
        Ok(Some(bike))
    }

    /// Place each bike in order under a single lock acquisition (with
    /// waits that release it normally, per-bike). Not atomic across
    /// the whole list by design — see the module docs on bulk
    /// operations. Bikes that can't be placed because shutdown
    /// intervened are returned, in order, as the "unplaced" suffix.
    pub fn put_many(&self, bikes: Vec<Bike>) -> Vec<Bike> {
        let mut unplaced = Vec::new();
        let mut guard = self.lock();

        for bike in bikes {
            loop {
                if guard.shutdown {
                    unplaced.push(bike);
                    break;
                }
                if guard.total() < self.capacity {
                    let t = bike.kind.index();
                    guard.queues[t].push_back(bike);
                    self.takers[t].notify_one();
                    self.putters.notify_one();
                    break;
                }
                guard = self
                    .putters
                    .wait(guard)
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
            }
        }

        unplaced
    }

    /// Non-blocking drain: walk types `0..T` in order, draining each
    /// queue's head until the result has `n` bikes or everything is
    /// empty. Returning fewer than `n` (including zero) is legal.
    pub fn take_many(&self, n: usize) -> Vec<Bike> {
        let mut result = Vec::with_capacity(n.min(self.capacity));
        let mut drained_types = vec![false; self.num_types as usize];
        let mut guard = self.lock();

        for t in 0..self.num_types as usize {
            while result.len() < n {
                match guard.queues[t].pop_front() {
                    Some(bike) => {
                        result.push(bike);
                        drained_types[t] = true;
                    }
                    None => break,
                }
            }
            if result.len() == n {
                break;
            }
        }

        if !result.is_empty() {
            self.putters.notify_all();
            for (t, drained) in drained_types.into_iter().enumerate() {
                if drained {
                    self.takers[t].notify_one();
                }
            }
        }

        result
    }

    /// Snapshot length of the queue for `kind`, taken under the lock.
    pub fn count_of(&self, kind: BikeType) -> Result<usize, PreconditionError> {
        self.check_type(kind)?;
        let guard = self.lock();
        Ok(guard.queues[kind.index()].len())
    }

    /// Snapshot total bike count across every type, taken under the lock.
    pub fn count_total(&self) -> usize {
        self.lock().total()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// One-way OPEN → CLOSED transition. Idempotent: calling it again
    /// is a no-op (the flag is already set, the broadcasts just wake
    /// nobody new). Wakes every waiter so each re-checks its predicate
    /// and observes shutdown within bounded scheduling time.
    pub fn shutdown(&self) {
        let mut guard = self.lock();
        guard.shutdown = true;
        drop(guard);
        self.putters.notify_all();
        for cvar in &self.takers {
            cvar.notify_all();
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.lock().shutdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn bike(t: u8) -> Bike {
        Bike::new(BikeType(t))
    }

    #[test]
    fn put_then_take_round_trip() {
        let st = StationMonitor::new(4, 2);
        assert!(st.put(bike(0)).is_none());
        let got = st.take(BikeType(0)).unwrap();
        assert_eq!(got, Some(bike(0)));
    }

    #[test]
    fn put_many_then_take_many_round_trip() {
        let st = StationMonitor::new(8, 2);
        let unplaced = st.put_many(vec![bike(0), bike(1), bike(0)]);
        assert!(unplaced.is_empty());
        let got = st.take_many(3);
        assert_eq!(got.len(), 3);

        let type0_count = got.iter().filter(|b| b.kind == BikeType(0)).count();
        let type1_count = got.iter().filter(|b| b.kind == BikeType(1)).count();
        assert_eq!(type0_count, 2);
        assert_eq!(type1_count, 1);
    }

    #[test]
    fn per_type_fifo_is_preserved() {
        let st = StationMonitor::new(8, 2);
        st.put(bike(0));
        st.put(bike(1));
        st.put(bike(0));

        assert_eq!(st.count_of(BikeType(0)).unwrap(), 2);
        assert_eq!(st.take(BikeType(0)).unwrap(), Some(bike(0)));
        assert_eq!(st.take(BikeType(0)).unwrap(), Some(bike(0)));
        assert_eq!(st.take(BikeType(1)).unwrap(), Some(bike(1)));
    }

    #[test]
    fn take_many_zero_returns_empty() {
        let st = StationMonitor::new(4, 1);
        st.put(bike(0));
        assert!(st.take_many(0).is_empty());
        assert_eq!(st.count_total(), 1);
    }

    #[test]
    fn take_many_caps_at_available() {
        let st = StationMonitor::new(4, 1);
        st.put(bike(0));
        let got = st.take_many(10);
        assert_eq!(got.len(), 1);
    }

    #[test]
    fn take_out_of_range_type_is_precondition_error() {
        let st = StationMonitor::new(4, 2);
        let err = st.take(BikeType(5)).unwrap_err();
        assert_eq!(err.index, 5);
        assert_eq!(err.num_types, 2);
    }

    #[test]
    fn capacity_boundary_blocks_exactly_at_full() {
        let st = Arc::new(StationMonitor::new(1, 1));
        assert!(st.put(bike(0)).is_none());

        let st2 = st.clone();
        let blocked = thread::spawn(move || st2.put(bike(0)));

        thread::sleep(Duration::from_millis(50));
        assert_eq!(st.count_total(), 1);

        let taken = st.take(BikeType(0)).unwrap();
        assert_eq!(taken, Some(bike(0)));
        assert!(blocked.join().unwrap().is_none());
        assert_eq!(st.count_total(), 1);
    }

    #[test]
    fn empty_boundary_is_per_type_not_global() {
        let st = Arc::new(StationMonitor::new(4, 2));
        st.put(bike(1));

        let st2 = st.clone();
        let waiter = thread::spawn(move || st2.take(BikeType(0)));

        thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished());

        st.shutdown();
        assert_eq!(waiter.join().unwrap().unwrap(), None);
    }

    #[test]
    fn shutdown_unblocks_putter_without_placing() {
        let st = Arc::new(StationMonitor::new(1, 1));
        st.put(bike(0));

        let st2 = st.clone();
        let blocked = thread::spawn(move || st2.put(bike(0)));
        thread::sleep(Duration::from_millis(50));

        st.shutdown();
        let returned = blocked.join().unwrap();
        assert!(returned.is_some());
        assert_eq!(st.count_total(), 1);
    }

    #[test]
    fn shutdown_unblocks_typed_takers() {
        let st = Arc::new(StationMonitor::new(4, 2));
        let a = {
            let st = st.clone();
            thread::spawn(move || st.take(BikeType(0)))
        };
        let b = {
            let st = st.clone();
            thread::spawn(move || st.take(BikeType(1)))
        };
        thread::sleep(Duration::from_millis(50));

        st.shutdown();
        assert_eq!(a.join().unwrap().unwrap(), None);
        assert_eq!(b.join().unwrap().unwrap(), None);
    }

    #[test]
    fn shutdown_is_idempotent() {
        let st = StationMonitor::new(4, 1);
        st.shutdown();
        st.shutdown();
        assert!(st.is_shutdown());
        assert_eq!(st.take(BikeType(0)).unwrap(), None);
    }

    #[test]
    fn single_type_single_slot_scenario() {
        let st = Arc::new(StationMonitor::new(1, 1));
        st.put(bike(0));

        let st2 = st.clone();
        let second_put = thread::spawn(move || st2.put(bike(0)));
        thread::sleep(Duration::from_millis(50));
        assert!(!second_put.is_finished());

        assert_eq!(st.take(BikeType(0)).unwrap(), Some(bike(0)));
        assert!(second_put.join().unwrap().is_none());
        assert_eq!(st.take(BikeType(0)).unwrap(), Some(bike(0)));
    }
}
