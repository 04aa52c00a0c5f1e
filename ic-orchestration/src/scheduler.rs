//! Scheduler de auto-disparo
//!
//! Keeps the locations of active self-triggering ICs in insertion order and
//! visits each of them once per tick. Removal marks a slot as empty so the
//! running pass never revisits it; empty slots are compacted after the pass.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use ic_core::Location;

use crate::error::{OrchestrationError, OrchestrationResult};

/// Result of one `think` delivery, decided by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThinkOutcome {
    /// `think` ran
    Thought,
    /// `think` raised a fault; the entry stays registered
    Faulted,
    /// Nothing delivered this tick (broken or not yet active)
    Skipped,
    /// The placement is gone; drop the entry
    Remove,
}

/// Resumo de uma passada
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    pub visited: usize,
    pub thought: usize,
    pub faults: usize,
    pub skipped: usize,
    pub removed: usize,
}

/// Estatísticas do scheduler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    /// Passadas executadas
    pub ticks: u64,
    /// Chamadas de `think` entregues
    pub thinks: u64,
    /// Falhas isoladas
    pub faults: u64,
    /// Entradas registradas agora
    pub registered: usize,
}

/// Registro de ICs auto-disparados
#[derive(Debug, Default)]
pub struct SelfTriggerScheduler {
    entries: Vec<Option<Location>>,
    positions: HashMap<Location, usize>,
    tombstones: usize,
    stats: SchedulerStats,
}

impl SelfTriggerScheduler {
    /// Cria scheduler vazio
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `location` at the end of the visiting order.
    ///
    /// Registering a location twice is a caller error.
    pub fn register(&mut self, location: Location) -> OrchestrationResult<()> {
        if self.positions.contains_key(&location) {
            return Err(OrchestrationError::AlreadyRegistered(location));
        }
        self.positions.insert(location, self.entries.len());
        self.entries.push(Some(location));
        debug!(location = %location, "registered for self-triggering");
        Ok(())
    }

    /// Removes `location`; `false` if it was not registered.
    pub fn unregister(&mut self, location: Location) -> bool {
        match self.positions.remove(&location) {
            Some(index) => {
                self.entries[index] = None;
                self.tombstones += 1;
                debug!(location = %location, "unregistered from self-triggering");
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, location: Location) -> bool {
        self.positions.contains_key(&location)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Registered locations in visiting order.
    pub fn iter(&self) -> impl Iterator<Item = Location> + '_ {
        self.entries.iter().flatten().copied()
    }

    /// Visits every registered location once, in insertion order.
    ///
    /// `think` reports what happened; [`ThinkOutcome::Remove`] drops the
    /// entry before the pass moves on.
    pub fn tick<F>(&mut self, mut think: F) -> PassReport
    where
        F: FnMut(Location) -> ThinkOutcome,
    {
        self.stats.ticks += 1;
        let mut report = PassReport::default();

        for index in 0..self.entries.len() {
            let Some(location) = self.entries[index] else {
                continue;
            };
            report.visited += 1;

            match think(location) {
                ThinkOutcome::Thought => {
                    report.thought += 1;
                    self.stats.thinks += 1;
                }
                ThinkOutcome::Faulted => {
                    report.faults += 1;
                    self.stats.faults += 1;
                }
                ThinkOutcome::Skipped => report.skipped += 1,
                ThinkOutcome::Remove => {
                    self.unregister(location);
                    report.removed += 1;
                }
            }
        }

        if self.tombstones * 2 > self.entries.len() {
            self.compact();
        }
        report
    }

    fn compact(&mut self) {
        self.entries.retain(Option::is_some);
        self.positions.clear();
        for (index, location) in self.entries.iter().flatten().enumerate() {
            self.positions.insert(*location, index);
        }
        self.tombstones = 0;
    }

    /// Clears every registration without calling `think`.
    ///
    /// Returns how many entries were dropped; a second call returns 0.
    pub fn unload(&mut self) -> usize {
        let dropped = self.positions.len();
        self.entries.clear();
        self.positions.clear();
        self.tombstones = 0;
        if dropped > 0 {
            debug!(dropped, "self-trigger scheduler unloaded");
        }
        dropped
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            registered: self.len(),
            ..self.stats
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spot(x: i32) -> Location {
        Location::new(x, 64, 0)
    }

    #[test]
    fn test_register_twice_is_error() {
        let mut scheduler = SelfTriggerScheduler::new();
        scheduler.register(spot(1)).unwrap();
        assert_eq!(
            scheduler.register(spot(1)),
            Err(OrchestrationError::AlreadyRegistered(spot(1)))
        );
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_tick_visits_in_insertion_order() {
        let mut scheduler = SelfTriggerScheduler::new();
        for x in [3, 1, 2] {
            scheduler.register(spot(x)).unwrap();
        }

        let mut visited = Vec::new();
        let report = scheduler.tick(|location| {
            visited.push(location.x);
            ThinkOutcome::Thought
        });
        assert_eq!(visited, vec![3, 1, 2]);
        assert_eq!(report.thought, 3);
    }

    #[test]
    fn test_fault_does_not_stop_pass() {
        let mut scheduler = SelfTriggerScheduler::new();
        for x in 0..3 {
            scheduler.register(spot(x)).unwrap();
        }

        let mut visited = Vec::new();
        let report = scheduler.tick(|location| {
            visited.push(location.x);
            if location.x == 1 {
                ThinkOutcome::Faulted
            } else {
                ThinkOutcome::Thought
            }
        });
        assert_eq!(visited, vec![0, 1, 2]);
        assert_eq!(report.faults, 1);
        assert!(scheduler.contains(spot(1)));
        assert_eq!(scheduler.stats().faults, 1);
    }

    #[test]
    fn test_remove_during_pass() {
        let mut scheduler = SelfTriggerScheduler::new();
        for x in 0..4 {
            scheduler.register(spot(x)).unwrap();
        }

        let report = scheduler.tick(|location| {
            if location.x % 2 == 0 {
                ThinkOutcome::Remove
            } else {
                ThinkOutcome::Thought
            }
        });
        assert_eq!(report.removed, 2);
        assert_eq!(scheduler.iter().map(|l| l.x).collect::<Vec<_>>(), vec![1, 3]);

        let mut visited = Vec::new();
        scheduler.tick(|location| {
            visited.push(location.x);
            ThinkOutcome::Thought
        });
        assert_eq!(visited, vec![1, 3]);
    }

    #[test]
    fn test_reregister_after_compaction() {
        let mut scheduler = SelfTriggerScheduler::new();
        for x in 0..3 {
            scheduler.register(spot(x)).unwrap();
        }
        scheduler.unregister(spot(0));
        scheduler.unregister(spot(1));
        scheduler.tick(|_| ThinkOutcome::Thought);

        scheduler.register(spot(0)).unwrap();
        assert_eq!(scheduler.iter().map(|l| l.x).collect::<Vec<_>>(), vec![2, 0]);
        assert!(scheduler.unregister(spot(2)));
        assert!(!scheduler.unregister(spot(2)));
    }

    #[test]
    fn test_unload_is_reentrant() {
        let mut scheduler = SelfTriggerScheduler::new();
        scheduler.register(spot(0)).unwrap();
        scheduler.register(spot(1)).unwrap();

        assert_eq!(scheduler.unload(), 2);
        assert_eq!(scheduler.unload(), 0);
        assert!(scheduler.is_empty());

        let mut calls = 0;
        scheduler.tick(|_| {
            calls += 1;
            ThinkOutcome::Thought
        });
        assert_eq!(calls, 0);
    }
}
