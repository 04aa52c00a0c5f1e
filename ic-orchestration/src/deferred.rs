//! Tarefas adiadas
//!
//! Single-shot tasks that run on a later tick. Tasks cannot be cancelled;
//! whoever runs them checks that the placement still exists.

use ic_core::Location;

/// Tarefa adiada
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeferredTask {
    /// Bind the instance created at `location`, if the record there still
    /// carries `generation`
    Load { location: Location, generation: u64 },
}

/// Fila de tarefas por tick
#[derive(Debug, Default)]
pub struct DeferredQueue {
    tasks: Vec<(u64, DeferredTask)>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` to run on tick `due`.
    pub fn schedule(&mut self, due: u64, task: DeferredTask) {
        self.tasks.push((due, task));
    }

    /// Removes and returns every task due at or before `now`, in the order
    /// they were scheduled.
    pub fn take_due(&mut self, now: u64) -> Vec<DeferredTask> {
        let (due, pending): (Vec<_>, Vec<_>) = self.tasks.drain(..).partition(|(at, _)| *at <= now);
        self.tasks = pending;
        due.into_iter().map(|(_, task)| task).collect()
    }

    /// Earliest pending tick.
    pub fn next_due(&self) -> Option<u64> {
        self.tasks.iter().map(|(at, _)| *at).min()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}
