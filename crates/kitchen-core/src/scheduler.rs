//! Cancellable timer tasks.
//!
//! A [`Scheduler`] holds continuations due at a future tick. Each task lives
//! in a slotmap arena, so a cancelled [`TaskId`] goes stale and can never
//! fire. Tasks due on the same tick fire in scheduling order.

use crate::fixed::Ticks;
use crate::id::TaskId;
use slotmap::SlotMap;

#[derive(Debug, Clone)]
struct Scheduled<T> {
    due: Ticks,
    seq: u64,
    task: T,
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    tasks: SlotMap<TaskId, Scheduled<T>>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            tasks: SlotMap::with_key(),
            next_seq: 0,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Ticks, task: T) -> TaskId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.insert(Scheduled { due, seq, task })
    }

    /// Cancel a task. Cancelling a fired or already-cancelled task is a no-op.
    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        self.tasks.remove(id).map(|s| s.task)
    }

    /// Cancel every task matching `pred`. Returns how many were dropped.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|_, s| !pred(&s.task));
        before - self.tasks.len()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Remove and return every task due at or before `now`, ordered by due
    /// tick then scheduling order.
    pub fn drain_due(&mut self, now: Ticks) -> Vec<(TaskId, T)> {
        let mut due: Vec<(Ticks, u64, TaskId)> = self
            .tasks
            .iter()
            .filter(|(_, s)| s.due <= now)
            .map(|(id, s)| (s.due, s.seq, id))
            .collect();
        due.sort_unstable_by_key(|&(at, seq, _)| (at, seq));
        due.into_iter()
            .filter_map(|(_, _, id)| self.tasks.remove(id).map(|s| (id, s.task)))
            .collect()
    }

    pub fn due_at(&self, id: TaskId) -> Option<Ticks> {
        self.tasks.get(id).map(|s| s.due)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TaskId, Ticks, &T)> {
        self.tasks.iter().map(|(id, s)| (id, s.due, &s.task))
    }
}
