use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::context::Job;

/// Something due on the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheduled {
    /// Index into the session's system list.
    System(usize),
    Job(Job),
}

#[derive(Debug)]
struct Entry {
    due_ms: u64,
    seq: u64,
    item: Scheduled,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due_ms, self.seq).cmp(&(other.due_ms, other.seq))
    }
}

/// Min-heap of pending work keyed by due time. Items due at the same
/// instant run in insertion order.
#[derive(Debug, Default)]
pub struct Agenda {
    heap: BinaryHeap<Reverse<Entry>>,
    seq: u64,
}

impl Agenda {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, due_ms: u64, item: Scheduled) {
        self.seq += 1;
        self.heap.push(Reverse(Entry {
            due_ms,
            seq: self.seq,
            item,
        }));
    }

    pub fn next_due(&self) -> Option<u64> {
        self.heap.peek().map(|Reverse(e)| e.due_ms)
    }

    /// Pop the earliest item if it is due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(u64, Scheduled)> {
        if self.next_due()? > now_ms {
            return None;
        }
        self.heap.pop().map(|Reverse(e)| (e.due_ms, e.item))
    }

    /// Drop pending jobs, keeping system ticks.
    pub fn clear_jobs(&mut self) {
        let kept: Vec<_> = std::mem::take(&mut self.heap)
            .into_iter()
            .filter(|Reverse(e)| matches!(e.item, Scheduled::System(_)))
            .collect();
        self.heap = kept.into_iter().collect();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.heap.iter().filter_map(|Reverse(e)| match &e.item {
            Scheduled::Job(job) => Some(job),
            Scheduled::System(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NationId;

    #[test]
    fn pops_in_due_order_then_insertion_order() {
        let mut agenda = Agenda::new();
        agenda.push(50, Scheduled::System(1));
        agenda.push(10, Scheduled::System(2));
        agenda.push(50, Scheduled::System(3));
        assert_eq!(agenda.next_due(), Some(10));
        assert_eq!(agenda.pop_due(100), Some((10, Scheduled::System(2))));
        assert_eq!(agenda.pop_due(100), Some((50, Scheduled::System(1))));
        assert_eq!(agenda.pop_due(100), Some((50, Scheduled::System(3))));
        assert_eq!(agenda.pop_due(100), None);
    }

    #[test]
    fn nothing_pops_before_due() {
        let mut agenda = Agenda::new();
        agenda.push(500, Scheduled::System(0));
        assert_eq!(agenda.pop_due(499), None);
        assert_eq!(agenda.len(), 1);
    }

    #[test]
    fn clear_jobs_keeps_systems() {
        let mut agenda = Agenda::new();
        agenda.push(5, Scheduled::System(0));
        agenda.push(
            1,
            Scheduled::Job(Job::Succession {
                nation: NationId::Rex,
            }),
        );
        agenda.clear_jobs();
        assert_eq!(agenda.len(), 1);
        assert_eq!(agenda.jobs().count(), 0);
        assert_eq!(agenda.next_due(), Some(5));
    }
}
