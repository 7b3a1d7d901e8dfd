//! Job history.
//!
//! Keeps the last four finished jobs in a fixed-capacity ring; the oldest
//! entry is dropped when a fifth arrives.

use heapless::Deque;

use crate::app::events::JobRecord;

const HISTORY_SLOTS: usize = 4;

#[derive(Default)]
pub struct JobHistory {
    entries: Deque<JobRecord, HISTORY_SLOTS>,
}

impl JobHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record`, evicting the oldest entry when full.
    pub fn push(&mut self, record: JobRecord) {
        if self.entries.is_full() {
            self.entries.pop_front();
        }
        // Cannot fail: a slot was freed above.
        let _ = self.entries.push_back(record);
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &JobRecord> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&JobRecord> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
