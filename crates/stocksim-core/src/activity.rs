//! Bounded, most-recent-first activity journal.

use crate::ports::IdGenerator;
use crate::{ActivityCategory, ActivityId, ActivityLog, UtcDateTime};

/// Entries beyond this count are dropped from the tail.
pub const ACTIVITY_JOURNAL_CAP: usize = 1_000;

/// User id recorded for entries the simulation writes on its own behalf.
pub const SYSTEM_ACTOR: &str = "system";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityJournal {
    entries: Vec<ActivityLog>,
}

impl ActivityJournal {
    pub fn new(mut entries: Vec<ActivityLog>) -> Self {
        entries.truncate(ACTIVITY_JOURNAL_CAP);
        Self { entries }
    }

    pub fn entries(&self) -> &[ActivityLog] {
        &self.entries
    }

    pub(crate) fn as_vec(&self) -> &Vec<ActivityLog> {
        &self.entries
    }

    pub fn recent(&self, limit: usize) -> &[ActivityLog] {
        &self.entries[..limit.min(self.entries.len())]
    }

    pub fn append(
        &mut self,
        user_id: impl Into<String>,
        action: impl Into<String>,
        details: impl Into<String>,
        category: ActivityCategory,
        now: UtcDateTime,
        ids: &dyn IdGenerator,
    ) -> &ActivityLog {
        self.entries.insert(
            0,
            ActivityLog {
                id: ActivityId::new(ids.next_id()),
                user_id: user_id.into(),
                action: action.into(),
                details: details.into(),
                timestamp: now,
                category,
            },
        );
        self.entries.truncate(ACTIVITY_JOURNAL_CAP);
        &self.entries[0]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
