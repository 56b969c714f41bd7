//! Activity log: newest-first, capped at `MAX_ACTIVITIES` records.

use crate::error::{StoreError, StoreResult};
use crate::storage::Storage;
use crate::store::{self, Collection, RecordStore};
use chrono::Duration;
use std::sync::Arc;
use tracker_types::{Activity, ActivityCollection, ActivityKind, CreateActivityRequest, Timestamp};

/// Oldest activities past this count are dropped on append.
pub const MAX_ACTIVITIES: usize = 1000;

/// Window used by `GET /api/activities/recent`.
pub fn recent_window() -> Duration {
    Duration::hours(24)
}

impl Collection for ActivityCollection {
    const NAME: &'static str = "activities";

    fn max_id(&self) -> Option<u64> {
        self.activities
            .iter()
            .filter_map(|a| store::numeric_id(&a.id))
            .max()
    }
}

pub struct ActivityLog {
    store: RecordStore<ActivityCollection>,
}

impl ActivityLog {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            store: RecordStore::new(storage),
        }
    }

    pub fn store(&self) -> &RecordStore<ActivityCollection> {
        &self.store
    }

    /// Record a new activity at the head of the log.
    pub fn append(&self, request: CreateActivityRequest) -> StoreResult<Activity> {
        let kind = non_empty(request.kind);
        let title = non_empty(request.title);
        let (kind, title) = match (kind, title) {
            (Some(kind), Some(title)) => (kind, title),
            _ => return Err(StoreError::validation("type and title are required")),
        };

        self.store.mutate(|state| {
            let now = store::now();
            let activity = Activity {
                id: store::next_id(state.max_id(), now)?,
                timestamp: now,
                kind: ActivityKind::from(kind),
                title,
                description: request.description.unwrap_or_default(),
                tags: request.tags.unwrap_or_default(),
            };

            state.activities.insert(0, activity.clone());
            state.stats.total_activities += 1;
            state.stats.last_update = Some(now);
            state.activities.truncate(MAX_ACTIVITIES);

            Ok(activity)
        })
    }

    /// The whole log with its stats, newest first.
    pub fn list_all(&self) -> StoreResult<ActivityCollection> {
        self.store.load()
    }

    /// Activities strictly newer than `now - window`.
    pub fn list_recent(&self, window: Duration) -> StoreResult<Vec<Activity>> {
        self.list_recent_at(window, store::now())
    }

    fn list_recent_at(&self, window: Duration, now: Timestamp) -> StoreResult<Vec<Activity>> {
        let cutoff = now - window;
        Ok(self
            .store
            .load()?
            .activities
            .into_iter()
            .filter(|a| a.timestamp > cutoff)
            .collect())
    }
}

/// Trimmed-empty strings count as missing.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
