use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::KeyValueStore;
use crate::{ActivityLog, News, Participant, Stock, StoreError, SystemState, Trade};

/// Version written into every snapshot envelope.
pub const SCHEMA_VERSION: u32 = 1;

/// The persisted collections, under their stored key names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionName {
    Stocks,
    Participants,
    News,
    Trades,
    ActivityLogs,
    SystemState,
}

impl CollectionName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stocks => "stocks",
            Self::Participants => "participants",
            Self::News => "news",
            Self::Trades => "trades",
            Self::ActivityLogs => "activityLogs",
            Self::SystemState => "systemState",
        }
    }
}

impl Display for CollectionName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored envelope: `{"schema_version": 1, "records": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<P> {
    pub schema_version: u32,
    pub records: P,
}

#[derive(Deserialize)]
struct SnapshotHeader {
    schema_version: u32,
}

/// Whole-collection reads and writes of one payload type.
pub struct Repository<P> {
    store: Arc<dyn KeyValueStore>,
    collection: CollectionName,
    _payload: PhantomData<fn() -> P>,
}

impl<P> Clone for Repository<P> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            collection: self.collection,
            _payload: PhantomData,
        }
    }
}

impl<P> Repository<P>
where
    P: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn KeyValueStore>, collection: CollectionName) -> Self {
        Self {
            store,
            collection,
            _payload: PhantomData,
        }
    }

    pub fn collection(&self) -> CollectionName {
        self.collection
    }

    /// `Ok(None)` when nothing has been stored yet. Malformed JSON and
    /// unknown schema versions are reported as bad data
    /// (see [`StoreError::is_bad_data`]).
    pub fn load(&self) -> Result<Option<P>, StoreError> {
        let Some(raw) = self.store.get(self.collection.as_str())? else {
            return Ok(None);
        };

        let header: SnapshotHeader =
            serde_json::from_str(&raw).map_err(|source| self.malformed(source))?;
        if header.schema_version != SCHEMA_VERSION {
            return Err(StoreError::UnsupportedSchemaVersion {
                collection: self.collection.as_str(),
                found: header.schema_version,
                expected: SCHEMA_VERSION,
            });
        }

        let snapshot: Snapshot<P> =
            serde_json::from_str(&raw).map_err(|source| self.malformed(source))?;
        Ok(Some(snapshot.records))
    }

    pub fn save(&self, records: &P) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&Snapshot {
            schema_version: SCHEMA_VERSION,
            records,
        })?;
        self.store.set(self.collection.as_str(), &payload)?;
        Ok(())
    }

    fn malformed(&self, source: serde_json::Error) -> StoreError {
        StoreError::Malformed {
            collection: self.collection.as_str(),
            source,
        }
    }
}

/// One repository per collection over a shared store.
#[derive(Clone)]
pub struct Repositories {
    pub stocks: Repository<Vec<Stock>>,
    pub participants: Repository<Vec<Participant>>,
    pub news: Repository<Vec<News>>,
    pub trades: Repository<Vec<Trade>>,
    pub activity: Repository<Vec<ActivityLog>>,
    pub system: Repository<SystemState>,
}

impl Repositories {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            stocks: Repository::new(Arc::clone(&store), CollectionName::Stocks),
            participants: Repository::new(Arc::clone(&store), CollectionName::Participants),
            news: Repository::new(Arc::clone(&store), CollectionName::News),
            trades: Repository::new(Arc::clone(&store), CollectionName::Trades),
            activity: Repository::new(Arc::clone(&store), CollectionName::ActivityLogs),
            system: Repository::new(store, CollectionName::SystemState),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::{SystemStatus, UtcDateTime};

    fn system_repo(store: Arc<MemoryStore>) -> Repository<SystemState> {
        Repository::new(store, CollectionName::SystemState)
    }

    #[test]
    fn missing_collection_loads_as_none() {
        let repo = system_repo(Arc::new(MemoryStore::new()));
        assert!(repo.load().expect("load").is_none());
    }

    #[test]
    fn saved_snapshot_is_enveloped_and_rehydrated() {
        let store = Arc::new(MemoryStore::new());
        let repo = system_repo(Arc::clone(&store));
        let state = SystemState {
            last_reset: UtcDateTime::parse("2025-02-01T12:00:00Z").expect("ts"),
            total_users: 20,
            total_trades: 3,
            status: SystemStatus::Maintenance,
        };
        repo.save(&state).expect("save");

        let raw = store.get("systemState").expect("get").expect("stored");
        assert!(raw.starts_with(r#"{"schema_version":1,"records":"#));
        assert_eq!(repo.load().expect("load"), Some(state));
    }

    #[test]
    fn unknown_schema_version_is_bad_data() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("systemState", r#"{"schema_version":2,"records":{}}"#)
            .expect("set");
        let err = system_repo(store).load().expect_err("must fail");
        assert!(err.is_bad_data());
        assert!(matches!(
            err,
            StoreError::UnsupportedSchemaVersion { found: 2, .. }
        ));
    }

    #[test]
    fn garbage_is_bad_data() {
        let store = Arc::new(MemoryStore::new());
        store.set("systemState", "not json").expect("set");
        let err = system_repo(store).load().expect_err("must fail");
        assert!(matches!(err, StoreError::Malformed { collection: "systemState", .. }));
    }
}
