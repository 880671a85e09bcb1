use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::Utc;
use geofence::storage::{
    AlertStore, MembershipStore, Result, SampleStore, Storage, StorageError,
    ZoneStore,
};
use model::{
    breach::{BreachEvent, PendingEvent},
    location::{LocationSample, Tourist},
    membership::MembershipState,
    zone::Zone,
    DateTimeRange, WithId,
};
use utility::id::Id;

/// In-memory implementation of the storage traits: the durable-store
/// stand-in behind the engine. Four collections, mirroring the persisted
/// layout: zones (admin-mutable), location samples (append-only),
/// membership (latest value per tourist), breach events (append-only).
///
/// Event ids are assigned under the event collection's lock, so concurrent
/// appends always produce a strictly increasing, gap-free sequence whose
/// order matches the append order. No lock is ever held across an await.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

struct Inner {
    zones: Mutex<HashMap<String, WithId<Zone>>>,
    samples: Mutex<Vec<LocationSample>>,
    membership: Mutex<HashMap<String, MembershipState>>,
    events: Mutex<EventLog>,
}

#[derive(Default)]
struct EventLog {
    next_id: u64,
    entries: Vec<BreachEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                zones: Mutex::new(HashMap::new()),
                samples: Mutex::new(Vec::new()),
                membership: Mutex::new(HashMap::new()),
                events: Mutex::new(EventLog {
                    next_id: 1,
                    entries: Vec::new(),
                }),
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ZoneStore for MemoryStore {
    async fn put_zone(&self, zone: WithId<Zone>) -> Result<()> {
        lock(&self.inner.zones).insert(zone.id.raw(), zone);
        Ok(())
    }

    async fn get_zone(&self, id: &Id<Zone>) -> Result<WithId<Zone>> {
        lock(&self.inner.zones)
            .get(id.raw_ref::<str>())
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn zones(&self) -> Result<Vec<WithId<Zone>>> {
        Ok(lock(&self.inner.zones).values().cloned().collect())
    }
}

#[async_trait]
impl SampleStore for MemoryStore {
    async fn append_sample(&self, sample: LocationSample) -> Result<()> {
        lock(&self.inner.samples).push(sample);
        Ok(())
    }

    async fn samples_between(
        &self,
        window: &DateTimeRange<Utc>,
        tourist: Option<&Id<Tourist>>,
    ) -> Result<Vec<LocationSample>> {
        Ok(lock(&self.inner.samples)
            .iter()
            .filter(|sample| {
                window.contains(&sample.timestamp)
                    && tourist.map_or(true, |tourist| sample.tourist_id == *tourist)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MembershipStore for MemoryStore {
    async fn put_membership(
        &self,
        tourist: &Id<Tourist>,
        state: MembershipState,
    ) -> Result<()> {
        lock(&self.inner.membership).insert(tourist.raw(), state);
        Ok(())
    }

    async fn get_membership(
        &self,
        tourist: &Id<Tourist>,
    ) -> Result<Option<MembershipState>> {
        Ok(lock(&self.inner.membership)
            .get(tourist.raw_ref::<str>())
            .cloned())
    }
}

#[async_trait]
impl AlertStore for MemoryStore {
    async fn append_events(
        &self,
        pending: Vec<PendingEvent>,
    ) -> Result<Vec<BreachEvent>> {
        let mut log = lock(&self.inner.events);
        let mut stamped = Vec::with_capacity(pending.len());
        for event in pending {
            let event_id = log.next_id;
            log.next_id += 1;
            let event = event.stamped(event_id);
            log.entries.push(event.clone());
            stamped.push(event);
        }
        Ok(stamped)
    }

    async fn events_since(&self, cursor: u64) -> Result<Vec<BreachEvent>> {
        Ok(lock(&self.inner.events)
            .entries
            .iter()
            .filter(|event| event.event_id > cursor)
            .cloned()
            .collect())
    }

    async fn events_between(
        &self,
        window: &DateTimeRange<Utc>,
        tourist: Option<&Id<Tourist>>,
    ) -> Result<Vec<BreachEvent>> {
        Ok(lock(&self.inner.events)
            .entries
            .iter()
            .filter(|event| {
                window.contains(&event.sample_timestamp)
                    && tourist.map_or(true, |tourist| event.tourist_id == *tourist)
            })
            .cloned()
            .collect())
    }
}

impl Storage for MemoryStore {}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use model::{
        breach::{Severity, Transition},
        zone::ZoneKind,
    };

    use super::*;

    fn pending(tourist: &str, zone: &str) -> PendingEvent {
        PendingEvent {
            tourist_id: Id::from(tourist),
            zone_id: Id::from(zone),
            zone_kind: ZoneKind::Safe,
            transition: Transition::Entered,
            severity: Severity::Low,
            sample_timestamp: Utc.with_ymd_and_hms(2025, 7, 1, 9, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn event_ids_are_strictly_increasing() {
        let store = MemoryStore::new();
        let first = store
            .append_events(vec![pending("t1", "a"), pending("t1", "b")])
            .await
            .unwrap();
        let second = store.append_events(vec![pending("t2", "a")]).await.unwrap();

        assert_eq!(
            first.iter().map(|e| e.event_id).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(second[0].event_id, 3);
    }

    #[tokio::test]
    async fn concurrent_appends_never_duplicate_ids() {
        let store = MemoryStore::new();
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append_events(vec![pending(&format!("t{i}"), "z")])
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut ids = store
            .events_since(0)
            .await
            .unwrap()
            .iter()
            .map(|event| event.event_id)
            .collect::<Vec<_>>();
        assert_eq!(ids.len(), 16);
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 16, "duplicate event ids");
        assert_eq!(*ids.first().unwrap(), 1);
        assert_eq!(*ids.last().unwrap(), 16);
    }

    #[tokio::test]
    async fn replay_cursor_is_exclusive() {
        let store = MemoryStore::new();
        store
            .append_events(vec![pending("t1", "a"), pending("t1", "b")])
            .await
            .unwrap();

        let replayed = store.events_since(1).await.unwrap();
        assert_eq!(replayed.len(), 1);
        assert_eq!(replayed[0].event_id, 2);
        assert!(store.events_since(2).await.unwrap().is_empty());
    }
}
