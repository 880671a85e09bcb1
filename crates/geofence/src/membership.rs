use std::{
    collections::{BTreeSet, HashMap},
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};
use model::{
    location::Tourist,
    membership::MembershipState,
    zone::Zone,
    WithId,
};
use utility::id::Id;

use crate::{storage::Storage, Result};

/// Containment scan over the active zones. O(zones) per sample, which is
/// fine for the expected tens of zones; a spatial index would slot in here
/// if that ever changes.
pub fn compute_membership(
    latitude: f64,
    longitude: f64,
    zones: &[WithId<Zone>],
) -> BTreeSet<Id<Zone>> {
    zones
        .iter()
        .filter(|zone| {
            zone.content.active && zone.content.shape.contains(latitude, longitude)
        })
        .map(|zone| zone.id.clone())
        .collect()
}

/// Owns the live membership state per tourist and mirrors the latest value
/// into storage. No other component mutates membership.
///
/// The atomic swap in `update` is the correctness primitive for breach
/// detection: the detector always diffs against a real prior state, never
/// a partially updated one. Per-tourist write serialization is provided by
/// the ingest workers; this map only has to make the swap itself atomic.
pub struct MembershipTracker<S: Storage> {
    store: S,
    states: Arc<Mutex<HashMap<Id<Tourist>, MembershipState>>>,
}

impl<S: Storage> Clone for MembershipTracker<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            states: self.states.clone(),
        }
    }
}

impl<S: Storage> MembershipTracker<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            states: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Current state, hydrating from storage on first contact after a
    /// restart.
    pub async fn get(&self, tourist: &Id<Tourist>) -> Result<Option<MembershipState>> {
        if let Some(state) = self.lock().get(tourist).cloned() {
            return Ok(Some(state));
        }
        Ok(self.store.get_membership(tourist).await?)
    }

    pub async fn is_known(&self, tourist: &Id<Tourist>) -> Result<bool> {
        Ok(self.get(tourist).await?.is_some())
    }

    /// Pre-creates an empty membership for the tourist. Used by the
    /// require-registration policy; a no-op if the tourist already exists.
    pub async fn register(&self, tourist: &Id<Tourist>) -> Result<()> {
        if self.is_known(tourist).await? {
            return Ok(());
        }
        let state = MembershipState::empty(DateTime::<Utc>::MIN_UTC);
        self.lock().insert(tourist.clone(), state.clone());
        self.store.put_membership(tourist, state).await?;
        Ok(())
    }

    /// Atomically replaces the stored membership and returns what was
    /// replaced (`None` on a tourist's first sample).
    pub async fn update(
        &self,
        tourist: &Id<Tourist>,
        new_state: MembershipState,
    ) -> Result<Option<MembershipState>> {
        // hydrate outside the lock; the per-tourist worker is the only
        // writer for this key, so the read can not race a swap
        let stored = if self.lock().contains_key(tourist) {
            None
        } else {
            self.store.get_membership(tourist).await?
        };
        let previous = {
            let mut states = self.lock();
            states
                .insert(tourist.clone(), new_state.clone())
                .or(stored)
        };
        self.store.put_membership(tourist, new_state).await?;
        Ok(previous)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Id<Tourist>, MembershipState>> {
        self.states
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
