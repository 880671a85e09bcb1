use std::sync::{Arc, RwLock};

use model::{
    zone::{Zone, ZoneKind},
    WithId,
};
use utility::id::Id;

use crate::{
    storage::{Storage, StorageError},
    GeofenceError, Result,
};

/// Holds the current zone set. Admin writes go through storage and then
/// swap a copy-on-write snapshot of the active zones, so the per-sample
/// containment scan only ever clones an `Arc` and never waits on a write
/// beyond the swap itself.
pub struct ZoneRegistry<S: Storage> {
    inner: Arc<Inner<S>>,
}

struct Inner<S> {
    store: S,
    active: RwLock<Arc<Vec<WithId<Zone>>>>,
}

impl<S: Storage> Clone for ZoneRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: Storage> ZoneRegistry<S> {
    pub fn new(store: S) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                active: RwLock::new(Arc::new(Vec::new())),
            }),
        }
    }

    /// Warms the snapshot from storage. Called once at service start.
    pub async fn load(&self) -> Result<()> {
        self.refresh().await
    }

    pub async fn create(&self, id: Id<Zone>, zone: Zone) -> Result<WithId<Zone>> {
        zone.validate()?;
        match self.inner.store.get_zone(&id).await {
            Ok(_) => return Err(GeofenceError::DuplicateZone(id)),
            Err(StorageError::NotFound) => {}
            Err(why) => return Err(why.into()),
        }
        let entry = WithId::new(id, zone);
        self.inner.store.put_zone(entry.clone()).await?;
        self.refresh().await?;
        Ok(entry)
    }

    /// Lookup by id, inactive zones included (they are retained for audit).
    pub async fn get(&self, id: &Id<Zone>) -> Result<WithId<Zone>> {
        Ok(self.inner.store.get_zone(id).await?)
    }

    pub async fn list(
        &self,
        kind: Option<ZoneKind>,
        include_inactive: bool,
    ) -> Result<Vec<WithId<Zone>>> {
        let mut zones = self.inner.store.zones().await?;
        zones.retain(|zone| {
            (include_inactive || zone.content.active)
                && kind.map_or(true, |kind| zone.content.kind == kind)
        });
        zones.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(zones)
    }

    /// Marks a zone inactive; it is excluded from evaluation but kept in
    /// storage. Idempotent for already inactive zones.
    pub async fn deactivate(&self, id: &Id<Zone>) -> Result<WithId<Zone>> {
        let mut entry = self.inner.store.get_zone(id).await?;
        if entry.content.active {
            entry.content.active = false;
            self.inner.store.put_zone(entry.clone()).await?;
            self.refresh().await?;
        }
        Ok(entry)
    }

    /// The current active-zone snapshot; the per-sample scan iterates this.
    pub fn active_snapshot(&self) -> Arc<Vec<WithId<Zone>>> {
        self.inner
            .active
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn list_active(&self, kind: Option<ZoneKind>) -> Vec<WithId<Zone>> {
        self.active_snapshot()
            .iter()
            .filter(|zone| kind.map_or(true, |kind| zone.content.kind == kind))
            .cloned()
            .collect()
    }

    async fn refresh(&self) -> Result<()> {
        let mut active = self.inner.store.zones().await?;
        active.retain(|zone| zone.content.active);
        active.sort_by(|a, b| a.id.cmp(&b.id));
        let snapshot = Arc::new(active);
        let mut guard = self
            .inner
            .active
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = snapshot;
        Ok(())
    }
}
