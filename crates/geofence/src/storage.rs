use std::{error, fmt, result};

use async_trait::async_trait;
use chrono::Utc;
use model::{
    breach::{BreachEvent, PendingEvent},
    location::{LocationSample, Tourist},
    membership::MembershipState,
    zone::Zone,
    DateTimeRange, WithId,
};
use utility::id::Id;

#[derive(Debug)]
pub enum StorageError {
    NotFound,
    Duplicate,
    Other(Box<dyn error::Error + Send + Sync>),
}

impl StorageError {
    pub fn other<T: error::Error + Send + Sync + 'static>(why: T) -> Self {
        Self::Other(Box::new(why))
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Duplicate => write!(f, "duplicate key"),
            Self::Other(why) => write!(f, "{}", why),
        }
    }
}

impl error::Error for StorageError {}

pub type Result<T> = result::Result<T, StorageError>;

/// Zones: mutable only by admin action (create/deactivate), read on every
/// sample via the registry snapshot.
#[async_trait]
pub trait ZoneStore {
    /// Upsert; the registry decides whether an id collision is an error.
    async fn put_zone(&self, zone: WithId<Zone>) -> Result<()>;
    async fn get_zone(&self, id: &Id<Zone>) -> Result<WithId<Zone>>;
    /// All zones, active or not, for audit and snapshot rebuilds.
    async fn zones(&self) -> Result<Vec<WithId<Zone>>>;
}

/// Location history: append-only, never mutated or deleted.
#[async_trait]
pub trait SampleStore {
    async fn append_sample(&self, sample: LocationSample) -> Result<()>;
    async fn samples_between(
        &self,
        window: &DateTimeRange<Utc>,
        tourist: Option<&Id<Tourist>>,
    ) -> Result<Vec<LocationSample>>;
}

/// Latest-value membership per tourist, keyed by tourist id.
#[async_trait]
pub trait MembershipStore {
    async fn put_membership(
        &self,
        tourist: &Id<Tourist>,
        state: MembershipState,
    ) -> Result<()>;
    async fn get_membership(
        &self,
        tourist: &Id<Tourist>,
    ) -> Result<Option<MembershipState>>;
}

/// Append-only alert log. Event ids are assigned inside the append so two
/// concurrent appends can never hand out the same id, and id order always
/// matches append order.
#[async_trait]
pub trait AlertStore {
    async fn append_events(
        &self,
        pending: Vec<PendingEvent>,
    ) -> Result<Vec<BreachEvent>>;
    /// Events with an id strictly greater than the cursor.
    async fn events_since(&self, cursor: u64) -> Result<Vec<BreachEvent>>;
    async fn events_between(
        &self,
        window: &DateTimeRange<Utc>,
        tourist: Option<&Id<Tourist>>,
    ) -> Result<Vec<BreachEvent>>;
}

pub trait Storage:
    ZoneStore
    + SampleStore
    + MembershipStore
    + AlertStore
    + Clone
    + Send
    + Sync
    + 'static
{
}
