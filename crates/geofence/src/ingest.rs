use std::collections::{BTreeMap, HashMap};

use actors::{Actor, ActorRef, Handler, Message};
use async_trait::async_trait;
use model::{
    breach::BreachEvent,
    location::{LocationSample, Tourist},
    membership::MembershipState,
};
use schemars::JsonSchema;
use serde::Serialize;
use tokio::sync::Mutex;
use utility::id::Id;

use crate::{
    alerts::AlertSink,
    analytics::AnalyticsAggregator,
    breach::{self, ZoneInfo},
    membership::{compute_membership, MembershipTracker},
    registry::ZoneRegistry,
    storage::{Storage, StorageError},
    GeofenceError, Result,
};

#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// When true, samples for tourists without a membership state are
    /// rejected with `UnknownTourist`; use `register` to pre-create one.
    /// When false (the default), tourists are auto-registered by their
    /// first sample.
    pub require_registration: bool,
    /// Capacity of each tourist's mailbox. Senders await free space, so a
    /// backlogged tourist backpressures its own submissions; samples are
    /// never dropped.
    pub mailbox_capacity: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            require_registration: false,
            mailbox_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub accepted: bool,
    pub events: Vec<BreachEvent>,
}

/// The entry point of the engine. Every tourist gets one worker actor, so
/// samples for the same tourist are processed strictly one at a time in
/// submission order while different tourists proceed in parallel. That is
/// the only cross-sample ordering the engine guarantees.
pub struct IngestService<S: Storage> {
    store: S,
    registry: ZoneRegistry<S>,
    tracker: MembershipTracker<S>,
    sink: AlertSink<S>,
    analytics: AnalyticsAggregator<S>,
    config: IngestConfig,
    workers: Mutex<HashMap<Id<Tourist>, ActorRef<TouristWorker<S>>>>,
}

impl<S: Storage> IngestService<S> {
    /// Builds the engine on top of the given store and warms the zone
    /// snapshot.
    pub async fn new(store: S, config: IngestConfig) -> Result<Self> {
        let registry = ZoneRegistry::new(store.clone());
        registry.load().await?;
        let tracker = MembershipTracker::new(store.clone());
        let sink = AlertSink::new(store.clone());
        let analytics = AnalyticsAggregator::new(store.clone(), registry.clone());
        Ok(Self {
            store,
            registry,
            tracker,
            sink,
            analytics,
            config,
            workers: Mutex::new(HashMap::new()),
        })
    }

    pub fn registry(&self) -> &ZoneRegistry<S> {
        &self.registry
    }

    pub fn analytics(&self) -> &AnalyticsAggregator<S> {
        &self.analytics
    }

    /// Pre-registers a tourist (only required when
    /// `require_registration` is set).
    pub async fn register(&self, tourist: &Id<Tourist>) -> Result<()> {
        self.tracker.register(tourist).await
    }

    /// Alert replay for downstream consumers.
    pub async fn alerts_since(&self, cursor: u64) -> Result<Vec<BreachEvent>> {
        self.sink.list_since(cursor).await
    }

    /// Submits one location sample. Coordinate validation happens before
    /// anything is persisted; ordering violations are reported after the
    /// raw sample has been archived for audit.
    pub async fn submit(&self, sample: LocationSample) -> Result<SubmitOutcome> {
        sample.validate_coordinate()?;
        if self.config.require_registration
            && !self.tracker.is_known(&sample.tourist_id).await?
        {
            return Err(GeofenceError::UnknownTourist(sample.tourist_id));
        }

        let worker = self.worker(&sample.tourist_id).await;
        let events = worker.ask(ProcessSample(sample)).await??;
        Ok(SubmitOutcome {
            accepted: true,
            events,
        })
    }

    async fn worker(&self, tourist: &Id<Tourist>) -> ActorRef<TouristWorker<S>> {
        let mut workers = self.workers.lock().await;
        if let Some(worker) = workers.get(tourist) {
            return worker.clone();
        }
        let tourist_id = tourist.clone();
        let registry = self.registry.clone();
        let tracker = self.tracker.clone();
        let sink = self.sink.clone();
        let store = self.store.clone();
        let worker = actors::spawn(
            move || TouristWorker {
                tourist_id: tourist_id.clone(),
                registry: registry.clone(),
                tracker: tracker.clone(),
                sink: sink.clone(),
                store: store.clone(),
            },
            self.config.mailbox_capacity,
        );
        workers.insert(tourist.clone(), worker.clone());
        worker
    }
}

/// Serialized per-tourist pipeline: archive → order check → containment
/// scan → membership swap → diff → alert append.
struct TouristWorker<S: Storage> {
    tourist_id: Id<Tourist>,
    registry: ZoneRegistry<S>,
    tracker: MembershipTracker<S>,
    sink: AlertSink<S>,
    store: S,
}

impl<S: Storage> Actor for TouristWorker<S> {}

#[derive(Clone)]
struct ProcessSample(LocationSample);

impl Message for ProcessSample {
    type Response = Result<Vec<BreachEvent>>;
}

#[async_trait]
impl<S: Storage> Handler<ProcessSample> for TouristWorker<S> {
    async fn handle(&mut self, message: ProcessSample) -> Result<Vec<BreachEvent>> {
        self.process(message.0).await
    }
}

impl<S: Storage> TouristWorker<S> {
    async fn process(&self, sample: LocationSample) -> Result<Vec<BreachEvent>> {
        // user-submitted data is never dropped silently: the raw sample
        // goes to history before any ordering decision
        self.store.append_sample(sample.clone()).await?;

        let existing = self.tracker.get(&sample.tourist_id).await?;
        if let Some(state) = &existing {
            if sample.timestamp < state.last_timestamp {
                return Err(GeofenceError::OutOfOrderSample {
                    tourist_id: sample.tourist_id,
                    timestamp: sample.timestamp,
                    last_timestamp: state.last_timestamp,
                });
            }
        }

        let zones = self.registry.active_snapshot();
        let current = compute_membership(sample.latitude, sample.longitude, &zones);
        let new_state = MembershipState::new(current.clone(), sample.timestamp);
        let previous = self
            .tracker
            .update(&sample.tourist_id, new_state)
            .await?
            .map(|state| state.zones)
            .unwrap_or_default();

        let mut zone_info: BTreeMap<_, ZoneInfo> = zones
            .iter()
            .map(|zone| {
                (
                    zone.id.clone(),
                    ZoneInfo {
                        kind: zone.content.kind,
                        risk_level: zone.content.risk_level,
                    },
                )
            })
            .collect();
        // an exited zone can be missing from the snapshot if it was
        // deactivated between the two samples; classify it from storage
        for zone_id in previous.union(&current) {
            if zone_info.contains_key(zone_id) {
                continue;
            }
            match self.store.get_zone(zone_id).await {
                Ok(zone) => {
                    zone_info.insert(
                        zone_id.clone(),
                        ZoneInfo {
                            kind: zone.content.kind,
                            risk_level: zone.content.risk_level,
                        },
                    );
                }
                Err(StorageError::NotFound) => {
                    log::warn!(
                        "zone '{}' vanished from storage while processing \
                         tourist '{}'",
                        zone_id,
                        self.tourist_id
                    );
                }
                Err(why) => return Err(why.into()),
            }
        }

        let pending = breach::detect(
            &sample.tourist_id,
            &previous,
            &current,
            sample.timestamp,
            &zone_info,
        );
        self.sink.append(pending).await
    }
}
