use chrono::Utc;
use indexmap::IndexMap;
use itertools::Itertools;
use model::{
    breach::{BreachEvent, Severity},
    location::Tourist,
    zone::{Zone, ZoneKind},
    DateTimeRange, WithId,
};
use schemars::JsonSchema;
use serde::Serialize;
use utility::id::Id;

use crate::{registry::ZoneRegistry, storage::Storage, Result};

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneOccupancy {
    pub zone_id: Id<Zone>,
    pub zone_name: String,
    pub kind: ZoneKind,
    pub samples: u64,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyReport {
    pub counts: Vec<ZoneOccupancy>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeverityCount {
    pub severity: Severity,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneBreachCounts {
    pub zone_id: Id<Zone>,
    pub total: u64,
    pub by_severity: Vec<SeverityCount>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BreachReport {
    pub counts: Vec<ZoneBreachCounts>,
    pub warnings: Vec<String>,
}

/// Read-side rollups over location and alert history. Never mutates core
/// state and never blocks ingestion: a malformed window degrades to an
/// empty report carrying a warning instead of an error.
pub struct AnalyticsAggregator<S: Storage> {
    store: S,
    registry: ZoneRegistry<S>,
}

impl<S: Storage> Clone for AnalyticsAggregator<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            registry: self.registry.clone(),
        }
    }
}

impl<S: Storage> AnalyticsAggregator<S> {
    pub fn new(store: S, registry: ZoneRegistry<S>) -> Self {
        Self { store, registry }
    }

    /// Zone occupancy counts over the window: how many samples fell inside
    /// each active zone.
    pub async fn occupancy(
        &self,
        window: DateTimeRange<Utc>,
        zone_filter: Option<&Id<Zone>>,
    ) -> Result<OccupancyReport> {
        if let Some(warning) = malformed_window(&window) {
            return Ok(OccupancyReport {
                counts: Vec::new(),
                warnings: vec![warning],
            });
        }

        let samples = self.store.samples_between(&window, None).await?;
        let zones = self
            .registry
            .list_active(None)
            .into_iter()
            .filter(|zone| zone_filter.map_or(true, |filter| zone.id == *filter))
            .collect::<Vec<_>>();

        let counts = zones
            .iter()
            .map(|zone| ZoneOccupancy {
                zone_id: zone.id.clone(),
                zone_name: zone.content.name.clone(),
                kind: zone.content.kind,
                samples: samples
                    .iter()
                    .filter(|sample| {
                        zone.content
                            .shape
                            .contains(sample.latitude, sample.longitude)
                    })
                    .count() as u64,
            })
            .collect();

        Ok(OccupancyReport {
            counts,
            warnings: Vec::new(),
        })
    }

    /// Breach counts over the window, grouped by zone and severity.
    pub async fn breach_summary(
        &self,
        window: DateTimeRange<Utc>,
        zone_filter: Option<&Id<Zone>>,
    ) -> Result<BreachReport> {
        if let Some(warning) = malformed_window(&window) {
            return Ok(BreachReport {
                counts: Vec::new(),
                warnings: vec![warning],
            });
        }

        let events = self
            .store
            .events_between(&window, None)
            .await?
            .into_iter()
            .filter(|event| zone_filter.map_or(true, |filter| event.zone_id == *filter))
            .collect::<Vec<_>>();

        let mut per_zone: IndexMap<Id<Zone>, IndexMap<Severity, u64>> =
            IndexMap::new();
        for event in events
            .iter()
            .sorted_by(|a, b| a.zone_id.cmp(&b.zone_id))
        {
            *per_zone
                .entry(event.zone_id.clone())
                .or_default()
                .entry(event.severity)
                .or_default() += 1;
        }

        let counts = per_zone
            .into_iter()
            .map(|(zone_id, mut by_severity)| {
                by_severity.sort_keys();
                ZoneBreachCounts {
                    zone_id,
                    total: by_severity.values().sum(),
                    by_severity: by_severity
                        .into_iter()
                        .map(|(severity, count)| SeverityCount { severity, count })
                        .collect(),
                }
            })
            .collect();

        Ok(BreachReport {
            counts,
            warnings: Vec::new(),
        })
    }

    /// Breach history of one tourist within the window, in event-id order.
    pub async fn tourist_history(
        &self,
        tourist: &Id<Tourist>,
        window: DateTimeRange<Utc>,
    ) -> Result<Vec<BreachEvent>> {
        if let Some(warning) = malformed_window(&window) {
            log::warn!("tourist history for '{}': {}", tourist, warning);
            return Ok(Vec::new());
        }
        Ok(self.store.events_between(&window, Some(tourist)).await?)
    }
}

fn malformed_window(window: &DateTimeRange<Utc>) -> Option<String> {
    if window.is_well_formed() {
        return None;
    }
    let warning = format!(
        "malformed time window: {} is after {}; returning an empty report",
        window.first, window.last
    );
    log::warn!("{}", warning);
    Some(warning)
}
