use chrono::{DateTime, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::Id;

use crate::{
    location::Tourist,
    zone::{RiskLevel, Zone, ZoneKind},
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Entered,
    Exited,
}

/// Risk classification attached to a breach event. Safe-zone entries and
/// all exits are informational (`Low`); restricted-zone entries carry the
/// zone's configured risk level.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl From<RiskLevel> for Severity {
    fn from(value: RiskLevel) -> Self {
        match value {
            RiskLevel::Low => Severity::Low,
            RiskLevel::Medium => Severity::Medium,
            RiskLevel::High => Severity::High,
            RiskLevel::Critical => Severity::Critical,
        }
    }
}

/// One detected membership transition, stamped with its log position.
/// Immutable once appended to the alert sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BreachEvent {
    pub event_id: u64,
    pub tourist_id: Id<Tourist>,
    pub zone_id: Id<Zone>,
    pub zone_kind: ZoneKind,
    pub transition: Transition,
    pub severity: Severity,
    pub sample_timestamp: DateTime<Utc>,
}

/// A detected transition that has not been appended yet. The alert sink
/// assigns the event id at append time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingEvent {
    pub tourist_id: Id<Tourist>,
    pub zone_id: Id<Zone>,
    pub zone_kind: ZoneKind,
    pub transition: Transition,
    pub severity: Severity,
    pub sample_timestamp: DateTime<Utc>,
}

impl PendingEvent {
    pub fn stamped(self, event_id: u64) -> BreachEvent {
        BreachEvent {
            event_id,
            tourist_id: self.tourist_id,
            zone_id: self.zone_id,
            zone_kind: self.zone_kind,
            transition: self.transition,
            severity: self.severity,
            sample_timestamp: self.sample_timestamp,
        }
    }
}

impl crate::ExampleData for BreachEvent {
    fn example_data() -> Self {
        BreachEvent {
            event_id: 1,
            tourist_id: Id::from("tourist-42"),
            zone_id: Id::from("old-quarry"),
            zone_kind: ZoneKind::Restricted,
            transition: Transition::Entered,
            severity: Severity::High,
            sample_timestamp: Utc.with_ymd_and_hms(2025, 7, 1, 9, 15, 0).unwrap(),
        }
    }
}
