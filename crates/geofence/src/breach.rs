use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use model::{
    breach::{PendingEvent, Severity, Transition},
    location::Tourist,
    zone::{RiskLevel, Zone, ZoneKind},
};
use utility::id::Id;

/// Classification data the detector needs per zone.
#[derive(Debug, Clone, Copy)]
pub struct ZoneInfo {
    pub kind: ZoneKind,
    pub risk_level: Option<RiskLevel>,
}

/// Diffs two membership sets into transition events.
///
/// `exited = previous − current`, `entered = current − previous`; zones in
/// both sets (continued occupancy) emit nothing. Emission order is fixed
/// for determinism: all exits first, then all entries, each ascending by
/// zone id (the sets are ordered, so the differences already are).
///
/// Severity: safe-zone entries and every exit are `Low`; restricted-zone
/// entries carry the zone's configured risk level.
pub fn detect(
    tourist_id: &Id<Tourist>,
    previous: &BTreeSet<Id<Zone>>,
    current: &BTreeSet<Id<Zone>>,
    sample_timestamp: DateTime<Utc>,
    zone_info: &BTreeMap<Id<Zone>, ZoneInfo>,
) -> Vec<PendingEvent> {
    let mut events = Vec::new();

    for zone_id in previous.difference(current) {
        let Some(info) = lookup(zone_info, zone_id, tourist_id) else {
            continue;
        };
        events.push(PendingEvent {
            tourist_id: tourist_id.clone(),
            zone_id: zone_id.clone(),
            zone_kind: info.kind,
            transition: Transition::Exited,
            severity: Severity::Low,
            sample_timestamp,
        });
    }

    for zone_id in current.difference(previous) {
        let Some(info) = lookup(zone_info, zone_id, tourist_id) else {
            continue;
        };
        let severity = match info.kind {
            ZoneKind::Safe => Severity::Low,
            // risk level presence is enforced at zone creation
            ZoneKind::Restricted => info
                .risk_level
                .map(Severity::from)
                .unwrap_or(Severity::Low),
        };
        events.push(PendingEvent {
            tourist_id: tourist_id.clone(),
            zone_id: zone_id.clone(),
            zone_kind: info.kind,
            transition: Transition::Entered,
            severity,
            sample_timestamp,
        });
    }

    events
}

fn lookup<'a>(
    zone_info: &'a BTreeMap<Id<Zone>, ZoneInfo>,
    zone_id: &Id<Zone>,
    tourist_id: &Id<Tourist>,
) -> Option<&'a ZoneInfo> {
    let info = zone_info.get(zone_id);
    if info.is_none() {
        log::warn!(
            "no zone info for '{}' while diffing membership of tourist '{}'; \
             skipping its transition event",
            zone_id,
            tourist_id
        );
    }
    info
}
