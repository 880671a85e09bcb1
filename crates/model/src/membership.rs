use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::Id;

use crate::zone::Zone;

/// The set of zones a tourist currently occupies. Exactly one live state
/// per tourist; overwritten on each accepted sample, never appended.
/// Zone ids are kept sorted so membership diffs are deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipState {
    pub zones: BTreeSet<Id<Zone>>,
    pub last_timestamp: DateTime<Utc>,
}

impl MembershipState {
    pub fn new(zones: BTreeSet<Id<Zone>>, last_timestamp: DateTime<Utc>) -> Self {
        Self {
            zones,
            last_timestamp,
        }
    }

    pub fn empty(last_timestamp: DateTime<Utc>) -> Self {
        Self::new(BTreeSet::new(), last_timestamp)
    }

    pub fn occupies(&self, zone_id: &Id<Zone>) -> bool {
        self.zones.contains(zone_id)
    }
}
