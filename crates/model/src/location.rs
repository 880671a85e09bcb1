use chrono::{DateTime, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::{
    geo::{self, InvalidCoordinate},
    id::{HasId, Id},
};

use crate::ExampleData;

/// Marker type for tourists; only the typed id is used by the engine.
/// Profile data lives with the registration collaborator.
#[derive(Debug, Clone, JsonSchema)]
pub struct Tourist;

impl HasId for Tourist {
    type IdType = String;
}

/// One GPS observation. Immutable once recorded; history is append-only
/// per tourist.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationSample {
    pub tourist_id: Id<Tourist>,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: Option<f64>,
    pub battery_pct: Option<f64>,
}

impl LocationSample {
    pub fn validate_coordinate(&self) -> Result<(), InvalidCoordinate> {
        geo::validate_coordinate(self.latitude, self.longitude)
    }
}

impl ExampleData for LocationSample {
    fn example_data() -> Self {
        LocationSample {
            tourist_id: Id::from("tourist-42"),
            timestamp: Utc.with_ymd_and_hms(2025, 7, 1, 9, 15, 0).unwrap(),
            latitude: 17.2403,
            longitude: 78.4294,
            accuracy_m: Some(12.0),
            battery_pct: Some(81.0),
        }
    }
}
