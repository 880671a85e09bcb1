use std::{error, fmt, result};

use chrono::{DateTime, Utc};
use model::{
    location::Tourist,
    zone::{ShapeError, Zone},
};
use utility::{geo::InvalidCoordinate, id::Id};

pub mod alerts;
pub mod analytics;
pub mod breach;
pub mod ingest;
pub mod membership;
pub mod registry;
pub mod storage;

/// Error taxonomy of the engine. Validation errors are surfaced
/// synchronously to the submitting caller and are never retried.
#[derive(Debug)]
pub enum GeofenceError {
    /// Malformed latitude/longitude. Rejected, never clamped.
    InvalidCoordinate { latitude: f64, longitude: f64 },
    /// Zone failed shape validation at creation.
    InvalidZoneShape(ShapeError),
    /// Zone ids are immutable identifiers; collisions are rejected.
    DuplicateZone(Id<Zone>),
    /// Sample is older than the tourist's current membership state. The
    /// raw sample has already been archived; membership was not touched.
    OutOfOrderSample {
        tourist_id: Id<Tourist>,
        timestamp: DateTime<Utc>,
        last_timestamp: DateTime<Utc>,
    },
    /// Submission for an unregistered tourist while the registration
    /// policy requires pre-registration.
    UnknownTourist(Id<Tourist>),
    NotFound,
    /// The per-tourist worker is gone (stopped or shutting down).
    Worker(String),
    Storage(storage::StorageError),
}

pub type Result<T> = result::Result<T, GeofenceError>;

impl fmt::Display for GeofenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCoordinate {
                latitude,
                longitude,
            } => write!(
                f,
                "invalid coordinate: latitude {}, longitude {}",
                latitude, longitude
            ),
            Self::InvalidZoneShape(why) => write!(f, "invalid zone shape: {}", why),
            Self::DuplicateZone(id) => write!(f, "zone '{}' already exists", id),
            Self::OutOfOrderSample {
                tourist_id,
                timestamp,
                last_timestamp,
            } => write!(
                f,
                "out-of-order sample for tourist '{}': {} is older than {}",
                tourist_id, timestamp, last_timestamp
            ),
            Self::UnknownTourist(id) => {
                write!(f, "tourist '{}' is not registered", id)
            }
            Self::NotFound => write!(f, "not found"),
            Self::Worker(why) => write!(f, "tourist worker unavailable: {}", why),
            Self::Storage(why) => write!(f, "storage error: {}", why),
        }
    }
}

impl error::Error for GeofenceError {}

impl From<InvalidCoordinate> for GeofenceError {
    fn from(value: InvalidCoordinate) -> Self {
        Self::InvalidCoordinate {
            latitude: value.latitude,
            longitude: value.longitude,
        }
    }
}

impl From<ShapeError> for GeofenceError {
    fn from(value: ShapeError) -> Self {
        Self::InvalidZoneShape(value)
    }
}

impl From<storage::StorageError> for GeofenceError {
    fn from(value: storage::StorageError) -> Self {
        match value {
            storage::StorageError::NotFound => Self::NotFound,
            other => Self::Storage(other),
        }
    }
}

impl From<actors::ActorError> for GeofenceError {
    fn from(value: actors::ActorError) -> Self {
        Self::Worker(value.to_string())
    }
}
