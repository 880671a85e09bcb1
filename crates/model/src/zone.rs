use std::{error, fmt};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::{
    geo::{self, InvalidCoordinate},
    id::HasId,
};

use crate::ExampleData;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn validate(&self) -> Result<(), InvalidCoordinate> {
        geo::validate_coordinate(self.latitude, self.longitude)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Safe,
    Restricted,
}

/// Configured risk of a restricted zone. Entry severity is derived
/// directly from it.
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
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Zone geometry as a tagged union. Adding a new shape means a new
/// variant here plus one containment arm below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ZoneShape {
    Circle {
        center: GeoPoint,
        radius_m: f64,
    },
    /// Closed ring of vertices; the closing edge back to the first vertex
    /// is implicit and must not be repeated.
    Polygon {
        ring: Vec<GeoPoint>,
    },
}

impl ZoneShape {
    /// Containment test for an already validated coordinate.
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        match self {
            ZoneShape::Circle { center, radius_m } => geo::point_in_circle(
                latitude,
                longitude,
                center.latitude,
                center.longitude,
                *radius_m,
            ),
            ZoneShape::Polygon { ring } => {
                let coords = ring
                    .iter()
                    .map(|vertex| (vertex.latitude, vertex.longitude))
                    .collect::<Vec<_>>();
                geo::point_in_polygon(latitude, longitude, &coords)
            }
        }
    }

    pub fn validate(&self) -> Result<(), ShapeError> {
        match self {
            ZoneShape::Circle { center, radius_m } => {
                center.validate().map_err(ShapeError::InvalidVertex)?;
                if !radius_m.is_finite() || *radius_m <= 0.0 {
                    return Err(ShapeError::NonPositiveRadius(*radius_m));
                }
                Ok(())
            }
            ZoneShape::Polygon { ring } => {
                if ring.len() < 3 {
                    return Err(ShapeError::TooFewVertices(ring.len()));
                }
                for vertex in ring {
                    vertex.validate().map_err(ShapeError::InvalidVertex)?;
                }
                let coords = ring
                    .iter()
                    .map(|vertex| (vertex.latitude, vertex.longitude))
                    .collect::<Vec<_>>();
                if geo::ring_self_intersects(&coords) {
                    return Err(ShapeError::SelfIntersecting);
                }
                if geo::ring_area_deg2(&coords) == 0.0 {
                    return Err(ShapeError::ZeroArea);
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeError {
    TooFewVertices(usize),
    SelfIntersecting,
    ZeroArea,
    NonPositiveRadius(f64),
    InvalidVertex(InvalidCoordinate),
    MissingRiskLevel,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewVertices(count) => {
                write!(f, "polygon needs at least 3 vertices, got {}", count)
            }
            Self::SelfIntersecting => write!(f, "polygon ring self-intersects"),
            Self::ZeroArea => write!(f, "polygon ring has zero area"),
            Self::NonPositiveRadius(radius) => {
                write!(f, "circle radius must be positive, got {}", radius)
            }
            Self::InvalidVertex(why) => write!(f, "{}", why),
            Self::MissingRiskLevel => {
                write!(f, "restricted zones require a risk level")
            }
        }
    }
}

impl error::Error for ShapeError {}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub name: String,
    pub kind: ZoneKind,
    pub shape: ZoneShape,
    /// Informational tag (airport, police_station, crime_prone, ...).
    /// Does not affect containment.
    pub category: Option<String>,
    pub risk_level: Option<RiskLevel>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Zone {
    pub fn validate(&self) -> Result<(), ShapeError> {
        self.shape.validate()?;
        if self.kind == ZoneKind::Restricted && self.risk_level.is_none() {
            return Err(ShapeError::MissingRiskLevel);
        }
        Ok(())
    }
}

impl HasId for Zone {
    type IdType = String;
}

impl ExampleData for Zone {
    fn example_data() -> Self {
        Zone {
            name: "Charminar old town".to_owned(),
            kind: ZoneKind::Safe,
            shape: ZoneShape::Circle {
                center: GeoPoint::new(17.3616, 78.4747),
                radius_m: 2_000.0,
            },
            category: Some("heritage".to_owned()),
            risk_level: None,
            active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_ring() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(17.0, 78.0),
            GeoPoint::new(17.0, 78.1),
            GeoPoint::new(17.1, 78.1),
            GeoPoint::new(17.1, 78.0),
        ]
    }

    #[test]
    fn valid_shapes_pass() {
        assert!(ZoneShape::Circle {
            center: GeoPoint::new(17.0, 78.0),
            radius_m: 100.0,
        }
        .validate()
        .is_ok());
        assert!(ZoneShape::Polygon { ring: square_ring() }.validate().is_ok());
    }

    #[test]
    fn circle_rejects_bad_radius() {
        for radius_m in [0.0, -5.0, f64::NAN] {
            let shape = ZoneShape::Circle {
                center: GeoPoint::new(17.0, 78.0),
                radius_m,
            };
            assert!(matches!(
                shape.validate(),
                Err(ShapeError::NonPositiveRadius(_))
            ));
        }
    }

    #[test]
    fn polygon_rejects_malformed_rings() {
        let short = ZoneShape::Polygon {
            ring: square_ring().into_iter().take(2).collect(),
        };
        assert!(matches!(short.validate(), Err(ShapeError::TooFewVertices(2))));

        let bowtie = ZoneShape::Polygon {
            ring: vec![
                GeoPoint::new(0.0, 0.0),
                GeoPoint::new(1.0, 1.0),
                GeoPoint::new(1.0, 0.0),
                GeoPoint::new(0.0, 1.0),
            ],
        };
        assert!(matches!(bowtie.validate(), Err(ShapeError::SelfIntersecting)));

        let bad_vertex = ZoneShape::Polygon {
            ring: vec![
                GeoPoint::new(95.0, 0.0),
                GeoPoint::new(1.0, 1.0),
                GeoPoint::new(1.0, 0.0),
            ],
        };
        assert!(matches!(bad_vertex.validate(), Err(ShapeError::InvalidVertex(_))));
    }

    #[test]
    fn restricted_zone_requires_risk_level() {
        let mut zone = Zone::example_data();
        zone.kind = ZoneKind::Restricted;
        zone.risk_level = None;
        assert!(matches!(zone.validate(), Err(ShapeError::MissingRiskLevel)));
        zone.risk_level = Some(RiskLevel::High);
        assert!(zone.validate().is_ok());
    }
}
