use std::{error, fmt};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair that is non-finite or outside the valid
/// range (|lat| ≤ 90, |lon| ≤ 180). Rejected, never clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for InvalidCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid coordinate: latitude {}, longitude {}",
            self.latitude, self.longitude
        )
    }
}

impl error::Error for InvalidCoordinate {}

fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

pub fn validate_coordinate(
    latitude: f64,
    longitude: f64,
) -> Result<(), InvalidCoordinate> {
    if !latitude.is_finite()
        || !longitude.is_finite()
        || latitude.abs() > 90.0
        || longitude.abs() > 180.0
    {
        return Err(InvalidCoordinate {
            latitude,
            longitude,
        });
    }
    Ok(())
}

/// Great-circle distance in meters via the haversine formula.
/// Pure; callers are expected to validate coordinates first.
pub fn haversine_distance_m(
    latitude_1: f64,
    longitude_1: f64,
    latitude_2: f64,
    longitude_2: f64,
) -> f64 {
    let lat1_rad = to_radians(latitude_1);
    let lon1_rad = to_radians(longitude_1);
    let lat2_rad = to_radians(latitude_2);
    let lon2_rad = to_radians(longitude_2);

    let dlat = lat2_rad - lat1_rad;
    let dlon = lon2_rad - lon1_rad;

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

pub fn point_in_circle(
    latitude: f64,
    longitude: f64,
    center_latitude: f64,
    center_longitude: f64,
    radius_m: f64,
) -> bool {
    haversine_distance_m(latitude, longitude, center_latitude, center_longitude)
        <= radius_m
}

/// Ray-casting containment test on a closed ring of (lat, lon) vertices.
/// The ring is treated as planar in an equirectangular projection, which is
/// accurate enough for city-scale zones but distorts near the poles and
/// across the antimeridian. Degenerate (zero-area) rings contain nothing.
pub fn point_in_polygon(latitude: f64, longitude: f64, ring: &[(f64, f64)]) -> bool {
    if ring.len() < 3 || ring_area_deg2(ring) == 0.0 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (lat_i, lon_i) = ring[i];
        let (lat_j, lon_j) = ring[j];
        if (lat_i > latitude) != (lat_j > latitude) {
            let crossing_lon =
                lon_j + (latitude - lat_j) / (lat_i - lat_j) * (lon_i - lon_j);
            if longitude < crossing_lon {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Shoelace area of the ring in squared degrees. Only used to detect
/// degenerate rings, so the unit does not matter.
pub fn ring_area_deg2(ring: &[(f64, f64)]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut doubled = 0.0;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (lat_i, lon_i) = ring[i];
        let (lat_j, lon_j) = ring[j];
        doubled += lon_j * lat_i - lon_i * lat_j;
        j = i;
    }
    (doubled / 2.0).abs()
}

fn cross(origin: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - origin.0) * (b.1 - origin.1) - (a.1 - origin.1) * (b.0 - origin.0)
}

fn segments_cross(
    a1: (f64, f64),
    a2: (f64, f64),
    b1: (f64, f64),
    b2: (f64, f64),
) -> bool {
    let d1 = cross(a1, a2, b1);
    let d2 = cross(a1, a2, b2);
    let d3 = cross(b1, b2, a1);
    let d4 = cross(b1, b2, a2);
    (d1 * d2 < 0.0) && (d3 * d4 < 0.0)
}

/// True if any two non-adjacent edges of the closed ring properly cross.
pub fn ring_self_intersects(ring: &[(f64, f64)]) -> bool {
    let n = ring.len();
    if n < 4 {
        return false;
    }
    for i in 0..n {
        for j in (i + 1)..n {
            // adjacent edges share a vertex and may not be tested
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            let a1 = ring[i];
            let a2 = ring[(i + 1) % n];
            let b1 = ring[j];
            let b2 = ring[(j + 1) % n];
            if segments_cross(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const HYDERABAD: (f64, f64) = (17.3850, 78.4867);
    const SECUNDERABAD: (f64, f64) = (17.4399, 78.4983);

    #[test]
    fn haversine_is_symmetric() {
        let d1 = haversine_distance_m(
            HYDERABAD.0,
            HYDERABAD.1,
            SECUNDERABAD.0,
            SECUNDERABAD.1,
        );
        let d2 = haversine_distance_m(
            SECUNDERABAD.0,
            SECUNDERABAD.1,
            HYDERABAD.0,
            HYDERABAD.1,
        );
        assert_eq!(d1, d2);
    }

    #[test]
    fn haversine_zero_for_identical_points() {
        assert_eq!(
            haversine_distance_m(HYDERABAD.0, HYDERABAD.1, HYDERABAD.0, HYDERABAD.1),
            0.0
        );
    }

    #[test]
    fn haversine_known_distance() {
        // one degree of latitude along a meridian is ~111.2 km
        let d = haversine_distance_m(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn circle_matches_distance_definition() {
        for (lat, lon) in [(17.24, 78.43), (17.26, 78.41), (17.0, 78.0)] {
            let distance =
                haversine_distance_m(lat, lon, HYDERABAD.0, HYDERABAD.1);
            for radius in [100.0, 5_000.0, 50_000.0] {
                assert_eq!(
                    point_in_circle(lat, lon, HYDERABAD.0, HYDERABAD.1, radius),
                    distance <= radius
                );
            }
        }
    }

    #[test]
    fn validate_rejects_out_of_range() {
        assert!(validate_coordinate(95.0, 10.0).is_err());
        assert!(validate_coordinate(10.0, 181.0).is_err());
        assert!(validate_coordinate(f64::NAN, 10.0).is_err());
        assert!(validate_coordinate(10.0, f64::INFINITY).is_err());
        assert!(validate_coordinate(90.0, 180.0).is_ok());
        assert!(validate_coordinate(-90.0, -180.0).is_ok());
    }

    fn unit_square() -> Vec<(f64, f64)> {
        vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]
    }

    #[test]
    fn polygon_contains_interior_point() {
        assert!(point_in_polygon(0.5, 0.5, &unit_square()));
    }

    #[test]
    fn polygon_excludes_exterior_point() {
        assert!(!point_in_polygon(1.5, 0.5, &unit_square()));
        assert!(!point_in_polygon(0.5, -0.1, &unit_square()));
    }

    #[test]
    fn concave_polygon_containment() {
        // L-shape with the notch at the top right
        let ring = vec![
            (0.0, 0.0),
            (0.0, 2.0),
            (1.0, 2.0),
            (1.0, 1.0),
            (2.0, 1.0),
            (2.0, 0.0),
        ];
        assert!(point_in_polygon(0.5, 1.5, &ring));
        assert!(point_in_polygon(1.5, 0.5, &ring));
        assert!(!point_in_polygon(1.5, 1.5, &ring));
    }

    #[test]
    fn degenerate_ring_contains_nothing() {
        let collinear = vec![(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)];
        assert!(!point_in_polygon(1.0, 1.0, &collinear));
        assert_eq!(ring_area_deg2(&collinear), 0.0);
    }

    #[test]
    fn bowtie_ring_self_intersects() {
        let bowtie = vec![(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)];
        assert!(ring_self_intersects(&bowtie));
        assert!(!ring_self_intersects(&unit_square()));
    }
}
