//! Great-circle distance between check-in locations.
//!
//! Distances use the haversine formula on a spherical Earth and are always
//! expressed in kilometers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius used by the spherical model
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("invalid {axis} '{value}': {reason}")]
    InvalidCoordinate {
        axis: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// A geographic point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Parse a coordinate from its persisted text form.
    ///
    /// Rejects values that are not numbers, are not finite, or fall outside
    /// `[-90, 90]` / `[-180, 180]`.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, GeoError> {
        let latitude = parse_axis("latitude", latitude, 90.0)?;
        let longitude = parse_axis("longitude", longitude, 180.0)?;
        Ok(Self::new(latitude, longitude))
    }

    /// Validate an already-numeric coordinate against the same bounds as [`Coordinate::parse`]
    pub fn checked(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        Self::check_latitude(latitude)?;
        Self::check_longitude(longitude)?;
        Ok(Self::new(latitude, longitude))
    }

    pub fn check_latitude(latitude: f64) -> Result<f64, GeoError> {
        check_axis("latitude", latitude, 90.0).map(|()| latitude)
    }

    pub fn check_longitude(longitude: f64) -> Result<f64, GeoError> {
        check_axis("longitude", longitude, 180.0).map(|()| longitude)
    }
}

fn parse_axis(axis: &'static str, raw: &str, limit: f64) -> Result<f64, GeoError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| GeoError::InvalidCoordinate {
            axis,
            value: raw.to_string(),
            reason: "not a number",
        })?;
    check_axis(axis, value, limit)?;
    Ok(value)
}

fn check_axis(axis: &'static str, value: f64, limit: f64) -> Result<(), GeoError> {
    if !value.is_finite() {
        return Err(GeoError::InvalidCoordinate {
            axis,
            value: value.to_string(),
            reason: "not finite",
        });
    }
    if value.abs() > limit {
        return Err(GeoError::InvalidCoordinate {
            axis,
            value: value.to_string(),
            reason: "out of range",
        });
    }
    Ok(())
}

/// Haversine distance in kilometers between two points
pub fn distance_between(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push h a hair outside [0, 1] for near-identical or antipodal points
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Cumulative distance along `points` in the order given.
///
/// Fewer than two points travel nowhere and yield `0.0`.
pub fn total_distance(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|pair| distance_between(&pair[0], &pair[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEW_YORK: Coordinate = Coordinate::new(40.7128, -74.0060);
    const LOS_ANGELES: Coordinate = Coordinate::new(34.0522, -118.2437);

    #[test]
    fn test_total_distance_of_empty_and_single_point_is_zero() {
        assert_eq!(total_distance(&[]), 0.0);
        assert_eq!(total_distance(&[NEW_YORK]), 0.0);
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        assert_eq!(distance_between(&NEW_YORK, &NEW_YORK), 0.0);
        assert_eq!(distance_between(&LOS_ANGELES, &LOS_ANGELES), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let there = distance_between(&NEW_YORK, &LOS_ANGELES);
        let back = distance_between(&LOS_ANGELES, &NEW_YORK);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn test_new_york_to_los_angeles() {
        let d = distance_between(&NEW_YORK, &LOS_ANGELES);
        assert!((d - 3936.0).abs() <= 10.0, "got {d} km");
    }

    #[test]
    fn test_points_along_a_meridian_add_up() {
        let a = Coordinate::new(10.0, 20.0);
        let b = Coordinate::new(25.0, 20.0);
        let c = Coordinate::new(40.0, 20.0);

        let direct = distance_between(&a, &c);
        let via_b = distance_between(&a, &b) + distance_between(&b, &c);
        assert!((direct - via_b).abs() < 1e-6);
        assert!((total_distance(&[a, b, c]) - direct).abs() < 1e-6);
    }

    #[test]
    fn test_total_distance_follows_caller_order() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 10.0);
        let c = Coordinate::new(0.0, 5.0);

        // a -> b -> c backtracks, a -> c -> b does not
        let zigzag = total_distance(&[a, b, c]);
        let straight = total_distance(&[a, c, b]);
        assert!(zigzag > straight);
    }

    #[test]
    fn test_antipodal_points_are_half_the_circumference() {
        let d = distance_between(&Coordinate::new(0.0, 0.0), &Coordinate::new(0.0, 180.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_parse_accepts_decimal_strings() {
        let c = Coordinate::parse("42.1015", " -72.5898").unwrap();
        assert_eq!(c, Coordinate::new(42.1015, -72.5898));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = Coordinate::parse("north", "-72.5").unwrap_err();
        assert!(matches!(
            err,
            GeoError::InvalidCoordinate {
                axis: "latitude",
                ..
            }
        ));

        assert!(Coordinate::parse("42.0", "NaN").is_err());
        assert!(Coordinate::parse("42.0", "inf").is_err());
        assert!(Coordinate::parse("", "0").is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(Coordinate::parse("90.5", "0").is_err());
        assert!(Coordinate::parse("0", "-180.01").is_err());
        assert!(Coordinate::parse("-90", "180").is_ok());
        assert!(Coordinate::checked(12.0, 200.0).is_err());
    }
}
