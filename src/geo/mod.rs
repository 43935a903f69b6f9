use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6_371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Rejects NaN/infinite components and out-of-range coordinates.
    pub fn new(lat: f64, lng: f64) -> Result<Self, String> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(format!("coordinates must be finite numbers, got {lat},{lng}"));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(format!("latitude {lat} out of range"));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(format!("longitude {lng} out of range"));
        }
        Ok(Self { lat, lng })
    }
}

/// Parses the `"lat,lon"` encoding used for duty locations and stored GPS fixes.
impl FromStr for GeoPoint {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = raw
            .split_once(',')
            .ok_or_else(|| format!("expected \"lat,lon\", got {raw:?}"))?;

        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|err| format!("invalid latitude {lat:?}: {err}"))?;
        let lng = lng
            .trim()
            .parse::<f64>()
            .map_err(|err| format!("invalid longitude {lng:?}: {err}"))?;

        GeoPoint::new(lat, lng)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Great-circle distance in meters. NaN inputs propagate as NaN.
pub fn distance_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + phi1.cos() * phi2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().atan2((1.0 - haversine).sqrt());

    EARTH_RADIUS_KM * central_angle * 1000.0
}

pub fn haversine_m(a: &GeoPoint, b: &GeoPoint) -> f64 {
    distance_m(a.lat, a.lng, b.lat, b.lng)
}
