use std::f64::consts::FRAC_PI_2;

use serde::Serialize;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree of latitude, treated as constant.
pub const KM_PER_DEGREE_LAT: f64 = 110.574;

/// Kilometers per degree of longitude at the equator; shrinks with cos(latitude).
pub const KM_PER_DEGREE_LNG_AT_EQUATOR: f64 = 111.320;

/// Floor for cos(latitude) so polar centers never divide by zero.
const MIN_COS_LAT: f64 = 1e-6;

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components finite and inside [-90, 90] / [-180, 180]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Calculate distance between two coordinates using Haversine formula
/// Returns distance in kilometers
///
/// Inputs are not validated; callers reject out-of-range coordinates first.
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let hav = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * hav.sqrt().atan2((1.0 - hav).sqrt());

    EARTH_RADIUS_KM * c
}

/// Latitude/longitude rectangle enclosing a search circle.
///
/// Never tighter than the circle it was built from, so it is safe as a pre-filter but is
/// not an inclusion test on its own. `min_lng`/`max_lng` may run past +-180 when the circle
/// crosses the antimeridian; [`RegionBound::contains`] accounts for the wrap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionBound {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl RegionBound {
    /// Bound around `center` covering every point within `radius_km` (which must be > 0).
    pub fn around(center: Coordinate, radius_km: f64) -> Self {
        let lat_delta = radius_km / KM_PER_DEGREE_LAT;
        let min_lat = (center.lat - lat_delta).max(-90.0);
        let max_lat = (center.lat + lat_delta).min(90.0);

        let angular = radius_km / EARTH_RADIUS_KM;

        // A circle reaching over a pole spans every meridian.
        if angular >= FRAC_PI_2 || center.lat.abs() + angular.to_degrees() >= 90.0 {
            return Self::full_longitude(min_lat, max_lat);
        }

        // cos(lat) as sin of the polar distance, which stays accurate next to the pole.
        // Positive here because the circle stops short of the pole.
        let cos_lat = (90.0 - center.lat.abs()).to_radians().sin();

        let approx = radius_km / (KM_PER_DEGREE_LNG_AT_EQUATOR * cos_lat.max(MIN_COS_LAT));
        // Widest extent of a spherical cap sits off the center latitude.
        let exact = (angular.sin() / cos_lat).min(1.0).asin().to_degrees();
        let lng_delta = approx.max(exact);

        if lng_delta >= 180.0 {
            return Self::full_longitude(min_lat, max_lat);
        }

        Self {
            min_lat,
            max_lat,
            min_lng: center.lng - lng_delta,
            max_lng: center.lng + lng_delta,
        }
    }

    fn full_longitude(min_lat: f64, max_lat: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lng: -180.0,
            max_lng: 180.0,
        }
    }

    pub fn spans_all_longitudes(&self) -> bool {
        self.max_lng - self.min_lng >= 360.0
            || (self.min_lng <= -180.0 && self.max_lng >= 180.0)
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        if point.lat < self.min_lat || point.lat > self.max_lat {
            return false;
        }
        if self.spans_all_longitudes() {
            return true;
        }

        [point.lng, point.lng - 360.0, point.lng + 360.0]
            .into_iter()
            .any(|lng| lng >= self.min_lng && lng <= self.max_lng)
    }
}
