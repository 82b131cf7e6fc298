//! Nearest-driver candidate selection.
//!
//! Ranking is a pure function over already-fetched records: a cheap [`RegionBound`]
//! pre-filter, an exact haversine radius check, then a stable nearest-first sort.

use serde::Serialize;
use thiserror::Error;

use crate::utils::geo::{haversine_distance, Coordinate, RegionBound};

/// Search radius used when the caller does not supply one.
pub const DEFAULT_RADIUS_KM: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("Pickup coordinate is required")]
    MissingPickup,

    #[error("Pickup coordinate ({lat}, {lng}) is out of range")]
    InvalidPickup { lat: f64, lng: f64 },

    #[error("Radius must be a positive number of kilometers, got {0}")]
    InvalidRadius(f64),

    #[error("Limit must be at least 1")]
    InvalidLimit,
}

/// A driver as handed over by a record source.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverRecord {
    pub id: String,
    pub name: Option<String>,
    pub coordinate: Option<Coordinate>,
}

/// A validated nearby-driver query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Query {
    pickup: Coordinate,
    radius_km: f64,
    limit: Option<usize>,
}

impl Query {
    pub fn new(
        pickup: Option<Coordinate>,
        radius_km: Option<f64>,
        limit: Option<usize>,
    ) -> Result<Self, QueryError> {
        let pickup = pickup.ok_or(QueryError::MissingPickup)?;
        if !pickup.is_valid() {
            return Err(QueryError::InvalidPickup {
                lat: pickup.lat,
                lng: pickup.lng,
            });
        }

        let radius_km = radius_km.unwrap_or(DEFAULT_RADIUS_KM);
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(QueryError::InvalidRadius(radius_km));
        }

        if limit == Some(0) {
            return Err(QueryError::InvalidLimit);
        }

        Ok(Self {
            pickup,
            radius_km,
            limit,
        })
    }

    pub fn pickup(&self) -> Coordinate {
        self.pickup
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn bound(&self) -> RegionBound {
        RegionBound::around(self.pickup, self.radius_km)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverSummary {
    pub id: String,
    pub name: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub distance_km: f64,
}

/// Rank `records` by distance from the query pickup.
///
/// Records without a usable coordinate are skipped. Equal distances keep their input
/// order, so sources that need a deterministic tie-break should deliver records sorted.
pub fn rank<'a, I>(records: I, query: &Query) -> Vec<DriverSummary>
where
    I: IntoIterator<Item = &'a DriverRecord>,
{
    let bound = query.bound();

    let mut candidates: Vec<(f64, &DriverRecord, Coordinate)> = records
        .into_iter()
        .filter_map(|record| {
            let Some(coordinate) = record.coordinate.filter(Coordinate::is_valid) else {
                tracing::trace!(driver_id = %record.id, "Skipping driver without usable location");
                return None;
            };
            if !bound.contains(coordinate) {
                return None;
            }

            let distance = haversine_distance(query.pickup, coordinate);
            (distance <= query.radius_km).then_some((distance, record, coordinate))
        })
        .collect();

    // sort_by is stable; ties keep input order
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

    if let Some(limit) = query.limit {
        candidates.truncate(limit);
    }

    candidates
        .into_iter()
        .map(|(distance, record, coordinate)| DriverSummary {
            id: record.id.clone(),
            name: record.name.clone(),
            lat: coordinate.lat,
            lng: coordinate.lng,
            distance_km: round_km(distance),
        })
        .collect()
}

fn round_km(distance: f64) -> f64 {
    (distance * 100.0).round() / 100.0
}
