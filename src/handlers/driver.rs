use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::ranking::{self, DriverSummary};
use crate::utils::geo::Coordinate;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NearbyDriversParams {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PickupPoint {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AutoAllocationRequest {
    pub pickup: Option<PickupPoint>,
    pub radius_km: Option<f64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct NearbyDriversResponse {
    pub pickup: Coordinate,
    pub radius_km: f64,
    pub count: usize,
    pub drivers: Vec<DriverSummary>,
}

/// List drivers near a pickup point, nearest first
pub async fn nearby_drivers(
    State(state): State<AppState>,
    params: Result<Query<NearbyDriversParams>, QueryRejection>,
) -> AppResult<Json<NearbyDriversResponse>> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let query = ranking::Query::new(
        pickup_from(params.lat, params.lng),
        params.radius_km,
        params.limit,
    )?;

    Ok(Json(find_nearby(&state, query).await?))
}

/// Candidate drivers for a ride request. Ranking only; no driver is assigned.
pub async fn auto_allocation(
    State(state): State<AppState>,
    payload: Result<Json<AutoAllocationRequest>, JsonRejection>,
) -> AppResult<Json<NearbyDriversResponse>> {
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let pickup = payload.pickup.and_then(|p| pickup_from(p.lat, p.lng));
    let query = ranking::Query::new(pickup, payload.radius_km, payload.limit)?;

    Ok(Json(find_nearby(&state, query).await?))
}

async fn find_nearby(state: &AppState, query: ranking::Query) -> AppResult<NearbyDriversResponse> {
    let records = state.store.candidates(&query.bound()).await?;
    let drivers = ranking::rank(&records, &query);

    tracing::debug!(
        pickup_lat = query.pickup().lat,
        pickup_lng = query.pickup().lng,
        radius_km = query.radius_km(),
        candidates = records.len(),
        matched = drivers.len(),
        "Ranked nearby drivers"
    );

    Ok(NearbyDriversResponse {
        pickup: query.pickup(),
        radius_km: query.radius_km(),
        count: drivers.len(),
        drivers,
    })
}

fn pickup_from(lat: Option<f64>, lng: Option<f64>) -> Option<Coordinate> {
    Some(Coordinate::new(lat?, lng?))
}
