use sea_orm::{
    ColumnTrait, Condition, Database, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

use crate::entities::driver;
use crate::error::{AppError, AppResult};
use crate::utils::geo::RegionBound;

pub async fn connect(database_url: &str) -> AppResult<DatabaseConnection> {
    Database::connect(database_url)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to connect to database: {}", e)))
}

/// Fetch drivers whose `lat` column lies inside the bound's latitude band.
///
/// Only latitude is pushed down; longitude is checked in-process by the ranker. Rows with
/// a null `lat` or `lng` are included since their position then comes from the nested
/// `location` document.
pub async fn drivers_in_latitude_band(
    db: &DatabaseConnection,
    bound: &RegionBound,
) -> AppResult<Vec<driver::Model>> {
    let rows = driver::Entity::find()
        .filter(
            Condition::any()
                .add(driver::Column::Lat.between(bound.min_lat, bound.max_lat))
                .add(driver::Column::Lat.is_null())
                .add(driver::Column::Lng.is_null()),
        )
        .order_by_asc(driver::Column::Id)
        .all(db)
        .await?;

    Ok(rows)
}
