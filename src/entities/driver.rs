use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Driver row. Older rows carry their position in the nested `location` document
/// instead of the flat `lat`/`lng` columns.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "driver")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub location: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
