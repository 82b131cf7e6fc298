use std::path::Path;
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serde_json::Value;

use crate::db;
use crate::error::AppResult;
use crate::normalizer::normalize_document;
use crate::ranking::DriverRecord;
use crate::utils::geo::RegionBound;

/// Source of driver records for ranking
#[derive(Clone)]
pub enum DriverStore {
    Database(Arc<DatabaseConnection>),
    /// Records loaded once at startup, shared read-only between requests
    Memory(Arc<[DriverRecord]>),
}

impl DriverStore {
    pub fn from_records(records: Vec<DriverRecord>) -> Self {
        DriverStore::Memory(records.into())
    }

    /// Normalize raw driver documents, dropping the ones without an identifier.
    pub fn from_documents(documents: &[Value]) -> Self {
        let records: Vec<DriverRecord> = documents
            .iter()
            .enumerate()
            .filter_map(|(index, document)| {
                let record = normalize_document(document);
                if record.is_none() {
                    tracing::warn!(index, "Dropping driver document without an id");
                }
                record
            })
            .collect();

        let unlocated = records.iter().filter(|r| r.coordinate.is_none()).count();
        tracing::info!(
            drivers = records.len(),
            unlocated,
            "Loaded driver documents"
        );

        Self::from_records(records)
    }

    /// Load a JSON array of driver documents.
    pub async fn load_file(path: &Path) -> AppResult<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        let documents: Vec<Value> = serde_json::from_str(&raw)?;
        Ok(Self::from_documents(&documents))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DriverStore::Database(_) => "database",
            DriverStore::Memory(_) => "memory",
        }
    }

    /// Records that may fall inside `bound`.
    ///
    /// The latitude band is applied as a pre-filter; callers must still run the exact
    /// ranking, which owns correctness.
    pub async fn candidates(&self, bound: &RegionBound) -> AppResult<Vec<DriverRecord>> {
        match self {
            DriverStore::Database(conn) => {
                let rows = db::drivers_in_latitude_band(conn, bound).await?;
                Ok(rows.into_iter().map(DriverRecord::from).collect())
            }
            DriverStore::Memory(records) => Ok(records
                .iter()
                .filter(|r| {
                    r.coordinate
                        .is_some_and(|c| c.lat >= bound.min_lat && c.lat <= bound.max_lat)
                })
                .cloned()
                .collect()),
        }
    }
}
