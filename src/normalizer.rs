//! Coordinate extraction across driver record shapes.
//!
//! Driver documents have been written in two layouts over time:
//!
//! ```json
//! { "id": "d1", "name": "Ana", "lat": 51.50, "lng": -0.12 }
//! { "id": "d2", "location": { "lat": "51.51", "lng": "-0.13" } }
//! ```
//!
//! The shape is picked per document by looking at which fields are present, so the
//! ranking code only ever sees [`DriverRecord`]s.

use serde_json::{Map, Value};

use crate::entities::driver;
use crate::ranking::DriverRecord;
use crate::utils::geo::Coordinate;

const COORDINATE_KEYS: [(&str, &str); 2] = [("lat", "lng"), ("latitude", "longitude")];
const ID_KEYS: [&str; 2] = ["id", "driver_id"];
const LOCATION_KEY: &str = "location";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// Coordinate fields at the top level of the document
    Flat,
    /// Coordinate fields inside a `location` object
    Nested,
}

impl RecordShape {
    pub fn detect(document: &Map<String, Value>) -> Option<Self> {
        // A null flat field counts as absent, matching a null database column.
        let present = |key: &str| document.get(key).is_some_and(|v| !v.is_null());
        let has_flat_pair = COORDINATE_KEYS
            .iter()
            .any(|(lat, lng)| present(*lat) && present(*lng));

        if has_flat_pair {
            Some(Self::Flat)
        } else if document.get(LOCATION_KEY).is_some_and(Value::is_object) {
            Some(Self::Nested)
        } else {
            None
        }
    }

    pub fn extract_coordinate(self, document: &Map<String, Value>) -> Option<Coordinate> {
        match self {
            Self::Flat => read_coordinate(document),
            Self::Nested => document
                .get(LOCATION_KEY)
                .and_then(Value::as_object)
                .and_then(read_coordinate),
        }
    }
}

/// Coordinate of a driver document of either shape, if it has a usable one.
pub fn extract_coordinate(document: &Value) -> Option<Coordinate> {
    let document = document.as_object()?;
    RecordShape::detect(document)?.extract_coordinate(document)
}

/// Convert a raw driver document into a [`DriverRecord`].
///
/// Returns `None` only when the document has no identifier; a missing or malformed
/// location still yields a record, which ranking will skip.
pub fn normalize_document(document: &Value) -> Option<DriverRecord> {
    let fields = document.as_object()?;
    let id = ID_KEYS
        .iter()
        .find_map(|key| fields.get(*key).and_then(identifier))?;

    Some(DriverRecord {
        id,
        name: fields.get("name").and_then(Value::as_str).map(str::to_owned),
        coordinate: extract_coordinate(document),
    })
}

impl From<driver::Model> for DriverRecord {
    fn from(model: driver::Model) -> Self {
        let coordinate = match (model.lat, model.lng) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)).filter(Coordinate::is_valid),
            _ => model
                .location
                .as_ref()
                .and_then(Value::as_object)
                .and_then(read_coordinate),
        };

        Self {
            id: model.id,
            name: model.name,
            coordinate,
        }
    }
}

fn read_coordinate(fields: &Map<String, Value>) -> Option<Coordinate> {
    let (lat, lng) = COORDINATE_KEYS
        .iter()
        .find_map(|(lat, lng)| Some((fields.get(*lat)?, fields.get(*lng)?)))?;

    Some(Coordinate::new(degrees(lat)?, degrees(lng)?)).filter(Coordinate::is_valid)
}

// Some writers stored coordinates as strings.
fn degrees(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|v: &f64| v.is_finite())
}

fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_flat_document() {
        let doc = json!({ "id": "d1", "name": "Ana", "lat": 51.5, "lng": -0.12 });

        assert_eq!(
            RecordShape::detect(doc.as_object().unwrap()),
            Some(RecordShape::Flat)
        );
        assert_eq!(
            normalize_document(&doc),
            Some(DriverRecord {
                id: "d1".to_string(),
                name: Some("Ana".to_string()),
                coordinate: Some(Coordinate::new(51.5, -0.12)),
            })
        );
    }

    #[test]
    fn test_nested_document_with_string_numbers() {
        let doc = json!({ "id": "d2", "location": { "lat": "51.51", "lng": " -0.13 " } });

        assert_eq!(
            RecordShape::detect(doc.as_object().unwrap()),
            Some(RecordShape::Nested)
        );
        assert_eq!(extract_coordinate(&doc), Some(Coordinate::new(51.51, -0.13)));
    }

    #[test]
    fn test_long_field_names() {
        let flat = json!({ "id": "d3", "latitude": 10.0, "longitude": 20.0 });
        let nested = json!({ "id": "d4", "location": { "latitude": 10.0, "longitude": 20.0 } });

        assert_eq!(extract_coordinate(&flat), Some(Coordinate::new(10.0, 20.0)));
        assert_eq!(extract_coordinate(&nested), Some(Coordinate::new(10.0, 20.0)));
    }

    #[test]
    fn test_flat_fields_win_over_location() {
        let doc = json!({
            "id": "d5",
            "lat": 1.0,
            "lng": 2.0,
            "location": { "lat": 3.0, "lng": 4.0 }
        });

        assert_eq!(extract_coordinate(&doc), Some(Coordinate::new(1.0, 2.0)));
    }

    #[test]
    fn test_null_flat_fields_fall_back_to_location() {
        let doc = json!({
            "id": "legacy",
            "lat": null,
            "lng": null,
            "location": { "lat": 1.0, "lng": 2.0 }
        });

        assert_eq!(
            RecordShape::detect(doc.as_object().unwrap()),
            Some(RecordShape::Nested)
        );
        assert_eq!(extract_coordinate(&doc), Some(Coordinate::new(1.0, 2.0)));
    }

    #[test]
    fn test_row_and_exported_document_agree() {
        let rows = [
            (None, None, Some(json!({ "lat": 1.0, "lng": 2.0 }))),
            (Some(1.0), None, Some(json!({ "lat": 3.0, "lng": 4.0 }))),
            (Some(5.0), Some(6.0), Some(json!({ "lat": 3.0, "lng": 4.0 }))),
            (None, Some(6.0), None),
            (Some(95.0), Some(6.0), Some(json!({ "lat": 3.0, "lng": 4.0 }))),
        ];

        for (lat, lng, location) in rows {
            let model = driver::Model {
                id: "row".to_string(),
                name: None,
                lat,
                lng,
                location,
            };
            let document = serde_json::to_value(&model).unwrap();

            assert_eq!(
                normalize_document(&document),
                Some(DriverRecord::from(model)),
                "{document}"
            );
        }
    }

    #[test]
    fn test_missing_or_malformed_location() {
        let cases = [
            json!({ "id": "a" }),
            json!({ "id": "b", "lat": 1.0 }),
            json!({ "id": "c", "lat": null, "lng": 2.0 }),
            json!({ "id": "d", "lat": "north", "lng": 2.0 }),
            json!({ "id": "e", "location": "51.5,-0.1" }),
            json!({ "id": "f", "location": { "lat": 1.0 } }),
            json!({ "id": "g", "lat": 123.0, "lng": 2.0 }),
            json!({ "id": "h", "lat": "NaN", "lng": 2.0 }),
        ];

        for doc in &cases {
            assert_eq!(extract_coordinate(doc), None, "{doc}");
            let record = normalize_document(doc).expect("identifier present");
            assert_eq!(record.coordinate, None);
        }
    }

    #[test]
    fn test_identifier_rules() {
        assert_eq!(normalize_document(&json!({ "id": 42 })).unwrap().id, "42");
        assert_eq!(
            normalize_document(&json!({ "driver_id": "x9" })).unwrap().id,
            "x9"
        );
        assert_eq!(normalize_document(&json!({ "id": "  ", "lat": 0, "lng": 0 })), None);
        assert_eq!(normalize_document(&json!({ "name": "no id" })), None);
        assert_eq!(normalize_document(&json!(["not", "an", "object"])), None);
    }

    #[test]
    fn test_model_prefers_flat_columns() {
        let model = driver::Model {
            id: "m1".to_string(),
            name: None,
            lat: Some(1.0),
            lng: Some(2.0),
            location: Some(json!({ "lat": 3.0, "lng": 4.0 })),
        };

        let record = DriverRecord::from(model);
        assert_eq!(record.coordinate, Some(Coordinate::new(1.0, 2.0)));
    }

    #[test]
    fn test_model_falls_back_to_location_document() {
        let model = driver::Model {
            id: "m2".to_string(),
            name: Some("Legacy".to_string()),
            lat: None,
            lng: None,
            location: Some(json!({ "lat": "3.5", "lng": 4.0 })),
        };

        let record = DriverRecord::from(model);
        assert_eq!(record.id, "m2");
        assert_eq!(record.name.as_deref(), Some("Legacy"));
        assert_eq!(record.coordinate, Some(Coordinate::new(3.5, 4.0)));
    }

    #[test]
    fn test_model_without_any_location() {
        let model = driver::Model {
            id: "m3".to_string(),
            name: None,
            lat: Some(1.0),
            lng: None,
            location: None,
        };

        assert_eq!(DriverRecord::from(model).coordinate, None);
    }
}
