use geo_types::{Coord, LineString};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// Keeps an explicit `null` distinct from an absent field.
///
/// Used with `#[serde(default)]`: a missing key stays `None`, while a key
/// present with any value (including `null`) becomes `Some`.
pub fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A trip as exported by the Cyclocity account API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrip {
    #[serde(default, deserialize_with = "deserialize_present", skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_present", skip_serializing_if = "Option::is_none")]
    pub start_station: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_present", skip_serializing_if = "Option::is_none")]
    pub end_station: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_present", skip_serializing_if = "Option::is_none")]
    pub start_date_time: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_present", skip_serializing_if = "Option::is_none")]
    pub end_date_time: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_present", skip_serializing_if = "Option::is_none")]
    pub duration: Option<Value>,
    #[serde(default)]
    pub bike_type: Value,
}

/// Kind of bike used for a trip.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum BikeType {
    Classic,
    Electric,
}

impl BikeType {
    /// The API reports `1` for a classic bike; every other value is electric.
    pub fn from_raw(value: &Value) -> BikeType {
        match value.as_f64() {
            Some(code) if code == 1.0 => BikeType::Classic,
            _ => BikeType::Electric,
        }
    }
}

/// Station details resolved from the station layer.
///
/// Name and coordinates are kept as they appear in the layer, so `4` stays
/// `4` and a `null` name stays `null` in the written dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationInfo {
    #[serde(default, deserialize_with = "deserialize_present", skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    pub lng: Number,
    pub lat: Number,
    #[serde(default)]
    pub commune: String,
    #[serde(default)]
    pub address: String,
}

/// Geometry attached to a converted trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TripGeometry {
    LineString { coordinates: Vec<[Number; 2]> },
}

impl TripGeometry {
    pub fn between(start: &StationInfo, end: &StationInfo) -> TripGeometry {
        TripGeometry::LineString {
            coordinates: vec![
                [start.lng.clone(), start.lat.clone()],
                [end.lng.clone(), end.lat.clone()],
            ],
        }
    }

    pub fn to_line_string(&self) -> LineString {
        match self {
            TripGeometry::LineString { coordinates } => coordinates
                .iter()
                .map(|[x, y]| Coord {
                    x: x.as_f64().unwrap_or_default(),
                    y: y.as_f64().unwrap_or_default(),
                })
                .collect(),
        }
    }
}

/// A trip in the map dataset format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapTrip {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Value>,
    pub bike_type: BikeType,
    pub start_station: StationInfo,
    pub end_station: StationInfo,
    pub geometry: TripGeometry,
}

/// Station layer as published by the Métropole de Lyon open data portal.
#[derive(Debug, Deserialize)]
pub struct StationCollection {
    #[serde(default)]
    pub features: Option<Vec<StationFeature>>,
}

#[derive(Debug, Deserialize)]
pub struct StationFeature {
    #[serde(default)]
    pub properties: Option<StationProperties>,
    #[serde(default)]
    pub geometry: Option<PointGeometry>,
}

#[derive(Debug, Deserialize)]
pub struct StationProperties {
    #[serde(default, deserialize_with = "deserialize_present")]
    pub idstation: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub nom: Option<Value>,
    #[serde(default)]
    pub commune: Option<String>,
    #[serde(default)]
    pub adresse1: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PointGeometry {
    #[serde(default)]
    pub coordinates: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bike_type_is_classic_only_for_numeric_one() {
        assert_eq!(BikeType::from_raw(&json!(1)), BikeType::Classic);
        assert_eq!(BikeType::from_raw(&json!(1.0)), BikeType::Classic);
        assert_eq!(BikeType::from_raw(&json!("1")), BikeType::Electric);
        assert_eq!(BikeType::from_raw(&json!(2)), BikeType::Electric);
        assert_eq!(BikeType::from_raw(&Value::Null), BikeType::Electric);
    }

    #[test]
    fn raw_trip_keeps_explicit_null_apart_from_missing() {
        let trip: RawTrip =
            serde_json::from_value(json!({"id": 4, "duration": null, "startStation": 1}))
                .unwrap();
        assert_eq!(trip.id, Some(json!(4)));
        assert_eq!(trip.duration, Some(Value::Null));
        assert_eq!(trip.start_date_time, None);
        assert_eq!(trip.start_station, Some(json!(1)));
        assert_eq!(trip.end_station, None);
    }

    #[test]
    fn geometry_serializes_as_geojson_line() {
        let a = StationInfo {
            name: Some(json!("A")),
            lng: Number::from_f64(4.8).unwrap(),
            lat: Number::from_f64(45.7).unwrap(),
            commune: String::new(),
            address: String::new(),
        };
        let b = StationInfo {
            lng: Number::from(5),
            lat: Number::from_f64(45.8).unwrap(),
            ..a.clone()
        };
        let geometry = TripGeometry::between(&a, &b);
        assert_eq!(
            serde_json::to_value(&geometry).unwrap(),
            json!({"type": "LineString", "coordinates": [[4.8, 45.7], [5, 45.8]]})
        );
        let line = geometry.to_line_string();
        assert_eq!(line.0.len(), 2);
        assert_eq!(line.0[1].x, 5.0);
    }
}
