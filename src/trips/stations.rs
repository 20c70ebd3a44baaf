use std::collections::HashMap;

use serde_json::{Number, Value};

use crate::trips::error::Error;
use crate::trips::structs::{StationCollection, StationInfo};

/// Largest magnitude below which every integral `f64` is printed without a fraction.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Normalizes a station id to the string it is compared by.
///
/// Trip exports carry numeric ids while the station layer may carry strings,
/// so both sides are reduced to the same text: `10001`, `10001.0` and
/// `"10001"` all map to `10001`. An absent id maps to `undefined`, which is
/// distinct from the `null` of an explicit null id.
pub fn station_key(id: Option<&Value>) -> String {
    match id {
        None => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => number_text(n),
        Some(other) => other.to_string(),
    }
}

pub(crate) fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

/// Lookup table from station id to station details.
#[derive(Debug)]
pub struct StationIndex {
    stations: HashMap<String, StationInfo>,
    features: usize,
}

impl StationIndex {
    /// Build the index from a GeoJSON feature collection.
    ///
    /// A document without a `features` member, or with a null one, yields an
    /// empty index. When two
    /// features share an id the first one is kept.
    pub fn from_geojson(doc: Value) -> Result<StationIndex, Error> {
        let collection: StationCollection = serde_json::from_value(doc)?;
        StationIndex::from_collection(collection)
    }

    pub fn from_collection(collection: StationCollection) -> Result<StationIndex, Error> {
        let mut stations = HashMap::new();
        let collection_features = collection.features.unwrap_or_default();
        let features = collection_features.len();

        for (index, feature) in collection_features.into_iter().enumerate() {
            let properties = feature.properties.ok_or(Error::MissingProperties(index))?;
            let coordinates = feature
                .geometry
                .map(|g| g.coordinates)
                .ok_or_else(|| Error::InvalidCoordinates {
                    index,
                    reason: "missing geometry".to_string(),
                })?;
            let (lng, lat) = match coordinates.as_slice() {
                [lng, lat, ..] => match (lng, lat) {
                    (Value::Number(lng), Value::Number(lat)) => (lng.clone(), lat.clone()),
                    _ => {
                        return Err(Error::InvalidCoordinates {
                            index,
                            reason: "coordinates are not numbers".to_string(),
                        })
                    }
                },
                _ => {
                    return Err(Error::InvalidCoordinates {
                        index,
                        reason: format!("expected 2 coordinates, found {}", coordinates.len()),
                    })
                }
            };

            stations
                .entry(station_key(properties.idstation.as_ref()))
                .or_insert(StationInfo {
                    name: properties.nom,
                    lng,
                    lat,
                    commune: properties.commune.unwrap_or_default(),
                    address: properties.adresse1.unwrap_or_default(),
                });
        }

        Ok(StationIndex { stations, features })
    }

    pub fn get(&self, id: Option<&Value>) -> Option<&StationInfo> {
        self.stations.get(&station_key(id))
    }

    /// Number of features the index was built from, duplicates included.
    pub fn feature_count(&self) -> usize {
        self.features
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(id: Value, name: &str, lng: f64, lat: f64) -> Value {
        json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [lng, lat]},
            "properties": {"idstation": id, "nom": name, "commune": "Lyon 1er", "adresse1": "Place"}
        })
    }

    #[test]
    fn ids_match_across_numbers_and_strings() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [feature(json!("10001"), "Terreaux", 4.83, 45.76)]
        });
        let index = StationIndex::from_geojson(doc).unwrap();

        assert_eq!(index.get(Some(&json!(10001))).unwrap().name, Some(json!("Terreaux")));
        assert_eq!(index.get(Some(&json!(10001.0))).unwrap().lat.as_f64(), Some(45.76));
        assert!(index.get(Some(&json!("10002"))).is_none());
    }

    #[test]
    fn missing_features_gives_empty_index() {
        let index = StationIndex::from_geojson(json!({"type": "FeatureCollection"})).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn null_features_gives_empty_index() {
        let index = StationIndex::from_geojson(json!({"features": null})).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.feature_count(), 0);
    }

    #[test]
    fn first_feature_wins_on_duplicate_id() {
        let doc = json!({
            "features": [
                feature(json!(7), "First", 1.0, 2.0),
                feature(json!("7"), "Second", 3.0, 4.0)
            ]
        });
        let index = StationIndex::from_geojson(doc).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.feature_count(), 2);
        assert_eq!(index.get(Some(&json!(7))).unwrap().name, Some(json!("First")));
    }

    #[test]
    fn optional_properties_default_to_empty() {
        let doc = json!({
            "features": [{
                "geometry": {"coordinates": [4.8, 45.7]},
                "properties": {"idstation": 3, "nom": "Bare", "commune": null}
            }]
        });
        let index = StationIndex::from_geojson(doc).unwrap();
        let station = index.get(Some(&json!(3))).unwrap();
        assert_eq!(station.commune, "");
        assert_eq!(station.address, "");
    }

    #[test]
    fn explicit_null_name_is_kept() {
        let doc = json!({
            "features": [{
                "geometry": {"coordinates": [1.0, 2.0]},
                "properties": {"idstation": 4, "nom": null}
            }]
        });
        let index = StationIndex::from_geojson(doc).unwrap();
        let station = index.get(Some(&json!(4))).unwrap();
        assert_eq!(station.name, Some(Value::Null));
        assert_eq!(
            serde_json::to_value(station).unwrap(),
            json!({"name": null, "lng": 1.0, "lat": 2.0, "commune": "", "address": ""})
        );
    }

    #[test]
    fn integer_coordinates_stay_integers() {
        let doc = json!({
            "features": [{
                "geometry": {"coordinates": [4, 45]},
                "properties": {"idstation": 5}
            }]
        });
        let index = StationIndex::from_geojson(doc).unwrap();
        let station = index.get(Some(&json!(5))).unwrap();
        assert_eq!(serde_json::to_string(&station.lng).unwrap(), "4");
        assert_eq!(serde_json::to_string(&station.lat).unwrap(), "45");
    }

    #[test]
    fn feature_without_id_only_matches_absent_ids() {
        let doc = json!({
            "features": [{
                "geometry": {"coordinates": [1.0, 2.0]},
                "properties": {"nom": "Anonymous"}
            }]
        });
        let index = StationIndex::from_geojson(doc).unwrap();
        assert!(index.get(Some(&Value::Null)).is_none());
        assert!(index.get(None).is_some());
    }

    #[test]
    fn feature_without_properties_is_rejected() {
        let doc = json!({"features": [{"geometry": {"coordinates": [1.0, 2.0]}}]});
        assert!(matches!(
            StationIndex::from_geojson(doc),
            Err(Error::MissingProperties(0))
        ));
    }

    #[test]
    fn short_coordinates_are_rejected() {
        let doc = json!({"features": [
            feature(json!(1), "Ok", 1.0, 2.0),
            {"geometry": {"coordinates": [1.0]}, "properties": {"idstation": 2}}
        ]});
        assert!(matches!(
            StationIndex::from_geojson(doc),
            Err(Error::InvalidCoordinates { index: 1, .. })
        ));
    }

    #[test]
    fn station_key_normalizes_integral_floats() {
        assert_eq!(station_key(Some(&json!(12.0))), "12");
        assert_eq!(station_key(Some(&json!(12.5))), "12.5");
        assert_eq!(station_key(Some(&Value::Null)), "null");
        assert_eq!(station_key(None), "undefined");
    }
}
