use crate::trips::structs::MapTrip;

use serde_json::{json, Value};

pub fn convert_to_geojson(features: &[Value]) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

// Build a LineString feature from a converted trip
pub fn trip_feature(trip: &MapTrip) -> Value {
    json!({
        "type": "Feature",
        "geometry": &trip.geometry,
        "properties": {
            "id": &trip.id,
            "start_time": &trip.start_time,
            "end_time": &trip.end_time,
            "duration": &trip.duration,
            "bike_type": &trip.bike_type,
            "start_name": &trip.start_station.name,
            "start_commune": &trip.start_station.commune,
            "end_name": &trip.end_station.name,
            "end_commune": &trip.end_station.commune,
        }
    })
}

/// Build features for every record of a merged dataset.
///
/// Records that do not have the map trip shape are skipped; the second value
/// is how many were skipped.
pub fn dataset_features(records: &[Value]) -> (Vec<Value>, usize) {
    let mut skipped = 0;
    let features = records
        .iter()
        .filter_map(|record| match serde_json::from_value::<MapTrip>(record.clone()) {
            Ok(trip) => Some(trip_feature(&trip)),
            Err(e) => {
                log::debug!("Skipping record that is not a map trip: {}", e);
                skipped += 1;
                None
            }
        })
        .collect::<Vec<Value>>();

    (features, skipped)
}
