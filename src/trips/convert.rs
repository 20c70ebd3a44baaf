use std::collections::HashSet;

use serde_json::Value;

use crate::trips::error::Error;
use crate::trips::stations::{number_text, StationIndex};
use crate::trips::structs::{BikeType, MapTrip, RawTrip, TripGeometry};

/// Counters collected while converting a batch of trips.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConversionStats {
    /// Trips whose both stations were resolved
    pub converted: usize,
    /// Trips dropped because a station id is unknown
    pub ignored: usize,
    /// Trips skipped because an earlier trip had the same id
    pub duplicates: usize,
}

/// Parse a raw trip export, which must be a JSON array of trip objects.
pub fn parse_raw_trips(doc: Value) -> Result<Vec<RawTrip>, Error> {
    match doc {
        Value::Array(_) => Ok(serde_json::from_value(doc)?),
        _ => Err(Error::NotATripArray),
    }
}

/// Reshape a raw trip into the map format.
///
/// Returns `None` when either the start or the end station is not in the index.
pub fn convert_trip(trip: &RawTrip, stations: &StationIndex) -> Option<MapTrip> {
    let start = stations.get(trip.start_station.as_ref())?;
    let end = stations.get(trip.end_station.as_ref())?;

    Some(MapTrip {
        id: trip.id.clone(),
        start_time: trip.start_date_time.clone(),
        end_time: trip.end_date_time.clone(),
        duration: trip.duration.clone(),
        bike_type: BikeType::from_raw(&trip.bike_type),
        start_station: start.clone(),
        end_station: end.clone(),
        geometry: TripGeometry::between(start, end),
    })
}

/// Key under which two trip ids count as the same trip.
///
/// Strings and numbers never collide, so `1` and `"1"` stay distinct, while
/// `1` and `1.0` are the same id.
fn dedup_key(id: Option<&Value>) -> String {
    match id {
        None => "undefined".to_string(),
        Some(Value::String(s)) => format!("s:{s}"),
        Some(Value::Number(n)) => format!("n:{}", number_text(n)),
        Some(other) => format!("j:{other}"),
    }
}

/// Convert a batch of trips, keeping input order.
///
/// With `dedup` set, a trip whose id was already seen is skipped before
/// conversion; the first occurrence wins even if it is later ignored.
pub fn convert_trips<I>(
    trips: I,
    stations: &StationIndex,
    dedup: bool,
) -> (Vec<MapTrip>, ConversionStats)
where
    I: IntoIterator<Item = RawTrip>,
{
    let mut stats = ConversionStats::default();
    let mut seen = HashSet::new();
    let mut converted = Vec::new();

    for trip in trips {
        if dedup && !seen.insert(dedup_key(trip.id.as_ref())) {
            stats.duplicates += 1;
            continue;
        }
        match convert_trip(&trip, stations) {
            Some(map_trip) => {
                stats.converted += 1;
                converted.push(map_trip);
            }
            None => stats.ignored += 1,
        }
    }

    (converted, stats)
}
