use geo::{Distance, Haversine, Point};

use crate::trips::structs::MapTrip;

/// Great-circle distance in meters between two WGS84 points given as lng/lat.
pub fn haversine(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    Haversine::distance(Point::new(x1, y1), Point::new(x2, y2))
}

/// Straight-line length of a trip in meters, following its geometry.
pub fn trip_length(trip: &MapTrip) -> f64 {
    trip.geometry
        .to_line_string()
        .lines()
        .map(|line| haversine(line.start.x, line.start.y, line.end.x, line.end.y))
        .sum()
}

/// Summed length of the trips in kilometers.
pub fn total_length_km<'a, I>(trips: I) -> f64
where
    I: IntoIterator<Item = &'a MapTrip>,
{
    trips.into_iter().map(trip_length).sum::<f64>() / 1000.0
}
