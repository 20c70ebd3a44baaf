//! Trip records, the station index and the raw-to-map conversion.

pub mod convert;
pub mod error;
pub mod geojson;
pub mod stations;
pub mod structs;
