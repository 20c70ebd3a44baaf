//! Load, merge, back up and write the trip dataset.

pub mod dataset;
pub mod error;
pub mod geo_util;
pub mod merge;
