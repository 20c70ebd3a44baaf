use thiserror::Error;

/// An error that can occur when reading station or trip records.
#[derive(Error, Debug)]
pub enum Error {
    /// A station feature is missing its `properties` object
    #[error("station feature #{0} has no properties")]
    MissingProperties(usize),
    /// A station feature does not carry a `[lng, lat]` point
    #[error("station feature #{index} has invalid coordinates: {reason}")]
    InvalidCoordinates {
        /// Position of the feature in the collection
        index: usize,
        /// What was wrong with the geometry
        reason: String,
    },
    /// The trip file is not a JSON array of trips
    #[error("expected a JSON array of trips")]
    NotATripArray,
    /// A record could not be (de)serialized
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}
