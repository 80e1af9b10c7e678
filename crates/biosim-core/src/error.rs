//! Error types for the simulation.

use crate::types::{Location, Terrain};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Map error: the map contains no rows")]
    EmptyMap,

    #[error("Map error: row {row} has {found} cells, expected {expected}")]
    InconsistentRowLength {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Map error: boundary cell {0} must be water")]
    NonWaterBoundary(Location),

    #[error("Map error: '{code}' at {location} is an unrecognized terrain code")]
    UnknownTerrainCode { code: char, location: Location },

    #[error("Unknown species: {0}")]
    UnknownSpecies(String),

    #[error("Unknown terrain: {0}")]
    UnknownTerrain(String),

    #[error("Terrain {0} has no configurable parameters")]
    NonConfigurableTerrain(Terrain),

    #[error("Unknown parameter '{name}' for {scope}")]
    UnknownParameter { scope: String, name: String },

    #[error("Invalid value {value} for parameter '{name}': {reason}")]
    InvalidParameterValue {
        name: String,
        value: f64,
        reason: String,
    },

    #[error("Location {location} is outside the {rows}x{cols} island")]
    LocationOutOfRange {
        location: Location,
        rows: usize,
        cols: usize,
    },

    #[error("Invalid animal: {0}")]
    InvalidAnimal(String),

    #[error("Location {0} is not habitable")]
    Uninhabitable(Location),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
