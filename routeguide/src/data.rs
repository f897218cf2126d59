//! The JSON feature database.

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::pb;

/// Path of the bundled database, relative to the workspace root.
pub const DEFAULT_DB: &str = "routeguide/data/route_guide_db.json";

#[derive(Debug, Deserialize)]
struct Feature {
    location: Location,
    name: String,
}

#[derive(Debug, Deserialize)]
struct Location {
    latitude: i32,
    longitude: i32,
}

/// Load every feature stored in the file at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<pb::Feature>> {
    let file = std::fs::File::open(path.as_ref())?;
    parse(std::io::BufReader::new(file))
}

/// Parse a feature database from `reader`.
pub fn parse(reader: impl std::io::Read) -> Result<Vec<pb::Feature>> {
    let decoded: Vec<Feature> = serde_json::from_reader(reader)?;

    Ok(decoded
        .into_iter()
        .map(|feature| pb::Feature {
            name: feature.name,
            location: Some(pb::Point {
                longitude: feature.location.longitude,
                latitude: feature.location.latitude,
            }),
        })
        .collect())
}
