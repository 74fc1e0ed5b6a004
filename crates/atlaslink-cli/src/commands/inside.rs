use serde::Serialize;
use serde_json::Value;

use atlaslink_core::{GeodeticCoordinate, RegionPolicy};

use crate::cli::PointArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct InsideResponseData {
    lat: f64,
    lon: f64,
    inside: bool,
}

pub fn run(args: &PointArgs) -> Result<Value, CliError> {
    let coordinate = GeodeticCoordinate::new(args.lat, args.lon)?;
    let inside = RegionPolicy::bavaria().contains(&coordinate);

    Ok(serde_json::to_value(InsideResponseData {
        lat: coordinate.lat(),
        lon: coordinate.lon(),
        inside,
    })?)
}
