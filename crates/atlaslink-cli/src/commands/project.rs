use serde::Serialize;
use serde_json::Value;

use atlaslink_core::{project, GeodeticCoordinate};

use crate::cli::PointArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct ProjectResponseData {
    lat: f64,
    lon: f64,
    easting: i64,
    northing: i64,
}

pub fn run(args: &PointArgs) -> Result<Value, CliError> {
    let coordinate = GeodeticCoordinate::new(args.lat, args.lon)?;
    let projected = project(&coordinate);

    Ok(serde_json::to_value(ProjectResponseData {
        lat: coordinate.lat(),
        lon: coordinate.lon(),
        easting: projected.easting(),
        northing: projected.northing(),
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn projects_munich() {
        let data = run(&PointArgs {
            lat: 48.137,
            lon: 11.575,
        })
        .expect("projection");

        assert_eq!(
            data,
            json!({"lat": 48.137, "lon": 11.575, "easting": 691567, "northing": 5334734})
        );
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        let error = run(&PointArgs {
            lat: 95.0,
            lon: 11.0,
        })
        .expect_err("invalid latitude");

        assert_eq!(error.exit_code(), 2);
    }
}
