use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "atlaslink",
    version,
    about = "Convert map links into BayernAtlas links"
)]
pub struct Cli {
    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert a Google Maps or OpenStreetMap link.
    Convert(ConvertArgs),
    /// Project a WGS84 coordinate onto UTM zone 32N.
    #[command(allow_negative_numbers = true)]
    Project(PointArgs),
    /// Check whether a coordinate lies inside Bavaria.
    #[command(allow_negative_numbers = true)]
    Inside(PointArgs),
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    pub url: String,

    /// Timeout for resolving shortened links.
    #[arg(long, default_value_t = 5_000)]
    pub timeout_ms: u64,
}

#[derive(Debug, Args)]
pub struct PointArgs {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_takes_url_and_timeout() {
        let cli = Cli::try_parse_from([
            "atlaslink",
            "convert",
            "https://goo.gl/maps/x",
            "--timeout-ms",
            "250",
            "--pretty",
        ])
        .expect("parse");

        assert!(cli.pretty);
        match cli.command {
            Command::Convert(args) => {
                assert_eq!(args.url, "https://goo.gl/maps/x");
                assert_eq!(args.timeout_ms, 250);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn point_commands_accept_negative_degrees() {
        let cli = Cli::try_parse_from(["atlaslink", "project", "-33.86", "-151.2"]).expect("parse");

        match cli.command {
            Command::Project(point) => {
                assert_eq!(point.lat, -33.86);
                assert_eq!(point.lon, -151.2);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn non_numeric_coordinates_are_rejected() {
        assert!(Cli::try_parse_from(["atlaslink", "inside", "north", "11.5"]).is_err());
    }
}
