use crate::domain::ProjectedCoordinate;

const BAYERNATLAS_BASE: &str = "https://atlas.bayern.de/";

/// Deep link into the BayernAtlas viewer, centred on a projected coordinate
/// at zoom 16 over the ATKIS base map with a crosshair marker.
pub fn bayernatlas_url(projected: &ProjectedCoordinate) -> String {
    format!(
        "{BAYERNATLAS_BASE}?c={},{}&z=16&r=0&l=atkis&crh=true&mid=1",
        projected.easting(),
        projected.northing()
    )
}
