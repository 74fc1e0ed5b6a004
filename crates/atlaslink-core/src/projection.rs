//! Closed-form transverse-Mercator forward projection.
//!
//! The default parameters describe ETRS89 / UTM zone 32N on the GRS80
//! ellipsoid, the grid BayernAtlas expects. The series is the classic
//! Snyder forward expansion; no iteration is involved.

use crate::domain::{GeodeticCoordinate, ProjectedCoordinate};

/// Ellipsoid and grid constants of one transverse-Mercator zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionParams {
    /// Semi-major axis `a` in meters.
    pub semi_major_axis: f64,
    /// Inverse flattening `1/f`.
    pub inverse_flattening: f64,
    /// Scale factor `k0` on the central meridian.
    pub scale_factor: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    /// Central meridian in degrees.
    pub central_meridian: f64,
}

impl ProjectionParams {
    /// GRS80 ellipsoid, zone 32 north.
    pub const ETRS89_UTM32N: Self = Self {
        semi_major_axis: 6_378_137.0,
        inverse_flattening: 298.257_222_101,
        scale_factor: 0.9996,
        false_easting: 500_000.0,
        false_northing: 0.0,
        central_meridian: 9.0,
    };
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self::ETRS89_UTM32N
    }
}

/// Geodetic to projected coordinate transformer with precomputed
/// eccentricity terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformer {
    params: ProjectionParams,
    e2: f64,
    ep2: f64,
    central_meridian_rad: f64,
    arc_coefficients: [f64; 4],
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new(ProjectionParams::default())
    }
}

impl Transformer {
    pub fn new(params: ProjectionParams) -> Self {
        let f = 1.0 / params.inverse_flattening;
        let e2 = 2.0 * f - f * f;
        let ep2 = e2 / (1.0 - e2);
        let e4 = e2 * e2;
        let e6 = e4 * e2;

        let arc_coefficients = [
            1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0,
            3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0,
            15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0,
            35.0 * e6 / 3072.0,
        ];

        Self {
            params,
            e2,
            ep2,
            central_meridian_rad: params.central_meridian.to_radians(),
            arc_coefficients,
        }
    }

    pub const fn params(&self) -> &ProjectionParams {
        &self.params
    }

    /// First eccentricity squared.
    pub const fn eccentricity_squared(&self) -> f64 {
        self.e2
    }

    /// Project a coordinate onto the grid, rounded to whole meters.
    ///
    /// Out-of-range input (poles, far-off meridians) yields meaningless but
    /// finite-or-saturated values; it never panics.
    pub fn project(&self, coord: &GeodeticCoordinate) -> ProjectedCoordinate {
        let (easting, northing) = self.project_meters(coord);
        ProjectedCoordinate::from_meters(easting, northing)
    }

    /// Unrounded easting and northing in meters.
    pub fn project_meters(&self, coord: &GeodeticCoordinate) -> (f64, f64) {
        let p = &self.params;
        let phi = coord.lat().to_radians();
        let lambda = coord.lon().to_radians();

        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = phi.tan();

        let n = p.semi_major_axis / (1.0 - self.e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = self.ep2 * cos_phi * cos_phi;
        let a = (lambda - self.central_meridian_rad) * cos_phi;
        let m = self.meridional_arc(phi);

        let a2 = a * a;
        let a3 = a2 * a;
        let a4 = a3 * a;
        let a5 = a4 * a;
        let a6 = a5 * a;

        let easting = p.false_easting
            + p.scale_factor
                * n
                * (a + (1.0 - t + c) * a3 / 6.0
                    + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * self.ep2) * a5 / 120.0);

        let northing = p.false_northing
            + p.scale_factor
                * (m + n
                    * tan_phi
                    * (a2 / 2.0
                        + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                        + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * self.ep2) * a6
                            / 720.0));

        (easting, northing)
    }

    /// Meridional arc length from the equator to latitude `phi` (radians).
    fn meridional_arc(&self, phi: f64) -> f64 {
        let [c0, c2, c4, c6] = self.arc_coefficients;
        self.params.semi_major_axis
            * (c0 * phi - c2 * (2.0 * phi).sin() + c4 * (4.0 * phi).sin()
                - c6 * (6.0 * phi).sin())
    }
}

/// Project with the default zone 32N transformer.
pub fn project(coord: &GeodeticCoordinate) -> ProjectedCoordinate {
    Transformer::default().project(coord)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> GeodeticCoordinate {
        GeodeticCoordinate::new(lat, lon).expect("valid coordinate")
    }

    #[test]
    fn munich_reference_vector() {
        let projected = project(&coord(48.137, 11.575));
        assert_eq!(projected.easting(), 691_567);
        assert_eq!(projected.northing(), 5_334_734);
    }

    #[test]
    fn equator_on_central_meridian_maps_to_false_origin() {
        let projected = project(&coord(0.0, 9.0));
        assert_eq!(projected.easting(), 500_000);
        assert_eq!(projected.northing(), 0);
    }

    #[test]
    fn central_meridian_keeps_false_easting() {
        let projected = project(&coord(50.0, 9.0));
        assert_eq!(projected.easting(), 500_000);
        assert_eq!(projected.northing(), 5_538_631);
    }

    #[test]
    fn easting_is_symmetric_about_central_meridian() {
        let transformer = Transformer::default();
        let (east, north_east) = transformer.project_meters(&coord(48.5, 10.0));
        let (west, north_west) = transformer.project_meters(&coord(48.5, 8.0));

        assert!((east - 500_000.0 + (west - 500_000.0)).abs() < 1e-6);
        assert!((north_east - north_west).abs() < 1e-6);
    }

    #[test]
    fn grs80_eccentricity() {
        let transformer = Transformer::default();
        assert!((transformer.eccentricity_squared() - 0.006_694_380_022_9).abs() < 1e-12);
    }

    #[test]
    fn custom_params_shift_the_false_origin() {
        let transformer = Transformer::new(ProjectionParams {
            false_easting: 32_500_000.0,
            ..ProjectionParams::ETRS89_UTM32N
        });
        let projected = transformer.project(&coord(48.137, 11.575));
        assert_eq!(projected.easting(), 32_691_567);
    }

    #[test]
    fn pole_input_does_not_panic() {
        let transformer = Transformer::default();
        let _ = transformer.project(&GeodeticCoordinate::new_unchecked(90.0, 9.0));
        let _ = transformer.project(&GeodeticCoordinate::new_unchecked(123.0, 400.0));
    }
}
