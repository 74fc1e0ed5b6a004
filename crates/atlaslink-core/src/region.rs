//! Regional boundary and point-in-polygon containment.

use std::sync::Arc;

use crate::domain::GeodeticCoordinate;
use crate::ValidationError;

const MIN_RING_VERTICES: usize = 3;

/// Bavaria, buffered roughly 5 km beyond the state border so that
/// BayernAtlas coverage of neighbouring areas is not cut off. `(lon, lat)`.
pub const BAVARIA_BUFFER: [(f64, f64); 55] = [
    (8.90, 50.10),
    (9.35, 50.30),
    (9.85, 50.50),
    (10.40, 50.50),
    (10.85, 50.60),
    (11.50, 50.55),
    (12.00, 50.50),
    (12.15, 50.40),
    (12.35, 50.15),
    (12.60, 50.00),
    (12.85, 50.00),
    (13.10, 49.80),
    (13.25, 49.60),
    (13.50, 49.40),
    (13.60, 49.20),
    (13.65, 49.00),
    (13.85, 48.85),
    (13.95, 48.70),
    (13.90, 48.55),
    (13.85, 48.40),
    (13.55, 48.20),
    (13.10, 48.20),
    (12.95, 48.15),
    (12.80, 47.90),
    (13.10, 47.75),
    (12.95, 47.60),
    (12.80, 47.55),
    (12.50, 47.55),
    (12.25, 47.50),
    (12.00, 47.35),
    (11.50, 47.38),
    (11.20, 47.28),
    (10.90, 47.28),
    (10.70, 47.40),
    (10.40, 47.45),
    (10.10, 47.38),
    (10.00, 47.45),
    (9.90, 47.43),
    (9.60, 47.43),
    (9.40, 47.45),
    (9.45, 47.70),
    (9.60, 47.85),
    (9.65, 48.00),
    (9.75, 48.20),
    (9.90, 48.35),
    (9.95, 48.55),
    (9.85, 48.75),
    (9.80, 48.95),
    (9.60, 49.15),
    (9.35, 49.30),
    (9.30, 49.50),
    (9.25, 49.70),
    (9.10, 49.80),
    (8.95, 49.95),
    (8.90, 50.10),
];

/// Closed polygon of `(lon, lat)` vertices.
///
/// The first vertex is treated as adjacent to the last; repeating it at the
/// end is allowed but not required.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryRing {
    vertices: Vec<(f64, f64)>,
}

impl BoundaryRing {
    pub fn new(vertices: Vec<(f64, f64)>) -> Result<Self, ValidationError> {
        if vertices.len() < MIN_RING_VERTICES {
            return Err(ValidationError::BoundaryTooSmall {
                len: vertices.len(),
                min: MIN_RING_VERTICES,
            });
        }
        for (lon, lat) in &vertices {
            if !lon.is_finite() {
                return Err(ValidationError::NonFiniteValue { field: "lon" });
            }
            if !lat.is_finite() {
                return Err(ValidationError::NonFiniteValue { field: "lat" });
            }
        }
        Ok(Self { vertices })
    }

    /// The buffered Bavaria ring.
    pub fn bavaria() -> Self {
        Self {
            vertices: BAVARIA_BUFFER.to_vec(),
        }
    }

    pub fn vertices(&self) -> &[(f64, f64)] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains(&self, coord: &GeodeticCoordinate) -> bool {
        ring_contains(&self.vertices, coord.lat(), coord.lon())
    }
}

/// Ray-casting parity test: a ray cast east from the point toggles on every
/// edge it crosses. Points exactly on an edge get whatever parity yields.
pub fn ring_contains(ring: &[(f64, f64)], lat: f64, lon: f64) -> bool {
    let Some(&last) = ring.last() else {
        return false;
    };

    let mut inside = false;
    let (mut xj, mut yj) = last;
    for &(xi, yi) in ring {
        if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        xj = xi;
        yj = yi;
    }
    inside
}

/// A named region with its boundary, shared immutably across requests.
#[derive(Debug, Clone)]
pub struct RegionPolicy {
    name: String,
    ring: Arc<BoundaryRing>,
}

impl RegionPolicy {
    pub fn new(name: impl Into<String>, ring: BoundaryRing) -> Self {
        Self {
            name: name.into(),
            ring: Arc::new(ring),
        }
    }

    pub fn bavaria() -> Self {
        Self::new("Bavaria", BoundaryRing::bavaria())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ring(&self) -> &BoundaryRing {
        &self.ring
    }

    pub fn contains(&self, coord: &GeodeticCoordinate) -> bool {
        self.ring.contains(coord)
    }
}

impl Default for RegionPolicy {
    fn default() -> Self {
        Self::bavaria()
    }
}
