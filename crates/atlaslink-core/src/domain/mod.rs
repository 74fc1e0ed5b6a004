//! Domain value types shared by extraction, projection, and containment.

mod coordinate;

pub use coordinate::{GeodeticCoordinate, ProjectedCoordinate};
