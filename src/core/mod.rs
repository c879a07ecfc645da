//! Geometry and projection helpers

pub mod distance;
pub mod grid;
pub mod lambert;
pub mod map_view;
pub mod utm;

// Re-export main types
pub use distance::{get_distance, haversine_distance, EARTH_RADIUS_KM};
pub use grid::{get_iw_latlon, grid_from_polygon, interpolate_line, iw_latlon, GridParams};
pub use lambert::LambertConformal;
pub use map_view::{CoastlineResolution, GraticuleLine, LabelSides, MapView, MapViewParams};
pub use utm::{UtmCoord, UtmZone};
