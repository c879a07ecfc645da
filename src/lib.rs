//! s1footprint: geospatial helpers for Sentinel-1 scene footprints
//!
//! Great-circle distances, UTM sampling grids inside quadrilateral
//! footprints, map views for plotting, and scene polygon lookup from a
//! metadata listing.

pub mod types;
pub mod io;
pub mod core;

#[cfg(feature = "python")]
mod python;

// Re-export main types and functions for easier access
pub use crate::types::{
    BoundingBox, GeoError, GeoPoint, GeoResult, GridShape, LatLonGrid, OrbitDirection, Polygon,
};

pub use crate::core::{
    get_distance, get_iw_latlon, grid_from_polygon, haversine_distance, iw_latlon, GridParams,
    MapView, MapViewParams,
};

pub use crate::io::{polygon_getter, MetadataIndex, ProductRecord};
