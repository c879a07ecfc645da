//! Map view setup for plotting scene footprints and grids.
//!
//! A [`MapView`] holds everything a renderer needs to draw a set of
//! coordinates: the padded extent, a Lambert conformal conic projection
//! centered on the data, map-plane coordinates relative to the lower-left
//! corner, and the graticule (parallels and meridians) with label sides.

use crate::core::lambert::LambertConformal;
use crate::types::{BoundingBox, GeoError, GeoPoint, GeoResult};
use serde::{Deserialize, Serialize};

/// Standard parallels closer to the equator than this are moved away from it
const MIN_STANDARD_PARALLEL: f64 = 0.1;

/// Latitudes of the padded extent are kept inside this band
const MAX_EXTENT_LATITUDE: f64 = 89.9;

/// Coastline dataset resolution requested from the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoastlineResolution {
    Crude,
    Low,
    Intermediate,
    High,
    Full,
}

impl CoastlineResolution {
    /// Single letter code (`c`, `l`, `i`, `h`, `f`)
    pub fn code(&self) -> char {
        match self {
            CoastlineResolution::Crude => 'c',
            CoastlineResolution::Low => 'l',
            CoastlineResolution::Intermediate => 'i',
            CoastlineResolution::High => 'h',
            CoastlineResolution::Full => 'f',
        }
    }
}

/// Map view configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapViewParams {
    /// Fraction of the data span added on every side of the extent
    pub margin: f64,
    /// Spacing of parallels and meridians in degrees
    pub graticule_stride: f64,
    /// Coastline resolution
    pub resolution: CoastlineResolution,
    pub draw_coastlines: bool,
    pub draw_boundary: bool,
}

impl Default for MapViewParams {
    fn default() -> Self {
        Self {
            margin: 0.25,
            graticule_stride: 1.0,
            resolution: CoastlineResolution::Intermediate,
            draw_coastlines: true,
            draw_boundary: true,
        }
    }
}

/// Map borders on which a graticule line gets a label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LabelSides {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl LabelSides {
    /// Flags in `[left, right, top, bottom]` order, as Basemap's `labels` takes them
    pub fn as_flags(&self) -> [bool; 4] {
        [self.left, self.right, self.top, self.bottom]
    }
}

/// A single parallel (constant latitude) or meridian (constant longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraticuleLine {
    /// Latitude or longitude in degrees
    pub value: f64,
    pub labels: LabelSides,
}

/// Projected view over a set of coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapView {
    /// Bounding box of the input coordinates
    pub data_bounds: BoundingBox,
    /// Bounding box including the margin
    pub extent: BoundingBox,
    /// Projection origin (center of the data bounds)
    pub center: GeoPoint,
    /// Tangent parallel of the projection cone, degrees
    pub standard_parallel: f64,
    pub projection: LambertConformal,
    pub parallels: Vec<GraticuleLine>,
    pub meridians: Vec<GraticuleLine>,
    pub params: MapViewParams,
    /// Projected lower-left corner of the extent
    origin: (f64, f64),
    /// Map size in meters (width, height)
    size: (f64, f64),
}

impl MapView {
    /// Build a view centered on the given coordinates
    pub fn initialize(lats: &[f64], lons: &[f64], params: MapViewParams) -> GeoResult<Self> {
        if lats.is_empty() || lons.is_empty() {
            return Err(GeoError::InvalidInput(
                "Cannot build a map view from empty coordinate arrays".to_string(),
            ));
        }
        if lats.len() != lons.len() {
            return Err(GeoError::InvalidInput(format!(
                "Latitude and longitude arrays differ in length ({} vs {})",
                lats.len(),
                lons.len()
            )));
        }

        let points: Vec<GeoPoint> = lats
            .iter()
            .zip(lons)
            .map(|(&lat, &lon)| GeoPoint { lat, lon })
            .collect();
        Self::from_points(&points, params)
    }

    pub fn from_points(points: &[GeoPoint], params: MapViewParams) -> GeoResult<Self> {
        if let Some(bad) = points.iter().find(|p| !p.is_finite()) {
            return Err(GeoError::InvalidInput(format!(
                "Non-finite coordinate in map input: {:?}",
                bad
            )));
        }
        if !(params.margin.is_finite() && params.margin >= 0.0) {
            return Err(GeoError::InvalidParameter(format!(
                "Map margin must be a non-negative number, got {}",
                params.margin
            )));
        }
        if !(params.graticule_stride.is_finite() && params.graticule_stride > 0.0) {
            return Err(GeoError::InvalidParameter(format!(
                "Graticule stride must be positive, got {}",
                params.graticule_stride
            )));
        }

        let data_bounds = BoundingBox::from_points(points.iter().copied()).ok_or_else(|| {
            GeoError::InvalidInput("Cannot build a map view without coordinates".to_string())
        })?;
        let center = data_bounds.center();

        let mut extent = data_bounds.with_margin(params.margin);
        extent.min_lat = extent.min_lat.max(-MAX_EXTENT_LATITUDE);
        extent.max_lat = extent.max_lat.min(MAX_EXTENT_LATITUDE);

        let standard_parallel = choose_standard_parallel(&extent);
        let projection = LambertConformal::tangent(center.lat, center.lon, standard_parallel)?;

        let origin = projection.forward(GeoPoint {
            lat: extent.min_lat,
            lon: extent.min_lon,
        });
        let upper_right = projection.forward(GeoPoint {
            lat: extent.max_lat,
            lon: extent.max_lon,
        });
        let size = (upper_right.0 - origin.0, upper_right.1 - origin.1);

        let stride = params.graticule_stride;
        let parallels = graticule_values(extent.min_lat, extent.max_lat, stride)
            .into_iter()
            .map(|value| GraticuleLine {
                value,
                labels: LabelSides {
                    right: true,
                    top: true,
                    ..LabelSides::default()
                },
            })
            .collect();
        let meridians = graticule_values(extent.min_lon, extent.max_lon, stride)
            .into_iter()
            .map(|value| GraticuleLine {
                value,
                labels: LabelSides {
                    left: true,
                    bottom: true,
                    ..LabelSides::default()
                },
            })
            .collect();

        log::debug!(
            "Map extent lat [{:.4}, {:.4}] lon [{:.4}, {:.4}], standard parallel {:.4}",
            extent.min_lat,
            extent.max_lat,
            extent.min_lon,
            extent.max_lon,
            standard_parallel
        );
        log::info!(
            "Map view centered at ({:.4}, {:.4}), {:.1} x {:.1} km",
            center.lat,
            center.lon,
            size.0 / 1000.0,
            size.1 / 1000.0
        );

        Ok(Self {
            data_bounds,
            extent,
            center,
            standard_parallel,
            projection,
            parallels,
            meridians,
            params,
            origin,
            size,
        })
    }

    /// Map-plane coordinates in meters from the lower-left corner
    pub fn project(&self, point: GeoPoint) -> (f64, f64) {
        let (x, y) = self.projection.forward(point);
        (x - self.origin.0, y - self.origin.1)
    }

    pub fn unproject(&self, x: f64, y: f64) -> GeoPoint {
        self.projection.inverse(x + self.origin.0, y + self.origin.1)
    }

    /// Map width and height in meters
    pub fn size(&self) -> (f64, f64) {
        self.size
    }

    /// Whether `point` falls inside the projected map rectangle
    pub fn contains(&self, point: GeoPoint) -> bool {
        let (x, y) = self.project(point);
        let (width, height) = self.size;
        (0.0..=width).contains(&x) && (0.0..=height).contains(&y)
    }
}

/// Tangent parallel for the view: the northern edge of the extent, moved
/// off the equator where the cone would degenerate
fn choose_standard_parallel(extent: &BoundingBox) -> f64 {
    if extent.max_lat.abs() >= MIN_STANDARD_PARALLEL {
        extent.max_lat
    } else if extent.min_lat.abs() >= MIN_STANDARD_PARALLEL {
        extent.min_lat
    } else {
        MIN_STANDARD_PARALLEL
    }
}

/// Multiples of `stride` from `floor(min / stride)` to `floor(max / stride)`
pub fn graticule_values(min: f64, max: f64, stride: f64) -> Vec<f64> {
    let first = (min / stride).floor() as i64;
    let last = (max / stride).floor() as i64;
    (first..=last).map(|k| k as f64 * stride).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_graticule_values() {
        assert_eq!(graticule_values(43.5, 46.2, 1.0), vec![43.0, 44.0, 45.0, 46.0]);
        assert_eq!(graticule_values(-2.5, -0.5, 1.0), vec![-3.0, -2.0, -1.0]);
        assert_eq!(graticule_values(10.0, 14.9, 2.0), vec![10.0, 12.0, 14.0]);
        assert_eq!(graticule_values(3.2, 3.7, 1.0), vec![3.0]);
    }

    #[test]
    fn test_standard_parallel_avoids_equator() {
        let extent = BoundingBox {
            min_lon: 0.0,
            max_lon: 1.0,
            min_lat: -0.05,
            max_lat: 0.05,
        };
        assert_eq!(choose_standard_parallel(&extent), MIN_STANDARD_PARALLEL);

        let extent = BoundingBox {
            min_lat: -3.0,
            max_lat: 0.0,
            ..extent
        };
        assert_eq!(choose_standard_parallel(&extent), -3.0);
    }

    #[test]
    fn test_coastline_codes() {
        assert_eq!(CoastlineResolution::Intermediate.code(), 'i');
        assert_eq!(MapViewParams::default().resolution.code(), 'i');
    }

    #[test]
    fn test_lower_left_is_map_origin() {
        let view = MapView::initialize(&[44.0, 46.0], &[-4.0, -1.0], MapViewParams::default())
            .unwrap();
        let (x, y) = view.project(GeoPoint {
            lat: view.extent.min_lat,
            lon: view.extent.min_lon,
        });
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }
}
