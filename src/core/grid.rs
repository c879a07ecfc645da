use crate::core::distance::haversine_distance;
use crate::core::utm::{self, UtmCoord};
use crate::types::{GeoError, GeoResult, GridShape, LatLonGrid, Polygon};
use ndarray::{Array1, Array2, Zip};
use serde::{Deserialize, Serialize};

/// Sizing parameters for footprint grids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridParams {
    /// Number of rows; derived from the `v0 -> v1` edge length when `None`
    pub height: Option<usize>,
    /// Number of columns; derived from the `v0 -> v3` edge length when `None`
    pub width: Option<usize>,
    /// Points per kilometer, only used for derived dimensions
    pub resolution: f64,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            height: None,
            width: None,
            resolution: 1.0,
        }
    }
}

impl GridParams {
    pub fn with_shape(shape: GridShape) -> Self {
        Self {
            height: Some(shape.height),
            width: Some(shape.width),
            ..Self::default()
        }
    }

    pub fn with_resolution(resolution: f64) -> Self {
        Self {
            resolution,
            ..Self::default()
        }
    }

    /// Resolve the grid shape for a footprint
    pub fn shape_for(&self, polygon: &Polygon) -> GeoResult<GridShape> {
        let needs_resolution = self.height.is_none() || self.width.is_none();
        if needs_resolution && !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(GeoError::InvalidParameter(format!(
                "Resolution must be a positive number of points per km, got {}",
                self.resolution
            )));
        }

        let height = match self.height {
            Some(height) => height,
            None => points_along(polygon, 1, self.resolution),
        };
        let width = match self.width {
            Some(width) => width,
            None => points_along(polygon, 3, self.resolution),
        };

        Ok(GridShape { height, width })
    }
}

/// Number of samples along the edge from vertex 0 to `to`
fn points_along(polygon: &Polygon, to: usize, resolution: f64) -> usize {
    let length_km = haversine_distance(polygon.vertex(0), polygon.vertex(to));
    (length_km * resolution).floor() as usize
}

/// Sample `i` of `n` on the half-open segment `[a, b)`
fn sample(a: f64, b: f64, i: usize, n: usize) -> f64 {
    if a == b {
        a
    } else {
        a + i as f64 * ((b - a) / n as f64)
    }
}

/// `n` evenly spaced samples from `a` towards `b`, excluding `b`.
///
/// Equal end points give a constant line.
pub fn interpolate_line(a: f64, b: f64, n: usize) -> Array1<f64> {
    Array1::from_shape_fn(n, |i| sample(a, b, i, n))
}

/// Fill a planar grid between a top and a bottom row, column by column.
///
/// A single-row grid is both its first and last row and lies on the bottom
/// edge.
fn fill_between(top: &Array1<f64>, bottom: &Array1<f64>, height: usize) -> Array2<f64> {
    let top = if height == 1 { bottom } else { top };
    Array2::from_shape_fn((height, top.len()), |(row, col)| {
        sample(top[col], bottom[col], row, height)
    })
}

/// Regular sampling grid inside a quadrilateral footprint.
///
/// The vertices are projected to UTM (zone of vertex 0), the top edge
/// (`v1 -> v2`) and bottom edge (`v0 -> v3`) are interpolated across the
/// grid width, every column is interpolated between its top and bottom
/// sample, and the planar samples are projected back to latitude/longitude.
pub fn grid_from_polygon(polygon: &Polygon, shape: GridShape) -> GeoResult<LatLonGrid> {
    let GridShape { height, width } = shape;
    if height == 0 || width == 0 {
        return Err(GeoError::InvalidShape(format!(
            "Grid dimensions must be non-zero, got {}x{}",
            height, width
        )));
    }

    let (utm_polygon, zone) = utm::from_latlon(&polygon.vertices)?;
    log::debug!("Footprint projected into UTM zone {}: {:?}", zone, utm_polygon);

    let top = (&utm_polygon[1], &utm_polygon[2]);
    let bottom = (&utm_polygon[0], &utm_polygon[3]);

    let easting = fill_between(
        &interpolate_line(top.0.easting, top.1.easting, width),
        &interpolate_line(bottom.0.easting, bottom.1.easting, width),
        height,
    );
    let northing = fill_between(
        &interpolate_line(top.0.northing, top.1.northing, width),
        &interpolate_line(bottom.0.northing, bottom.1.northing, width),
        height,
    );

    let mut lat = Array2::<f64>::zeros((height, width));
    let mut lon = Array2::<f64>::zeros((height, width));

    Zip::from(&mut lat)
        .and(&mut lon)
        .and(&easting)
        .and(&northing)
        .for_each(|lat, lon, &easting, &northing| {
            let point = utm::to_latlon(UtmCoord { easting, northing }, zone);
            *lat = point.lat;
            *lon = point.lon;
        });

    log::info!("Generated {}x{} footprint grid in UTM zone {}", height, width, zone);

    Ok(LatLonGrid { lat, lon })
}

/// Latitude/longitude grid covering an IW footprint.
///
/// Missing dimensions are derived from the footprint edge lengths and the
/// resolution in points per kilometer.
pub fn iw_latlon(polygon: &Polygon, params: &GridParams) -> GeoResult<LatLonGrid> {
    let shape = params.shape_for(polygon)?;
    log::debug!(
        "IW grid shape {}x{} (resolution {} pt/km)",
        shape.height,
        shape.width,
        params.resolution
    );
    grid_from_polygon(polygon, shape)
}

/// Positional form of [`iw_latlon`]
pub fn get_iw_latlon(
    polygon: &Polygon,
    height: Option<usize>,
    width: Option<usize>,
    resolution: f64,
) -> GeoResult<(Array2<f64>, Array2<f64>)> {
    let params = GridParams {
        height,
        width,
        resolution,
    };
    Ok(iw_latlon(polygon, &params)?.into_arrays())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn footprint() -> Polygon {
        // Roughly a Sentinel-1 IW footprint in the Bay of Biscay
        Polygon::from_latlon([
            (45.0, -4.0),
            (46.8, -4.4),
            (47.2, -1.0),
            (45.4, -0.7),
        ])
    }

    #[test]
    fn test_interpolate_line_excludes_end_point() {
        let line = interpolate_line(0.0, 10.0, 5);
        assert_eq!(line.to_vec(), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_interpolate_line_descending() {
        let line = interpolate_line(3.0, 1.0, 4);
        assert_eq!(line.to_vec(), vec![3.0, 2.5, 2.0, 1.5]);
    }

    #[test]
    fn test_interpolate_line_constant() {
        let line = interpolate_line(7.5, 7.5, 3);
        assert_eq!(line.to_vec(), vec![7.5, 7.5, 7.5]);
    }

    #[test]
    fn test_fill_between_columns() {
        let top = Array1::from(vec![0.0, 10.0]);
        let bottom = Array1::from(vec![4.0, 10.0]);
        let grid = fill_between(&top, &bottom, 2);
        assert_eq!(grid, ndarray::arr2(&[[0.0, 10.0], [2.0, 10.0]]));
    }

    #[test]
    fn test_fill_between_single_row_uses_bottom() {
        let top = Array1::from(vec![0.0, 10.0]);
        let bottom = Array1::from(vec![4.0, 6.0]);
        let grid = fill_between(&top, &bottom, 1);
        assert_eq!(grid, ndarray::arr2(&[[4.0, 6.0]]));
    }

    #[test]
    fn test_single_row_grid_lies_on_bottom_edge() {
        let polygon = footprint();
        let grid = grid_from_polygon(&polygon, GridShape::new(1, 3)).unwrap();
        assert_eq!(grid.shape(), GridShape::new(1, 3));

        let first = grid.point(0, 0);
        assert_relative_eq!(first.lat, polygon.vertex(0).lat, epsilon = 1e-6);
        assert_relative_eq!(first.lon, polygon.vertex(0).lon, epsilon = 1e-6);

        // the row heads from v0 towards v3
        let last = grid.point(0, 2);
        let v3 = polygon.vertex(3);
        assert!(last.lon > first.lon && last.lon < v3.lon);
        assert!(last.lat > first.lat && last.lat < v3.lat);
    }

    #[test]
    fn test_grid_first_sample_is_top_left_vertex() {
        let polygon = footprint();
        let grid = grid_from_polygon(&polygon, GridShape::new(20, 30)).unwrap();
        let first = grid.point(0, 0);
        assert_relative_eq!(first.lat, polygon.vertex(1).lat, epsilon = 1e-6);
        assert_relative_eq!(first.lon, polygon.vertex(1).lon, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let polygon = footprint();
        assert!(matches!(
            grid_from_polygon(&polygon, GridShape::new(0, 10)),
            Err(GeoError::InvalidShape(_))
        ));
        assert!(matches!(
            grid_from_polygon(&polygon, GridShape::new(10, 0)),
            Err(GeoError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_shape_from_resolution() {
        let polygon = footprint();
        let along = haversine_distance(polygon.vertex(0), polygon.vertex(1));
        let across = haversine_distance(polygon.vertex(0), polygon.vertex(3));

        let shape = GridParams::with_resolution(0.5).shape_for(&polygon).unwrap();
        assert_eq!(shape.height, (along * 0.5).floor() as usize);
        assert_eq!(shape.width, (across * 0.5).floor() as usize);
    }

    #[test]
    fn test_explicit_dimensions_ignore_resolution() {
        let params = GridParams {
            height: Some(3),
            width: Some(4),
            resolution: f64::NAN,
        };
        let shape = params.shape_for(&footprint()).unwrap();
        assert_eq!(shape, GridShape::new(3, 4));
    }

    #[test]
    fn test_invalid_resolution() {
        let polygon = footprint();
        for resolution in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                GridParams::with_resolution(resolution).shape_for(&polygon),
                Err(GeoError::InvalidParameter(_))
            ));
        }
    }
}
