use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Geodetic coordinate in degrees (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

impl From<(f64, f64)> for GeoPoint {
    /// Build from a `(lat, lon)` tuple
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

/// Quadrilateral scene footprint.
///
/// Vertex order matters for grid generation: `v1 -> v2` is the first
/// (top) grid row, `v0 -> v3` the last (bottom) one. The `v0 -> v1` edge
/// sets the grid height, `v0 -> v3` the width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: [GeoPoint; 4],
}

impl Polygon {
    pub fn new(vertices: [GeoPoint; 4]) -> Self {
        Self { vertices }
    }

    /// Build from `(lat, lon)` pairs
    pub fn from_latlon(pairs: [(f64, f64); 4]) -> Self {
        Self {
            vertices: pairs.map(GeoPoint::from),
        }
    }

    pub fn vertex(&self, index: usize) -> GeoPoint {
        self.vertices[index]
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.vertices[1..]
            .iter()
            .fold(BoundingBox::around(self.vertices[0]), |bbox, p| bbox.include(*p))
    }
}

impl TryFrom<Vec<GeoPoint>> for Polygon {
    type Error = GeoError;

    fn try_from(points: Vec<GeoPoint>) -> GeoResult<Self> {
        let count = points.len();
        let vertices: [GeoPoint; 4] = points.try_into().map_err(|_| {
            GeoError::InvalidInput(format!("Polygon needs 4 vertices, got {}", count))
        })?;
        Ok(Self { vertices })
    }
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Smallest box holding every point, `None` for an empty iterator
    pub fn from_points<I: IntoIterator<Item = GeoPoint>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::around(first), Self::include))
    }

    /// Degenerate box covering a single point
    pub fn around(point: GeoPoint) -> Self {
        Self {
            min_lon: point.lon,
            max_lon: point.lon,
            min_lat: point.lat,
            max_lat: point.lat,
        }
    }

    pub fn include(self, point: GeoPoint) -> Self {
        Self {
            min_lon: self.min_lon.min(point.lon),
            max_lon: self.max_lon.max(point.lon),
            min_lat: self.min_lat.min(point.lat),
            max_lat: self.max_lat.max(point.lat),
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lat: (self.max_lat + self.min_lat) / 2.0,
            lon: (self.max_lon + self.min_lon) / 2.0,
        }
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Grow every side by `margin` times the span of its axis
    pub fn with_margin(&self, margin: f64) -> Self {
        let delta_lat = self.lat_span() * margin;
        let delta_lon = self.lon_span() * margin;
        Self {
            min_lon: self.min_lon - delta_lon,
            max_lon: self.max_lon + delta_lon,
            min_lat: self.min_lat - delta_lat,
            max_lat: self.max_lat + delta_lat,
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lon..=self.max_lon).contains(&point.lon)
    }
}

/// Target grid dimensions (rows, columns)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub height: usize,
    pub width: usize,
}

impl GridShape {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }
}

impl From<(usize, usize)> for GridShape {
    fn from((height, width): (usize, usize)) -> Self {
        Self { height, width }
    }
}

/// Latitude and longitude of every sample of a footprint grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLonGrid {
    pub lat: Array2<f64>,
    pub lon: Array2<f64>,
}

impl LatLonGrid {
    pub fn shape(&self) -> GridShape {
        let (height, width) = self.lat.dim();
        GridShape { height, width }
    }

    pub fn point(&self, row: usize, col: usize) -> GeoPoint {
        GeoPoint {
            lat: self.lat[[row, col]],
            lon: self.lon[[row, col]],
        }
    }

    pub fn into_arrays(self) -> (Array2<f64>, Array2<f64>) {
        (self.lat, self.lon)
    }
}

/// Satellite pass direction of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrbitDirection {
    Ascending,
    Descending,
}

impl std::fmt::Display for OrbitDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrbitDirection::Ascending => write!(f, "ASCENDING"),
            OrbitDirection::Descending => write!(f, "DESCENDING"),
        }
    }
}

impl std::str::FromStr for OrbitDirection {
    type Err = GeoError;

    fn from_str(s: &str) -> GeoResult<Self> {
        match s.to_uppercase().as_str() {
            "ASCENDING" | "ASC" | "A" => Ok(OrbitDirection::Ascending),
            "DESCENDING" | "DESC" | "D" => Ok(OrbitDirection::Descending),
            _ => Err(GeoError::InvalidFormat(format!(
                "Unknown orbit direction: {}",
                s
            ))),
        }
    }
}

/// Error types for footprint geometry and metadata handling
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid grid shape: {0}")]
    InvalidShape(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Projection error: {0}")]
    Projection(String),

    #[error("Metadata error (line {line}): {message}")]
    Metadata { line: usize, message: String },
}

/// Result type for footprint operations
pub type GeoResult<T> = Result<T, GeoError>;
