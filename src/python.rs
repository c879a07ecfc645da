//! Python bindings for notebook use.
//!
//! Polygons cross the boundary as `(4, 2)` float arrays whose rows are
//! `(lon, lat)`, the layout used by the analysis notebooks.

use crate::core::{GraticuleLine, GridParams, MapView, MapViewParams};
use crate::io::{MetadataIndex, DEFAULT_METADATA_PATH};
use crate::types::{GeoError, GeoPoint, GridShape, Polygon};
use ndarray::Array2;
use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2};
use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

fn to_py_err(e: GeoError) -> PyErr {
    match e {
        GeoError::Io(_) => PyErr::new::<PyIOError, _>(format!("{}", e)),
        GeoError::InvalidInput(_)
        | GeoError::InvalidShape(_)
        | GeoError::InvalidParameter(_)
        | GeoError::InvalidFormat(_) => PyErr::new::<PyValueError, _>(format!("{}", e)),
        _ => PyErr::new::<PyRuntimeError, _>(format!("{}", e)),
    }
}

fn polygon_from_numpy(polygon: PyReadonlyArray2<f64>) -> PyResult<Polygon> {
    let view = polygon.as_array();
    if view.dim() != (4, 2) {
        return Err(PyValueError::new_err(format!(
            "Polygon must have shape (4, 2), got {:?}",
            view.dim()
        )));
    }
    Ok(Polygon::new(std::array::from_fn(|i| GeoPoint {
        lat: view[[i, 1]],
        lon: view[[i, 0]],
    })))
}

fn polygon_to_numpy<'py>(py: Python<'py>, polygon: &Polygon) -> &'py PyArray2<f64> {
    Array2::from_shape_fn((4, 2), |(i, j)| {
        let vertex = polygon.vertex(i);
        if j == 0 {
            vertex.lon
        } else {
            vertex.lat
        }
    })
    .into_pyarray(py)
}

/// Haversine distance in kilometers
#[pyfunction]
fn get_distance(
    source_latitude: f64,
    source_longitude: f64,
    target_latitude: f64,
    target_longitude: f64,
) -> f64 {
    crate::core::get_distance(
        source_latitude,
        source_longitude,
        target_latitude,
        target_longitude,
    )
}

/// Latitude/longitude grid of the given shape inside a footprint
#[pyfunction]
fn grid_from_polygon<'py>(
    py: Python<'py>,
    polygon: PyReadonlyArray2<f64>,
    shape: (usize, usize),
) -> PyResult<(&'py PyArray2<f64>, &'py PyArray2<f64>)> {
    let polygon = polygon_from_numpy(polygon)?;
    let grid = crate::core::grid_from_polygon(&polygon, GridShape::from(shape)).map_err(to_py_err)?;
    let (lat, lon) = grid.into_arrays();
    Ok((lat.into_pyarray(py), lon.into_pyarray(py)))
}

/// Footprint grid sized from the edge lengths unless height/width are given
#[pyfunction]
#[pyo3(signature = (polygon, height=None, width=None, resolution=1.0))]
fn get_iw_latlon<'py>(
    py: Python<'py>,
    polygon: PyReadonlyArray2<f64>,
    height: Option<usize>,
    width: Option<usize>,
    resolution: f64,
) -> PyResult<(&'py PyArray2<f64>, &'py PyArray2<f64>)> {
    let polygon = polygon_from_numpy(polygon)?;
    let params = GridParams {
        height,
        width,
        resolution,
    };
    let grid = crate::core::iw_latlon(&polygon, &params).map_err(to_py_err)?;
    let (lat, lon) = grid.into_arrays();
    Ok((lat.into_pyarray(py), lon.into_pyarray(py)))
}

fn graticule_to_py(py: Python, lines: &[GraticuleLine]) -> PyResult<PyObject> {
    let result = PyDict::new(py);
    result.set_item(
        "values",
        lines.iter().map(|line| line.value).collect::<Vec<_>>(),
    )?;
    result.set_item(
        "labels",
        lines.iter().map(|line| line.labels.as_flags()).collect::<Vec<_>>(),
    )?;
    Ok(result.into())
}

/// Map view description: extent, projection parameters and graticule
#[pyfunction]
fn initialize_map(py: Python, lats: Vec<f64>, lons: Vec<f64>) -> PyResult<PyObject> {
    let view = MapView::initialize(&lats, &lons, MapViewParams::default()).map_err(to_py_err)?;
    let extent = &view.extent;

    let result = PyDict::new(py);
    result.set_item("projection", "lcc")?;
    result.set_item("resolution", view.params.resolution.code().to_string())?;
    result.set_item("llcrnrlon", extent.min_lon)?;
    result.set_item("llcrnrlat", extent.min_lat)?;
    result.set_item("urcrnrlon", extent.max_lon)?;
    result.set_item("urcrnrlat", extent.max_lat)?;
    result.set_item("lon_0", view.center.lon)?;
    result.set_item("lat_0", view.center.lat)?;
    result.set_item("lat_1", view.standard_parallel)?;
    result.set_item("parallels", graticule_to_py(py, &view.parallels)?)?;
    result.set_item("meridians", graticule_to_py(py, &view.meridians)?)?;
    result.set_item("draw_coastlines", view.params.draw_coastlines)?;
    result.set_item("draw_boundary", view.params.draw_boundary)?;
    result.set_item("size", view.size())?;

    Ok(result.into())
}

/// Python wrapper for MetadataIndex
#[pyclass(name = "MetadataIndex")]
struct PyMetadataIndex {
    inner: MetadataIndex,
}

#[pymethods]
impl PyMetadataIndex {
    #[new]
    #[pyo3(signature = (path=None))]
    fn new(path: Option<String>) -> PyResult<Self> {
        let path = path.unwrap_or_else(|| DEFAULT_METADATA_PATH.to_string());
        let inner = MetadataIndex::load(&path).map_err(to_py_err)?;
        Ok(PyMetadataIndex { inner })
    }

    /// `(filename, polygon, orbit_direction)` for a scene key, or None
    fn get<'py>(
        &self,
        py: Python<'py>,
        key: &str,
    ) -> Option<(String, &'py PyArray2<f64>, String)> {
        self.inner.get(key).map(|record| {
            (
                record.filename.clone(),
                polygon_to_numpy(py, &record.polygon),
                record.orbit_direction.clone(),
            )
        })
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys().map(str::to_string).collect()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __contains__(&self, key: &str) -> bool {
        self.inner.get(key).is_some()
    }
}

/// Python module definition
#[pymodule]
fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyMetadataIndex>()?;
    m.add_function(wrap_pyfunction!(get_distance, m)?)?;
    m.add_function(wrap_pyfunction!(grid_from_polygon, m)?)?;
    m.add_function(wrap_pyfunction!(get_iw_latlon, m)?)?;
    m.add_function(wrap_pyfunction!(initialize_map, m)?)?;
    Ok(())
}
