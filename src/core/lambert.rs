//! Lambert Conformal Conic projection on a sphere.
//!
//! The projection parameters are:
//! - Origin latitude (lat0) and central meridian (lon0)
//! - Standard parallel(s): latin1 and latin2 (equal for a tangent cone)
//!
//! Map coordinates are meters east (x) and north (y) of the origin.
//!
//! The sphere has the mean Earth radius (6371 km), not the WGS84 ellipsoid
//! Basemap's `lcc` defaults to, so map-plane distances differ from Basemap's
//! by up to about 0.3%.

use crate::core::distance::EARTH_RADIUS_KM;
use crate::types::{GeoError, GeoPoint, GeoResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Cone constants below this make the projection numerically useless
const MIN_CONE_CONSTANT: f64 = 1e-10;

/// Lambert Conformal Conic projection parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LambertConformal {
    /// Central meridian in radians
    pub lon0: f64,
    /// Origin latitude in radians
    pub lat0: f64,
    /// First standard parallel in radians
    pub latin1: f64,
    /// Second standard parallel in radians
    pub latin2: f64,
    /// Sphere radius (meters)
    pub earth_radius: f64,
    /// Cone constant (n)
    n: f64,
    /// F constant
    f: f64,
    /// Rho at the origin latitude
    rho0: f64,
}

impl LambertConformal {
    /// Build a projection from angles in degrees
    pub fn new(lat0_deg: f64, lon0_deg: f64, latin1_deg: f64, latin2_deg: f64) -> GeoResult<Self> {
        let lat0 = lat0_deg.to_radians();
        let lon0 = lon0_deg.to_radians();
        let latin1 = latin1_deg.to_radians();
        let latin2 = latin2_deg.to_radians();
        let earth_radius = EARTH_RADIUS_KM * 1000.0;

        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone
            latin1.sin()
        } else {
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        if !n.is_finite() || n.abs() < MIN_CONE_CONSTANT {
            return Err(GeoError::Projection(format!(
                "Degenerate Lambert cone for standard parallels {} and {}",
                latin1_deg, latin2_deg
            )));
        }

        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;
        let rho0 = earth_radius * f / (PI / 4.0 + lat0 / 2.0).tan().powf(n);

        Ok(Self {
            lon0,
            lat0,
            latin1,
            latin2,
            earth_radius,
            n,
            f,
            rho0,
        })
    }

    /// Tangent cone touching the sphere along a single parallel
    pub fn tangent(lat0_deg: f64, lon0_deg: f64, latin_deg: f64) -> GeoResult<Self> {
        Self::new(lat0_deg, lon0_deg, latin_deg, latin_deg)
    }

    pub fn cone_constant(&self) -> f64 {
        self.n
    }

    /// Geographic point to map meters relative to the origin
    pub fn forward(&self, point: GeoPoint) -> (f64, f64) {
        let lat = point.lat.to_radians();
        let lon = point.lon.to_radians();

        // Normalize longitude difference to [-pi, pi]
        let mut dlon = lon - self.lon0;
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }

        let rho = self.earth_radius * self.f / (PI / 4.0 + lat / 2.0).tan().powf(self.n);
        let theta = self.n * dlon;

        let x = rho * theta.sin();
        let y = self.rho0 - rho * theta.cos();
        (x, y)
    }

    /// Map meters relative to the origin back to a geographic point
    pub fn inverse(&self, x: f64, y: f64) -> GeoPoint {
        let sign = self.n.signum();
        let dy = self.rho0 - y;

        let rho = sign * (x * x + dy * dy).sqrt();
        let theta = (sign * x).atan2(sign * dy);

        let lat = if rho == 0.0 {
            sign * PI / 2.0
        } else {
            2.0 * (self.earth_radius * self.f / rho).powf(1.0 / self.n).atan() - PI / 2.0
        };
        let lon = self.lon0 + theta / self.n;

        GeoPoint {
            lat: lat.to_degrees(),
            lon: lon.to_degrees(),
        }
    }
}
