//! Universal Transverse Mercator projection on the WGS84 ellipsoid.
//!
//! Footprint grids are interpolated in UTM meters rather than in degrees.
//! The forward and inverse transforms use the usual series expansions
//! (Krüger / Snyder), accurate to well below a millimeter inside a zone and
//! still usable a few degrees outside of it, which matters for footprints
//! straddling a zone boundary: every vertex is projected in the zone of the
//! first one.

use crate::types::{GeoError, GeoPoint, GeoResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Scale factor at the central meridian
const K0: f64 = 0.9996;
/// WGS84 semi-major axis (m)
const R: f64 = 6_378_137.0;
/// WGS84 first eccentricity squared
const E: f64 = 0.006_694_38;
const E2: f64 = E * E;
const E3: f64 = E2 * E;
const E_P2: f64 = E / (1.0 - E);

const M1: f64 = 1.0 - E / 4.0 - 3.0 * E2 / 64.0 - 5.0 * E3 / 256.0;
const M2: f64 = 3.0 * E / 8.0 + 3.0 * E2 / 32.0 + 45.0 * E3 / 1024.0;
const M3: f64 = 15.0 * E2 / 256.0 + 45.0 * E3 / 1024.0;
const M4: f64 = 35.0 * E3 / 3072.0;

const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Latitude band letters, 8 degrees each from 80S; `X` spans 72N..84N
const ZONE_LETTERS: &[u8] = b"CDEFGHJKLMNPQRSTUVWXX";

/// UTM zone designator, e.g. `31U`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UtmZone {
    pub number: u8,
    pub letter: char,
}

impl UtmZone {
    pub fn new(number: u8, letter: char) -> GeoResult<Self> {
        if !(1..=60).contains(&number) {
            return Err(GeoError::Projection(format!(
                "UTM zone number must be 1-60, got {}",
                number
            )));
        }
        let letter = letter.to_ascii_uppercase();
        if !ZONE_LETTERS.contains(&(letter as u8)) {
            return Err(GeoError::Projection(format!(
                "Invalid UTM zone letter: {}",
                letter
            )));
        }
        Ok(Self { number, letter })
    }

    /// Zone containing `point`, including the Norway and Svalbard exceptions
    pub fn containing(point: GeoPoint) -> GeoResult<Self> {
        check_latlon(point)?;
        let letter = zone_letter(point.lat).ok_or_else(|| {
            GeoError::Projection(format!("Latitude {} outside UTM range", point.lat))
        })?;
        Ok(Self {
            number: zone_number(point.lat, point.lon),
            letter,
        })
    }

    pub fn is_northern(&self) -> bool {
        self.letter >= 'N'
    }

    /// Longitude of the zone's central meridian in degrees
    pub fn central_longitude(&self) -> f64 {
        central_longitude(self.number)
    }
}

impl std::fmt::Display for UtmZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.number, self.letter)
    }
}

/// Planar UTM coordinate in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtmCoord {
    pub easting: f64,
    pub northing: f64,
}

impl UtmCoord {
    pub fn new(easting: f64, northing: f64) -> Self {
        Self { easting, northing }
    }
}

pub fn zone_number(lat: f64, lon: f64) -> u8 {
    if (56.0..64.0).contains(&lat) && (3.0..12.0).contains(&lon) {
        return 32;
    }

    if (72.0..=84.0).contains(&lat) && lon >= 0.0 {
        if lon < 9.0 {
            return 31;
        } else if lon < 21.0 {
            return 33;
        } else if lon < 33.0 {
            return 35;
        } else if lon < 42.0 {
            return 37;
        }
    }

    if lon == 180.0 {
        return 60;
    }

    (((lon + 180.0) / 6.0).floor() as i64).rem_euclid(60) as u8 + 1
}

pub fn zone_letter(lat: f64) -> Option<char> {
    if (-80.0..=84.0).contains(&lat) {
        let band = ((lat + 80.0) as usize) >> 3;
        Some(ZONE_LETTERS[band] as char)
    } else {
        None
    }
}

pub fn central_longitude(zone_number: u8) -> f64 {
    (zone_number as f64 - 1.0) * 6.0 - 180.0 + 3.0
}

/// Wrap an angle in radians into `[-pi, pi)`
fn mod_angle(value: f64) -> f64 {
    (value + PI).rem_euclid(2.0 * PI) - PI
}

fn check_latlon(point: GeoPoint) -> GeoResult<()> {
    if !(-80.0..=84.0).contains(&point.lat) {
        return Err(GeoError::Projection(format!(
            "Latitude must be between -80 and 84 deg, got {}",
            point.lat
        )));
    }
    if !(-180.0..=180.0).contains(&point.lon) {
        return Err(GeoError::Projection(format!(
            "Longitude must be between -180 and 180 deg, got {}",
            point.lon
        )));
    }
    Ok(())
}

/// Project a single point into a given zone without hemisphere handling
fn project_in_zone(point: GeoPoint, zone: UtmZone) -> UtmCoord {
    let lat_rad = point.lat.to_radians();
    let lat_sin = lat_rad.sin();
    let lat_cos = lat_rad.cos();

    let lat_tan = lat_sin / lat_cos;
    let lat_tan2 = lat_tan * lat_tan;
    let lat_tan4 = lat_tan2 * lat_tan2;

    let lon_rad = point.lon.to_radians();
    let central_lon_rad = zone.central_longitude().to_radians();

    let n = R / (1.0 - E * lat_sin * lat_sin).sqrt();
    let c = E_P2 * lat_cos * lat_cos;

    let a = lat_cos * mod_angle(lon_rad - central_lon_rad);
    let a2 = a * a;
    let a3 = a2 * a;
    let a4 = a3 * a;
    let a5 = a4 * a;
    let a6 = a5 * a;

    // Meridian arc length
    let m = R
        * (M1 * lat_rad - M2 * (2.0 * lat_rad).sin() + M3 * (4.0 * lat_rad).sin()
            - M4 * (6.0 * lat_rad).sin());

    let easting = K0
        * n
        * (a + a3 / 6.0 * (1.0 - lat_tan2 + c)
            + a5 / 120.0 * (5.0 - 18.0 * lat_tan2 + lat_tan4 + 72.0 * c - 58.0 * E_P2))
        + FALSE_EASTING;

    let northing = K0
        * (m + n
            * lat_tan
            * (a2 / 2.0
                + a4 / 24.0 * (5.0 - lat_tan2 + 9.0 * c + 4.0 * c * c)
                + a6 / 720.0 * (61.0 - 58.0 * lat_tan2 + lat_tan4 + 600.0 * c - 330.0 * E_P2)));

    UtmCoord { easting, northing }
}

/// Project points to UTM.
///
/// The zone is derived from the first point and forced on the others, so
/// all outputs share one planar frame. Points must lie in one hemisphere.
pub fn from_latlon(points: &[GeoPoint]) -> GeoResult<(Vec<UtmCoord>, UtmZone)> {
    let first = *points
        .first()
        .ok_or_else(|| GeoError::InvalidInput("No points to project".to_string()))?;
    let zone = UtmZone::containing(first)?;
    let coords = from_latlon_in_zone(points, zone)?;
    Ok((coords, zone))
}

/// Project points into an explicit zone
pub fn from_latlon_in_zone(points: &[GeoPoint], zone: UtmZone) -> GeoResult<Vec<UtmCoord>> {
    for point in points {
        check_latlon(*point)?;
    }

    let negative = points.iter().filter(|p| p.lat < 0.0).count();
    if negative != 0 && negative != points.len() {
        return Err(GeoError::Projection(
            "Latitudes must all have the same sign".to_string(),
        ));
    }
    let southern = negative != 0;

    log::debug!("Projecting {} point(s) into UTM zone {}", points.len(), zone);

    Ok(points
        .iter()
        .map(|p| {
            let mut coord = project_in_zone(*p, zone);
            if southern {
                coord.northing += FALSE_NORTHING_SOUTH;
            }
            coord
        })
        .collect())
}

/// Inverse projection.
///
/// Non-strict: easting and northing are not checked against the nominal
/// zone extent, so samples slightly outside the zone still convert.
pub fn to_latlon(coord: UtmCoord, zone: UtmZone) -> GeoPoint {
    let x = coord.easting - FALSE_EASTING;
    let mut y = coord.northing;
    if !zone.is_northern() {
        y -= FALSE_NORTHING_SOUTH;
    }

    let m = y / K0;
    let mu = m / (R * M1);
    let p_rad = inverse_footprint_latitude(mu);

    let p_sin = p_rad.sin();
    let p_sin2 = p_sin * p_sin;
    let p_cos = p_rad.cos();

    let p_tan = p_sin / p_cos;
    let p_tan2 = p_tan * p_tan;
    let p_tan4 = p_tan2 * p_tan2;

    let ep_sin = 1.0 - E * p_sin2;
    let ep_sin_sqrt = ep_sin.sqrt();

    let n = R / ep_sin_sqrt;
    let r = (1.0 - E) / ep_sin;

    let c = E_P2 * p_cos * p_cos;
    let c2 = c * c;

    let d = x / (n * K0);
    let d2 = d * d;
    let d3 = d2 * d;
    let d4 = d3 * d;
    let d5 = d4 * d;
    let d6 = d5 * d;

    let latitude = p_rad
        - (p_tan / r)
            * (d2 / 2.0 - d4 / 24.0 * (5.0 + 3.0 * p_tan2 + 10.0 * c - 4.0 * c2 - 9.0 * E_P2)
                + d6 / 720.0
                    * (61.0 + 90.0 * p_tan2 + 298.0 * c + 45.0 * p_tan4 - 252.0 * E_P2 - 3.0 * c2));

    let longitude = (d - d3 / 6.0 * (1.0 + 2.0 * p_tan2 + c)
        + d5 / 120.0 * (5.0 - 2.0 * c + 28.0 * p_tan2 - 3.0 * c2 + 8.0 * E_P2 + 24.0 * p_tan4))
        / p_cos;

    let longitude = mod_angle(longitude + zone.central_longitude().to_radians());

    GeoPoint {
        lat: latitude.to_degrees(),
        lon: longitude.to_degrees(),
    }
}

/// Footprint latitude from the rectifying latitude `mu`
fn inverse_footprint_latitude(mu: f64) -> f64 {
    let sqrt_e = (1.0 - E).sqrt();
    let e1 = (1.0 - sqrt_e) / (1.0 + sqrt_e);
    let e2 = e1 * e1;
    let e3 = e2 * e1;
    let e4 = e3 * e1;
    let e5 = e4 * e1;

    let p2 = 3.0 / 2.0 * e1 - 27.0 / 32.0 * e3 + 269.0 / 512.0 * e5;
    let p3 = 21.0 / 16.0 * e2 - 55.0 / 32.0 * e4;
    let p4 = 151.0 / 96.0 * e3 - 417.0 / 128.0 * e5;
    let p5 = 1097.0 / 512.0 * e4;

    mu + p2 * (2.0 * mu).sin() + p3 * (4.0 * mu).sin() + p4 * (6.0 * mu).sin() + p5 * (8.0 * mu).sin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_numbers() {
        assert_eq!(zone_number(48.8566, 2.3522), 31);
        assert_eq!(zone_number(40.71435, -74.00597), 18);
        assert_eq!(zone_number(0.0, -180.0), 1);
        assert_eq!(zone_number(0.0, 180.0), 60);
        // Norway
        assert_eq!(zone_number(60.0, 5.0), 32);
        // Svalbard
        assert_eq!(zone_number(78.0, 15.0), 33);
        assert_eq!(zone_number(78.0, 25.0), 35);
    }

    #[test]
    fn test_zone_letters() {
        assert_eq!(zone_letter(-80.0), Some('C'));
        assert_eq!(zone_letter(0.0), Some('N'));
        assert_eq!(zone_letter(-0.1), Some('M'));
        assert_eq!(zone_letter(50.77535), Some('U'));
        assert_eq!(zone_letter(84.0), Some('X'));
        assert_eq!(zone_letter(84.1), None);
        assert_eq!(zone_letter(-80.5), None);
    }

    #[test]
    fn test_known_projection() {
        let (coords, zone) = from_latlon(&[GeoPoint::new(50.77535, 6.08389)]).unwrap();
        assert_eq!(zone, UtmZone { number: 32, letter: 'U' });
        assert!((coords[0].easting - 294_409.0).abs() < 1.0, "{:?}", coords[0]);
        assert!((coords[0].northing - 5_628_898.0).abs() < 1.0, "{:?}", coords[0]);
    }

    #[test]
    fn test_southern_hemisphere_projection() {
        // Sydney
        let (coords, zone) = from_latlon(&[GeoPoint::new(-33.8688, 151.2093)]).unwrap();
        assert_eq!(zone.number, 56);
        assert!(!zone.is_northern());
        assert!((coords[0].easting - 334_369.0).abs() < 5.0, "{:?}", coords[0]);
        assert!((coords[0].northing - 6_250_948.0).abs() < 5.0, "{:?}", coords[0]);
    }

    #[test]
    fn test_mixed_hemispheres_rejected() {
        let points = [GeoPoint::new(0.5, 10.0), GeoPoint::new(-0.5, 10.0)];
        assert!(matches!(from_latlon(&points), Err(GeoError::Projection(_))));
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(from_latlon(&[GeoPoint::new(85.0, 0.0)]).is_err());
        assert!(from_latlon(&[GeoPoint::new(10.0, 181.0)]).is_err());
        assert!(from_latlon(&[]).is_err());
    }

    #[test]
    fn test_zone_validation() {
        assert!(UtmZone::new(0, 'N').is_err());
        assert!(UtmZone::new(61, 'N').is_err());
        assert!(UtmZone::new(31, 'I').is_err());
        assert_eq!(UtmZone::new(31, 'u').unwrap().to_string(), "31U");
    }

    #[test]
    fn test_first_point_zone_is_forced() {
        // Second point lies in zone 32 but is projected in zone 31
        let points = [GeoPoint::new(45.0, 5.9), GeoPoint::new(45.0, 6.1)];
        let (coords, zone) = from_latlon(&points).unwrap();
        assert_eq!(zone.number, 31);
        assert!(coords[1].easting > coords[0].easting);

        let back = to_latlon(coords[1], zone);
        assert!((back.lat - 45.0).abs() < 1e-6);
        assert!((back.lon - 6.1).abs() < 1e-6);
    }

    #[test]
    fn test_round_trip() {
        for &(lat, lon) in &[(47.5, -2.7), (-12.25, 130.4), (0.0, 0.0), (70.1, 21.3), (-55.0, -67.2)] {
            let p = GeoPoint::new(lat, lon);
            let (coords, zone) = from_latlon(&[p]).unwrap();
            let back = to_latlon(coords[0], zone);
            assert!((back.lat - lat).abs() < 1e-6, "lat {} -> {}", lat, back.lat);
            assert!((back.lon - lon).abs() < 1e-6, "lon {} -> {}", lon, back.lon);
        }
    }
}
