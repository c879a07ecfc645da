use crate::types::{GeoError, GeoPoint, GeoResult, OrbitDirection, Polygon};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Location of the scene list relative to the notebooks directory
pub const DEFAULT_METADATA_PATH: &str = "../metadata.txt";

/// Position of the acquisition start time among the `_`-separated filename tokens
const KEY_TOKEN_INDEX: usize = 4;

/// Scene entry of the metadata file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Lowercase scene key, e.g. `20200103t170815`
    pub key: String,
    pub filename: String,
    pub polygon: Polygon,
    /// Orbit direction token exactly as written in the file
    pub orbit_direction: String,
}

impl ProductRecord {
    /// Parsed orbit direction, `None` for tokens other than the known spellings
    pub fn direction(&self) -> Option<OrbitDirection> {
        self.orbit_direction.parse().ok()
    }

    /// Acquisition start time encoded in the scene key
    pub fn acquisition_start(&self) -> GeoResult<DateTime<Utc>> {
        let naive = NaiveDateTime::parse_from_str(&self.key.to_uppercase(), "%Y%m%dT%H%M%S")
            .map_err(|e| {
                GeoError::InvalidFormat(format!(
                    "Scene key '{}' is not an acquisition time: {}",
                    self.key, e
                ))
            })?;
        Ok(Utc.from_utc_datetime(&naive))
    }
}

/// Scene key of a product filename: its fifth `_` token, lowercased
pub fn scene_key(filename: &str) -> Option<String> {
    filename
        .split('_')
        .nth(KEY_TOKEN_INDEX)
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

/// In-memory index of the metadata file, keyed by scene key
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    products: HashMap<String, ProductRecord>,
}

impl MetadataIndex {
    /// Read and index a metadata file
    pub fn load<P: AsRef<Path>>(path: P) -> GeoResult<Self> {
        log::info!("Reading scene metadata: {}", path.as_ref().display());
        let content = std::fs::read_to_string(path.as_ref())?;
        let index = Self::parse(&content)?;
        log::info!("Indexed {} product(s)", index.len());
        Ok(index)
    }

    /// Index metadata text, one product per line
    pub fn parse(content: &str) -> GeoResult<Self> {
        let polygon_regex = Regex::new(r"POLYGON\s*\(\(?([^()]*)\)?\)")
            .map_err(|e| GeoError::InvalidFormat(format!("Invalid polygon pattern: {}", e)))?;

        let mut products = HashMap::new();
        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let record = parse_line(line, &polygon_regex).map_err(|message| GeoError::Metadata {
                line: number + 1,
                message,
            })?;

            if let Some(previous) = products.insert(record.key.clone(), record) {
                log::warn!(
                    "Duplicate scene key '{}' on line {}, replacing {}",
                    previous.key,
                    number + 1,
                    previous.filename
                );
            }
        }

        Ok(Self { products })
    }

    /// Record for a scene key (case-insensitive)
    pub fn get(&self, key: &str) -> Option<&ProductRecord> {
        self.products.get(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.products.keys().map(String::as_str)
    }

    pub fn records(&self) -> impl Iterator<Item = &ProductRecord> {
        self.products.values()
    }
}

/// Read the metadata file once and return a lookup closure over it
pub fn polygon_getter<P: AsRef<Path>>(
    path: P,
) -> GeoResult<impl Fn(&str) -> Option<ProductRecord> + 'static> {
    let index = MetadataIndex::load(path)?;
    Ok(move |key: &str| index.get(key).cloned())
}

fn parse_line(line: &str, polygon_regex: &Regex) -> Result<ProductRecord, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(format!(
            "expected at least 3 fields, found {}",
            fields.len()
        ));
    }

    let filename = fields[1].to_string();
    let orbit_direction = fields[2].to_string();
    if orbit_direction.parse::<OrbitDirection>().is_err() {
        log::debug!("Unrecognised orbit direction '{}' for {}", orbit_direction, filename);
    }

    let key = scene_key(&filename)
        .ok_or_else(|| format!("cannot derive a scene key from '{}'", filename))?;

    let ring = polygon_regex
        .captures(line)
        .and_then(|captures| captures.get(1))
        .ok_or_else(|| "missing POLYGON(...)".to_string())?;
    let polygon = parse_ring(ring.as_str())?;

    Ok(ProductRecord {
        key,
        filename,
        polygon,
        orbit_direction,
    })
}

/// Footprint from a closed ring of `lat,lon` pairs.
///
/// Vertices are taken from the last one down to the second one, which for
/// a closed ring drops the repeated start point and reverses the winding.
fn parse_ring(ring: &str) -> Result<Polygon, String> {
    let points = ring
        .split_whitespace()
        .map(parse_pair)
        .collect::<Result<Vec<GeoPoint>, String>>()?;

    let corners: Vec<GeoPoint> = points.iter().skip(1).rev().copied().collect();
    Polygon::try_from(corners).map_err(|_| {
        format!(
            "expected a closed ring of 5 points, found {} point(s)",
            points.len()
        )
    })
}

fn parse_pair(pair: &str) -> Result<GeoPoint, String> {
    let mut parts = pair.trim_matches(',').split(',');
    let (lat, lon) = match (parts.next(), parts.next(), parts.next()) {
        (Some(lat), Some(lon), None) => (lat, lon),
        _ => return Err(format!("malformed coordinate pair '{}'", pair)),
    };

    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("bad latitude '{}': {}", lat, e))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|e| format!("bad longitude '{}': {}", lon, e))?;

    Ok(GeoPoint { lat, lon })
}
