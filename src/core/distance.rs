use crate::types::GeoPoint;

/// Mean Earth radius used by the haversine formula (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometers (haversine formula)
///
/// Loses precision close to antipodal points.
pub fn haversine_distance(source: GeoPoint, target: GeoPoint) -> f64 {
    let d_lat = (target.lat - source.lat).to_radians();
    let d_lon = (target.lon - source.lon).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + source.lat.to_radians().cos()
            * target.lat.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Scalar form of [`haversine_distance`]
pub fn get_distance(
    source_latitude: f64,
    source_longitude: f64,
    target_latitude: f64,
    target_longitude: f64,
) -> f64 {
    haversine_distance(
        GeoPoint::new(source_latitude, source_longitude),
        GeoPoint::new(target_latitude, target_longitude),
    )
}
