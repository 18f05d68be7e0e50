//! Geographic utilities: haversine distance and meter/degree conversions.

/// Earth mean radius in meters. Also used to convert the clustering radius
/// from meters to great-circle radians, so it must stay numerically
/// comparable to any existing fixtures.
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters per degree of latitude on the mean-radius sphere (2πR / 360).
const METERS_PER_DEGREE_LAT: f64 = MEAN_EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

/// Great-circle distance in meters between two (latitude, longitude) points.
///
/// # Example
/// ```
/// use place_miner::geo_utils::haversine_distance;
/// let d = haversine_distance(51.5074, -0.1278, 48.8566, 2.3522);
/// assert!((d / 1000.0 - 344.0).abs() < 5.0); // London - Paris ~344 km
/// ```
pub fn haversine_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    MEAN_EARTH_RADIUS_M * c
}

/// Convert a distance in meters to degrees of latitude.
///
/// Exact on the sphere: a pure north-south arc of `meters` spans exactly
/// this many degrees under [`haversine_distance`].
pub fn meters_to_degrees_lat(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE_LAT
}

/// Convert a distance in meters to degrees of longitude at a given latitude.
///
/// Within a fraction of a degree of the poles the span saturates to the
/// full 180 rather than dividing by a vanishing cosine.
pub fn meters_to_degrees_lng(meters: f64, at_latitude: f64) -> f64 {
    let cos_lat = at_latitude.to_radians().cos().abs();
    if cos_lat < 1e-3 {
        return 180.0;
    }
    (meters / (METERS_PER_DEGREE_LAT * cos_lat)).min(180.0)
}
