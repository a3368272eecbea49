/// Mean Earth radius (meters), the reference sphere for great-circle math.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Geographic coordinates in degrees, GeoJSON axis order (lng, lat).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LngLat {
    pub lng_deg: f64,
    pub lat_deg: f64,
}

impl LngLat {
    pub fn new(lng_deg: f64, lat_deg: f64) -> Self {
        Self { lng_deg, lat_deg }
    }
}

/// Great-circle distance between two points, in kilometers.
///
/// Haversine on the mean-radius sphere. Sub-meter exactness does not matter
/// for snap-radius gating; determinism does, and this is a pure function of
/// its inputs.
pub fn geodesic_distance_km(a: LngLat, b: LngLat) -> f64 {
    let lat_a = a.lat_deg.to_radians();
    let lat_b = b.lat_deg.to_radians();
    let d_lat = (b.lat_deg - a.lat_deg).to_radians();
    let d_lng = (b.lng_deg - a.lng_deg).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_M * c / 1000.0
}
