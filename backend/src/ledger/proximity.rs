use common::model::donation::Donation;
use common::model::location::GeoPoint;

/// Mean Earth radius (IUGG), in meters.
const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Great-circle distance between two points.
pub fn haversine_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat_a, lat_b) = (a.lat.to_radians(), b.lat.to_radians());
    let d_lat = (b.lat - a.lat).to_radians();
    let d_long = (b.long - a.long).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_long / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

/// Keeps the donations within `radius_meters` of `origin`, nearest first.
///
/// Donations without both coordinates are dropped rather than reported.
pub fn within_radius(origin: GeoPoint, radius_meters: f64, candidates: Vec<Donation>) -> Vec<Donation> {
    let mut ranked: Vec<(f64, Donation)> = candidates
        .into_iter()
        .filter_map(|donation| {
            let distance = haversine_meters(origin, donation.location.point()?);
            (distance <= radius_meters).then_some((distance, donation))
        })
        .collect();

    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
    ranked.into_iter().map(|(_, donation)| donation).collect()
}
