//! Local metric projection.
//!
//! Distance-band and DBSCAN parameters are in meters, so lon/lat points are
//! projected onto a local tangent plane before any distance test. An
//! equirectangular projection about the batch's mean latitude keeps
//! pairwise distances accurate to well under the parameter scale for
//! AOI-sized extents.

/// Mean Earth radius in meters (IUGG).
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Project lon/lat degrees onto a local metric plane.
///
/// Returns `(x, y)` in meters per input point, in input order.
pub fn project(coords: &[(f64, f64)]) -> Vec<(f64, f64)> {
    if coords.is_empty() {
        return Vec::new();
    }
    let mean_lat: f64 =
        coords.iter().map(|&(_, lat)| lat).sum::<f64>() / coords.len() as f64;
    let cos_lat = mean_lat.to_radians().cos();

    coords
        .iter()
        .map(|&(lon, lat)| {
            let x = EARTH_RADIUS_M * lon.to_radians() * cos_lat;
            let y = EARTH_RADIUS_M * lat.to_radians();
            (x, y)
        })
        .collect()
}

/// Euclidean distance between two projected points, meters.
pub fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}
