pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Great-circle distance in meters between two coordinates given in degrees.
///
/// Coordinates are not range checked. The haversine term is clamped to
/// `[0, 1]`, so rounding on antipodal or coincident points never yields NaN.
pub fn haversine_distance(
    latitude_1: f64,
    longitude_1: f64,
    latitude_2: f64,
    longitude_2: f64,
) -> f64 {
    let lat1_rad = to_radians(latitude_1);
    let lat2_rad = to_radians(latitude_2);

    let dlat = to_radians(latitude_2 - latitude_1);
    let dlon = to_radians(longitude_2 - longitude_1);

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Sum of the distances between consecutive coordinates of a path.
pub fn path_length<I>(points: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut points = points.into_iter();
    let Some(mut previous) = points.next() else {
        return 0.0;
    };
    let mut total = 0.0;
    for point in points {
        total += haversine_distance(previous.0, previous.1, point.0, point.1);
        previous = point;
    }
    total
}
