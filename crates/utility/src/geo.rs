pub const EARTH_RADIUS_KM: f64 = 6371.0;

fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

pub fn haversine_distance(
    latitude_1: f64,
    longitude_1: f64,
    latitude_2: f64,
    longitude_2: f64,
) -> f64 {
    let lat1_rad = to_radians(latitude_1);
    let lon1_rad = to_radians(longitude_1);
    let lat2_rad = to_radians(latitude_2);
    let lon2_rad = to_radians(longitude_2);

    let dlat = lat2_rad - lat1_rad;
    let dlon = lon2_rad - lon1_rad;

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Great-circle length in km of a path given as `(latitude, longitude)` pairs.
pub fn path_length_km<I>(coordinates: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut coordinates = coordinates.into_iter();
    let Some(mut previous) = coordinates.next() else {
        return 0.0;
    };
    let mut length = 0.0;
    for current in coordinates {
        length += haversine_distance(previous.0, previous.1, current.0, current.1);
        previous = current;
    }
    length
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_of_identical_points_is_zero() {
        assert_eq!(haversine_distance(54.32, 10.13, 54.32, 10.13), 0.0);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let distance = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((distance - 111.19).abs() < 0.01, "got {distance}");
    }

    #[test]
    fn path_length_sums_legs() {
        let legs = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)];
        let direct = haversine_distance(0.0, 0.0, 2.0, 0.0);
        assert!((path_length_km(legs) - direct).abs() < 1e-9);
    }

    #[test]
    fn path_length_of_short_paths_is_zero() {
        assert_eq!(path_length_km(Vec::<(f64, f64)>::new()), 0.0);
        assert_eq!(path_length_km([(10.0, 20.0)]), 0.0);
    }
}
