use crate::domain::model::GeoPoint;

pub use crate::domain::model::ObfuscationPolicy;

const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

impl ObfuscationPolicy {
    pub fn displayed_point(&self, id: &str, point: GeoPoint) -> GeoPoint {
        match *self {
            Self::Off => point,
            Self::Rounded { decimals } => {
                let factor = 10f64.powi(i32::from(decimals));
                GeoPoint::new(
                    (point.lat * factor).round() / factor,
                    (point.lng * factor).round() / factor,
                )
            }
            Self::Jitter { radius_m } => jitter(id, point, radius_m),
        }
    }
}

fn jitter(id: &str, point: GeoPoint, radius_m: f64) -> GeoPoint {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let bits = hasher.finish();

    // upper half of the hash picks the direction, lower half the distance
    let angle = (bits >> 32) as f64 / f64::from(u32::MAX) * std::f64::consts::TAU;
    let distance = radius_m * ((bits & 0xFFFF_FFFF) as f64 / f64::from(u32::MAX));

    let d_lat = distance * angle.cos() / METERS_PER_DEGREE_LAT;
    // longitude degrees shrink with latitude
    let lng_scale = point.lat.to_radians().cos().max(0.01);
    let d_lng = distance * angle.sin() / (METERS_PER_DEGREE_LAT * lng_scale);

    GeoPoint::new(
        (point.lat + d_lat).clamp(-90.0, 90.0),
        (point.lng + d_lng).clamp(-180.0, 180.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::distance_km;

    fn geneva() -> GeoPoint {
        GeoPoint::new(46.2044, 6.1432)
    }

    #[test]
    fn test_off_passes_coordinates_through() {
        let shown = ObfuscationPolicy::Off.displayed_point("p1", geneva());
        assert_eq!(shown, geneva());
    }

    #[test]
    fn test_rounding_truncates_precision() {
        let policy = ObfuscationPolicy::Rounded { decimals: 2 };
        let shown = policy.displayed_point("p1", geneva());
        assert_eq!(shown.lat, 46.20);
        assert_eq!(shown.lng, 6.14);
    }

    #[test]
    fn test_jitter_is_deterministic_per_profile() {
        let policy = ObfuscationPolicy::Jitter { radius_m: 300.0 };
        let first = policy.displayed_point("profile-a", geneva());
        let second = policy.displayed_point("profile-a", geneva());
        assert_eq!(first, second);
    }

    #[test]
    fn test_jitter_differs_between_profiles() {
        let policy = ObfuscationPolicy::Jitter { radius_m: 300.0 };
        let a = policy.displayed_point("profile-a", geneva());
        let b = policy.displayed_point("profile-b", geneva());
        assert_ne!(a, b);
    }

    #[test]
    fn test_jitter_stays_within_radius() {
        let policy = ObfuscationPolicy::Jitter { radius_m: 300.0 };
        for id in ["a", "b", "c", "longer-profile-id", "x9"] {
            let shown = policy.displayed_point(id, geneva());
            let meters = distance_km(&geneva(), &shown) * 1000.0;
            // small tolerance for the flat-earth approximation
            assert!(meters <= 315.0, "{} displaced {} m", id, meters);
        }
    }

    #[test]
    fn test_zero_radius_jitter_is_identity() {
        let policy = ObfuscationPolicy::Jitter { radius_m: 0.0 };
        assert_eq!(policy.displayed_point("p1", geneva()), geneva());
    }
}
