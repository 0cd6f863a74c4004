use crate::domain::model::{BoundingBox, GeoPoint};
use crate::utils::error::{DiscoveryError, Result};

pub const LAT_BOUND: f64 = 90.0;
pub const LNG_BOUND: f64 = 180.0;

/// True iff both values are finite and within WGS84 range. Used as a guard
/// everywhere a coordinate crosses a boundary; failing records are excluded,
/// not errored.
pub fn validate_coordinates(lat: f64, lng: f64) -> bool {
    lat.is_finite()
        && lng.is_finite()
        && (-LAT_BOUND..=LAT_BOUND).contains(&lat)
        && (-LNG_BOUND..=LNG_BOUND).contains(&lng)
}

/// Parses a viewport string `"minLng,minLat,maxLng,maxLat"`.
///
/// Empty/whitespace input is `Ok(None)` (no viewport requested); anything
/// else that does not split into exactly 4 in-range numbers is an error so
/// callers can tell "no box" from "broken box".
pub fn parse_bbox(raw: &str) -> Result<Option<BoundingBox>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let parts: Vec<&str> = trimmed.split(',').collect();
    if parts.len() != 4 {
        return Err(DiscoveryError::BoundingBoxError {
            input: raw.to_string(),
            reason: format!("expected 4 comma-separated numbers, got {}", parts.len()),
        });
    }

    let mut values = [0.0f64; 4];
    for (slot, part) in values.iter_mut().zip(parts.iter()) {
        *slot = part
            .trim()
            .parse::<f64>()
            .map_err(|_| DiscoveryError::BoundingBoxError {
                input: raw.to_string(),
                reason: format!("'{}' is not a number", part.trim()),
            })?;
    }

    bbox_from_values(values[0], values[1], values[2], values[3]).map(Some)
}

/// Builds a normalized box from two corners given as (lng, lat) pairs.
/// 反轉的角落照樣整理成合法矩形，不拒絕
pub fn bbox_from_values(lng_a: f64, lat_a: f64, lng_b: f64, lat_b: f64) -> Result<BoundingBox> {
    for (lat, lng) in [(lat_a, lng_a), (lat_b, lng_b)] {
        if !validate_coordinates(lat, lng) {
            return Err(DiscoveryError::BoundingBoxError {
                input: format!("{},{},{},{}", lng_a, lat_a, lng_b, lat_b),
                reason: format!("corner (lng {}, lat {}) is out of range", lng, lat),
            });
        }
    }

    Ok(BoundingBox {
        min_lng: lng_a.min(lng_b),
        min_lat: lat_a.min(lat_b),
        max_lng: lng_a.max(lng_b),
        max_lat: lat_a.max(lat_b),
    })
}

/// Strict containment on both axes: points on the border are outside.
pub fn bbox_contains(bbox: &BoundingBox, point: &GeoPoint) -> bool {
    point.lng > bbox.min_lng
        && point.lng < bbox.max_lng
        && point.lat > bbox.min_lat
        && point.lat < bbox.max_lat
}

pub fn bbox_center(bbox: &BoundingBox) -> GeoPoint {
    GeoPoint {
        lat: (bbox.min_lat + bbox.max_lat) / 2.0,
        lng: (bbox.min_lng + bbox.max_lng) / 2.0,
    }
}

/// Great-circle distance in kilometers, used for result ordering only.
pub fn distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    haversine::distance(
        haversine::Location {
            latitude: a.lat,
            longitude: a.lng,
        },
        haversine::Location {
            latitude: b.lat,
            longitude: b.lng,
        },
        haversine::Units::Kilometers,
    )
}
