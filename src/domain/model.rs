use serde::{Deserialize, Serialize};

/// A latitude/longitude pair. Validity (finite, in range) is checked by
/// `core::geo::validate_coordinates`, not enforced by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Viewport rectangle. Always normalized on construction: min <= max per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ProfileType {
    Escort,
    Club,
}

/// Category discriminator for discovery requests; `both` disables the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ProfileTypeFilter {
    Escort,
    Club,
    #[default]
    Both,
}

impl ProfileTypeFilter {
    pub fn matches(self, profile_type: ProfileType) -> bool {
        match self {
            Self::Both => true,
            Self::Escort => profile_type == ProfileType::Escort,
            Self::Club => profile_type == ProfileType::Club,
        }
    }
}

/// Provider profile as persisted by the external profile-management system.
/// Read-only input here. The `services`/`languages`/`schedule` blobs are kept
/// raw because storage holds them in several incompatible encodings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub profile_type: ProfileType,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub services: serde_json::Value,
    #[serde(default)]
    pub languages: serde_json::Value,
    #[serde(default)]
    pub schedule: Option<serde_json::Value>,
    #[serde(default)]
    pub available_now_override: bool,
}

fn default_active() -> bool {
    true
}

/// One decoded attribute label with its weight (5 when the source encoding
/// carries no explicit weight).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeEntry {
    pub label: String,
    pub weight: u8,
}

/// Ordered label set decoded from a raw attribute blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeList {
    pub entries: Vec<AttributeEntry>,
}

impl AttributeList {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.label.clone()).collect()
    }

    /// Case-insensitive intersection against user-supplied filter labels.
    pub fn matches_any(&self, requested: &[String]) -> bool {
        self.entries.iter().any(|entry| {
            let label = entry.label.to_lowercase();
            requested.iter().any(|r| r.trim().to_lowercase() == label)
        })
    }
}

/// Discovery request filters as they arrive on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscoveryFilters {
    pub bbox: Option<String>,
    pub price_max: Option<f64>,
    pub services: Vec<String>,
    pub languages: Vec<String>,
    #[serde(rename = "type")]
    pub profile_type: ProfileTypeFilter,
}

/// Candidate fetch constraints handed to the `ProviderStore` port.
#[derive(Debug, Clone, Default)]
pub struct CandidateQuery {
    pub bbox: Option<BoundingBox>,
    pub price_max: Option<f64>,
    pub profile_type: ProfileTypeFilter,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// Public discovery result row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub id: String,
    #[serde(rename = "type")]
    pub profile_type: ProfileType,
    pub name: String,
    pub handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub is_active: bool,
    pub services: Vec<String>,
    pub languages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub verified: bool,
}

/// One recurring weekly opening. `weekday`: 0 = Monday .. 6 = Sunday.
/// Minutes are half-open: a slot covers minute m iff start <= m < end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub weekday: u8,
    pub start_minute: u16,
    pub end_minute: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailabilityStatus {
    AvailableNow,
    ScheduledLater,
    Unavailable,
    Unknown,
}

/// Real-time availability verdict consumed by the profile-rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySnapshot {
    pub is_available: bool,
    pub status: AvailabilityStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_change_at: Option<chrono::NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceSource {
    Predefined,
    External,
}

/// Canonical geocoding result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPlace {
    pub lat: f64,
    pub lng: f64,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub source: PlaceSource,
}

/// Raw first-result fields from the external geocoding provider, before the
/// resolver applies coordinate validation and the city/town/village fallback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeocodeHit {
    pub lat: f64,
    pub lng: f64,
    pub display_name: String,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub country: Option<String>,
}

/// How a provider's true coordinates become the displayed ones. The
/// transform itself lives in `core::privacy`.
///
/// `Off` is the default: the privacy offset is normally baked into stored
/// coordinates before they reach this system, so discovery passes them
/// through untouched. The other modes exist for deployments whose store
/// keeps exact locations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ObfuscationPolicy {
    #[default]
    Off,
    /// Round to a fixed number of decimal places.
    Rounded { decimals: u8 },
    /// Displace up to `radius_m` meters in a direction derived from the
    /// profile id, so the same profile always shows the same displaced point.
    Jitter { radius_m: f64 },
}
