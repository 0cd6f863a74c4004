use crate::core::geo;
use crate::domain::model::{CandidateQuery, GeoPoint, ProfileType, ProviderRecord};
use crate::domain::ports::ProviderStore;
use crate::utils::error::Result;
use serde::Deserialize;
use std::path::Path;

/// Provider records held in memory, loaded from a JSON or CSV export of the
/// profile database. Discovery only ever reads, so constraint filtering here
/// plays the role a WHERE clause would against a live database.
pub struct FileStore {
    records: Vec<ProviderRecord>,
}

/// Flat row shape for CSV exports; attribute cells stay raw text because
/// they use the same mixed encodings the JSON blobs do.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsvRow {
    id: String,
    #[serde(rename = "type")]
    profile_type: ProfileType,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lng: Option<f64>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    verified: Option<bool>,
    #[serde(default)]
    is_active: Option<bool>,
    #[serde(default)]
    hourly_rate: Option<f64>,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    services: Option<String>,
    #[serde(default)]
    languages: Option<String>,
    #[serde(default)]
    schedule: Option<String>,
    #[serde(default)]
    available_now_override: Option<bool>,
}

impl CsvRow {
    fn into_record(self) -> ProviderRecord {
        let location = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        };
        ProviderRecord {
            id: self.id,
            profile_type: self.profile_type,
            display_name: self.display_name,
            location,
            city: self.city,
            verified: self.verified.unwrap_or(false),
            is_active: self.is_active.unwrap_or(true),
            hourly_rate: self.hourly_rate,
            avatar_url: self.avatar_url,
            services: text_blob(self.services),
            languages: text_blob(self.languages),
            schedule: self.schedule.map(serde_json::Value::String),
            available_now_override: self.available_now_override.unwrap_or(false),
        }
    }
}

fn text_blob(cell: Option<String>) -> serde_json::Value {
    match cell {
        Some(text) => serde_json::Value::String(text),
        None => serde_json::Value::Null,
    }
}

impl FileStore {
    pub fn from_records(records: Vec<ProviderRecord>) -> Self {
        Self { records }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let records: Vec<ProviderRecord> = serde_json::from_str(&content)?;
        tracing::info!("📁 Loaded {} provider records from JSON", records.len());
        Ok(Self { records })
    }

    pub fn from_csv_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            let row: CsvRow = row?;
            records.push(row.into_record());
        }
        tracing::info!("📁 Loaded {} provider records from CSV", records.len());
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ProviderStore for FileStore {
    async fn fetch_candidates(&self, query: &CandidateQuery) -> Result<Vec<ProviderRecord>> {
        let mut out = Vec::new();
        for record in &self.records {
            if !query.profile_type.matches(record.profile_type) {
                continue;
            }
            let point = match record.location {
                Some(p) => p,
                None => continue,
            };
            if let Some(bbox) = &query.bbox {
                if !geo::bbox_contains(bbox, &point) {
                    continue;
                }
            }
            if let Some(ceiling) = query.price_max {
                // 沒標價的資料在設定上限時一律排除，比照 SQL NULL 語意
                match record.hourly_rate {
                    Some(rate) if rate <= ceiling => {}
                    _ => continue,
                }
            }

            out.push(record.clone());
            if let Some(limit) = query.limit {
                if out.len() >= limit {
                    break;
                }
            }
        }
        Ok(out)
    }

    async fn get(&self, id: &str) -> Result<Option<ProviderRecord>> {
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }
}
