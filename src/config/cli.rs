use crate::core::ConfigProvider;
use crate::domain::model::{DiscoveryFilters, ObfuscationPolicy, ProfileTypeFilter};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "geo-discovery")]
#[command(about = "Location-based provider discovery with live availability")]
pub struct CliConfig {
    /// Provider data file (.json or .csv)
    #[arg(long, default_value = "./data/providers.json")]
    pub data_file: String,

    /// Viewport as "minLng,minLat,maxLng,maxLat"
    #[arg(long)]
    pub bbox: Option<String>,

    /// Maximum hourly rate
    #[arg(long)]
    pub price_max: Option<f64>,

    /// Required services; any listed label keeps the profile
    #[arg(long, value_delimiter = ',')]
    pub services: Vec<String>,

    /// Required languages; any listed label keeps the profile
    #[arg(long, value_delimiter = ',')]
    pub languages: Vec<String>,

    /// Profile category (escort, club or both)
    #[arg(long, value_enum)]
    pub profile_type: Option<ProfileTypeFilter>,

    /// Also evaluate live availability for each result
    #[arg(long)]
    pub with_availability: bool,

    #[arg(long, default_value = "https://nominatim.openstreetmap.org")]
    pub geocoder_endpoint: String,

    #[arg(long, value_delimiter = ',', default_value = "ch,fr")]
    pub country_codes: Vec<String>,

    #[arg(long, default_value = "5")]
    pub geocoder_timeout_secs: u64,

    #[arg(long, default_value = "50")]
    pub unbounded_result_cap: usize,

    /// Enable verbose output
    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines instead of the compact console format
    #[arg(long)]
    pub log_json: bool,

    /// Enable system monitoring
    #[arg(long, help = "Enable system monitoring")]
    pub monitor: bool,
}

impl CliConfig {
    /// Discovery filters as requested on the command line.
    pub fn filters(&self) -> DiscoveryFilters {
        DiscoveryFilters {
            bbox: self.bbox.clone(),
            price_max: self.price_max,
            services: self.services.clone(),
            languages: self.languages.clone(),
            profile_type: self.profile_type.unwrap_or_default(),
        }
    }
}

impl ConfigProvider for CliConfig {
    fn data_file(&self) -> &str {
        &self.data_file
    }

    fn geocoder_endpoint(&self) -> &str {
        &self.geocoder_endpoint
    }

    fn country_codes(&self) -> &[String] {
        &self.country_codes
    }

    fn request_timeout_secs(&self) -> u64 {
        self.geocoder_timeout_secs
    }

    fn unbounded_result_cap(&self) -> usize {
        self.unbounded_result_cap
    }

    fn obfuscation(&self) -> ObfuscationPolicy {
        // the CLI serves operator queries against already-offset data
        ObfuscationPolicy::Off
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        crate::utils::validation::validate_url("geocoder_endpoint", &self.geocoder_endpoint)?;
        crate::utils::validation::validate_path("data_file", &self.data_file)?;
        crate::utils::validation::validate_file_extensions(
            "data_file",
            std::slice::from_ref(&self.data_file),
            &["json", "csv"],
        )?;
        crate::utils::validation::validate_positive_number(
            "unbounded_result_cap",
            self.unbounded_result_cap,
            1,
        )?;
        crate::utils::validation::validate_range(
            "geocoder_timeout_secs",
            self.geocoder_timeout_secs,
            1,
            60,
        )?;
        Ok(())
    }
}
