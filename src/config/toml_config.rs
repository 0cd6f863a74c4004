use crate::core::ConfigProvider;
use crate::domain::model::ObfuscationPolicy;
use crate::utils::error::{DiscoveryError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub service: ServiceSection,
    pub data: DataConfig,
    pub geocoder: GeocoderConfig,
    pub search: Option<SearchConfig>,
    pub privacy: Option<ObfuscationPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSection {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Provider export, .json or .csv
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    #[serde(default = "default_geocoder_endpoint")]
    pub endpoint: String,
    #[serde(default = "crate::core::geocoding::default_country_codes")]
    pub country_codes: Vec<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub unbounded_result_cap: Option<usize>,
}

fn default_geocoder_endpoint() -> String {
    crate::adapters::nominatim::DEFAULT_ENDPOINT.to_string()
}

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DiscoveryError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DiscoveryError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GEOCODER_ENDPOINT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_url("geocoder.endpoint", &self.geocoder.endpoint)?;

        crate::utils::validation::validate_path("data.file", &self.data.file)?;
        crate::utils::validation::validate_file_extensions(
            "data.file",
            std::slice::from_ref(&self.data.file),
            &["json", "csv"],
        )?;

        if self.geocoder.country_codes.is_empty() {
            return Err(DiscoveryError::ConfigValidationError {
                field: "geocoder.country_codes".to_string(),
                message: "At least one country code is required".to_string(),
            });
        }
        for code in &self.geocoder.country_codes {
            crate::utils::validation::validate_non_empty_string("geocoder.country_codes", code)?;
            if code.len() != 2 {
                return Err(DiscoveryError::InvalidConfigValueError {
                    field: "geocoder.country_codes".to_string(),
                    value: code.clone(),
                    reason: "Country codes are two-letter ISO codes".to_string(),
                });
            }
        }

        if let Some(timeout) = self.geocoder.timeout_secs {
            crate::utils::validation::validate_range("geocoder.timeout_secs", timeout, 1, 60)?;
        }

        if let Some(cap) = self.search.as_ref().and_then(|s| s.unbounded_result_cap) {
            crate::utils::validation::validate_positive_number(
                "search.unbounded_result_cap",
                cap,
                1,
            )?;
        }

        match self.privacy {
            Some(ObfuscationPolicy::Rounded { decimals }) => {
                crate::utils::validation::validate_range("privacy.decimals", decimals, 0, 6)?;
            }
            Some(ObfuscationPolicy::Jitter { radius_m }) => {
                crate::utils::validation::validate_range("privacy.radius_m", radius_m, 0.0, 5000.0)?;
            }
            _ => {}
        }

        Ok(())
    }
}

impl ConfigProvider for ServiceConfig {
    fn data_file(&self) -> &str {
        &self.data.file
    }

    fn geocoder_endpoint(&self) -> &str {
        &self.geocoder.endpoint
    }

    fn country_codes(&self) -> &[String] {
        &self.geocoder.country_codes
    }

    fn request_timeout_secs(&self) -> u64 {
        self.geocoder
            .timeout_secs
            .unwrap_or(crate::adapters::nominatim::DEFAULT_TIMEOUT_SECS)
    }

    fn unbounded_result_cap(&self) -> usize {
        self.search
            .as_ref()
            .and_then(|s| s.unbounded_result_cap)
            .unwrap_or(crate::core::search::DEFAULT_UNBOUNDED_CAP)
    }

    fn obfuscation(&self) -> ObfuscationPolicy {
        self.privacy.unwrap_or_default()
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
