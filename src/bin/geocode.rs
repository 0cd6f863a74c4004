use std::time::Duration;

use clap::Parser;
use geo_discovery::adapters::NominatimClient;
use geo_discovery::config::toml_config::ServiceConfig;
use geo_discovery::core::geocoding::GeocodingResolver;
use geo_discovery::domain::ports::ConfigProvider;
use geo_discovery::utils::{logger, validation::Validate};
use geo_discovery::GeoPoint;

#[derive(Parser)]
#[command(name = "geocode")]
#[command(about = "Resolve place names through the built-in gazetteer and Nominatim")]
struct Args {
    /// City or area name to resolve
    #[arg(required_unless_present = "reverse", conflicts_with = "reverse")]
    query: Option<String>,

    /// Reverse-resolve coordinates given as "lat,lng"
    #[arg(long)]
    reverse: Option<String>,

    /// Optional TOML configuration file; its [geocoder] section wins over flags
    #[arg(short, long)]
    config: Option<String>,

    /// Geocoder endpoint
    #[arg(long, default_value = "https://nominatim.openstreetmap.org")]
    endpoint: String,

    /// Country codes passed to the external geocoder
    #[arg(long, value_delimiter = ',', default_value = "ch,fr")]
    country_codes: Vec<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "5")]
    timeout_secs: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    // 載入 TOML 配置（有給才載，geocoder 區段優先於旗標）
    let (endpoint, country_codes, timeout_secs) = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let config = match ServiceConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            };

            if let Err(e) = config.validate() {
                tracing::error!("❌ Configuration validation failed: {}", e);
                tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
                eprintln!("❌ {}", e.user_friendly_message());
                std::process::exit(1);
            }

            (
                config.geocoder_endpoint().to_string(),
                config.country_codes().to_vec(),
                config.request_timeout_secs(),
            )
        }
        None => (
            args.endpoint.clone(),
            args.country_codes.clone(),
            args.timeout_secs,
        ),
    };

    let client =
        NominatimClient::new(&endpoint).with_timeout(Duration::from_secs(timeout_secs));
    let resolver = GeocodingResolver::new(client).with_country_codes(country_codes);

    let place = match &args.reverse {
        Some(raw) => {
            let point = match parse_point(raw) {
                Some(point) => point,
                None => {
                    eprintln!("❌ Invalid coordinates: '{}'", raw);
                    eprintln!("💡 Expected \"lat,lng\", e.g. \"46.2044,6.1432\"");
                    std::process::exit(1);
                }
            };
            resolver.reverse_resolve(point).await
        }
        None => {
            // clap guarantees query is present when --reverse is absent
            let query = args.query.as_deref().unwrap_or_default();
            resolver.resolve_city(query).await
        }
    };

    match place {
        Some(place) => {
            tracing::info!("✅ Resolved to {}", place.display_name);
            println!("{}", serde_json::to_string_pretty(&place)?);
            Ok(())
        }
        None => {
            eprintln!("❌ No match found");
            std::process::exit(1);
        }
    }
}

fn parse_point(raw: &str) -> Option<GeoPoint> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != 2 {
        return None;
    }
    let lat = parts[0].parse().ok()?;
    let lng = parts[1].parse().ok()?;
    Some(GeoPoint::new(lat, lng))
}
