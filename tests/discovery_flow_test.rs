use anyhow::Result;
use chrono::NaiveDate;
use geo_discovery::domain::model::{AvailabilityStatus, ProfileType};
use geo_discovery::{DiscoveryApp, DiscoveryFilters, ServiceConfig};
use std::io::Write;
use tempfile::TempDir;

fn write_fixture(dir: &TempDir, file_name: &str, content: &str) -> String {
    let path = dir.path().join(file_name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path.to_str().unwrap().replace('\\', "/")
}

fn geneva_fixture() -> String {
    serde_json::json!([
        {
            "id": "p1",
            "type": "escort",
            "displayName": "Anna",
            "location": {"lat": 46.2044, "lng": 6.1432},
            "city": "Genève",
            "verified": true,
            "isActive": true,
            "hourlyRate": 200.0,
            "services": ["srv:massage", "srv:dinner"],
            "languages": "[\"Français\",\"Anglais\"]"
        },
        {
            "id": "p2",
            "type": "club",
            "displayName": "Club Lumière",
            "location": {"lat": 46.5197, "lng": 6.6323},
            "city": "Lausanne",
            "hourlyRate": 350.0,
            "services": "sauna,bar"
        },
        {
            "id": "p3",
            "type": "escort",
            "displayName": "Léa",
            "city": "Genève",
            "hourlyRate": 180.0
        }
    ])
    .to_string()
}

fn config_toml(data_file: &str) -> String {
    format!(
        r#"
[service]
name = "discovery-test"

[data]
file = "{}"

[geocoder]
"#,
        data_file
    )
}

#[tokio::test]
async fn test_end_to_end_discovery_from_json_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let data_file = write_fixture(&temp_dir, "providers.json", &geneva_fixture());

    let config = ServiceConfig::from_toml_str(&config_toml(&data_file))?;
    let app = DiscoveryApp::from_config(config)?;

    // Geneva viewport plus a service constraint: only Anna qualifies
    let filters = DiscoveryFilters {
        bbox: Some("6.0,46.1,6.3,46.3".to_string()),
        services: vec!["massage".to_string()],
        ..Default::default()
    };
    let results = app.search(&filters).await;

    assert_eq!(results.len(), 1);
    let dto = &results[0];
    assert_eq!(dto.id, "p1");
    assert_eq!(dto.profile_type, ProfileType::Escort);
    assert_eq!(dto.name, "Anna");
    assert_eq!(dto.handle, "anna");
    assert_eq!(dto.services, vec!["massage", "dinner"]);
    assert_eq!(dto.languages, vec!["Français", "Anglais"]);
    assert_eq!(dto.city.as_deref(), Some("Genève"));
    assert!(dto.verified);

    let range = dto.price_range.unwrap();
    assert_eq!(range.min, 200.0);
    assert_eq!(range.max, 400.0);
    Ok(())
}

#[tokio::test]
async fn test_configured_cap_applies_without_viewport() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let records: Vec<serde_json::Value> = (0..60)
        .map(|i| {
            serde_json::json!({
                "id": format!("p{}", i),
                "type": "escort",
                "location": {"lat": 46.2 + (i as f64) * 0.0001, "lng": 6.14}
            })
        })
        .collect();
    let data_file = write_fixture(
        &temp_dir,
        "providers.json",
        &serde_json::Value::Array(records).to_string(),
    );

    let toml = config_toml(&data_file)
        + "
[search]
unbounded_result_cap = 20
";
    let config = ServiceConfig::from_toml_str(&toml)?;
    let app = DiscoveryApp::from_config(config)?;

    // No viewport: the configured cap kicks in
    let unbounded = app.search(&DiscoveryFilters::default()).await;
    assert_eq!(unbounded.len(), 20);

    // With a viewport the cap does not apply
    let bounded = app
        .search(&DiscoveryFilters {
            bbox: Some("6.0,46.0,6.3,46.4".to_string()),
            ..Default::default()
        })
        .await;
    assert_eq!(bounded.len(), 60);
    Ok(())
}

#[tokio::test]
async fn test_rounded_obfuscation_applies_to_results() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let data_file = write_fixture(&temp_dir, "providers.json", &geneva_fixture());

    let toml = config_toml(&data_file)
        + "
[privacy]
mode = \"rounded\"
decimals = 2
";
    let config = ServiceConfig::from_toml_str(&toml)?;
    let app = DiscoveryApp::from_config(config)?;

    let results = app
        .search(&DiscoveryFilters {
            bbox: Some("6.0,46.1,6.3,46.3".to_string()),
            ..Default::default()
        })
        .await;

    assert_eq!(results.len(), 1);
    assert!((results[0].lat - 46.20).abs() < 1e-9);
    assert!((results[0].lng - 6.14).abs() < 1e-9);
    Ok(())
}

#[tokio::test]
async fn test_csv_data_file_end_to_end() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let csv = "\
id,type,displayName,lat,lng,city,verified,isActive,hourlyRate,avatarUrl,services,languages,schedule,availableNowOverride
c1,escort,Mia,46.2044,6.1432,Genève,true,true,250,,\"massage,outcall\",\"Français:5⭐,Anglais:3⭐\",,false
c2,club,,46.2050,6.1440,Genève,,,,,,,,
";
    let data_file = write_fixture(&temp_dir, "providers.csv", csv);

    let config = ServiceConfig::from_toml_str(&config_toml(&data_file))?;
    let app = DiscoveryApp::from_config(config)?;

    let results = app
        .search(&DiscoveryFilters {
            bbox: Some("6.0,46.1,6.3,46.3".to_string()),
            ..Default::default()
        })
        .await;
    assert_eq!(results.len(), 2);

    let mia = results.iter().find(|r| r.id == "c1").unwrap();
    assert_eq!(mia.services, vec!["massage", "outcall"]);
    assert_eq!(mia.languages, vec!["Français", "Anglais"]);
    assert_eq!(mia.price_range.unwrap().max, 500.0);

    // Empty cells fall back to defaults, including the generated name
    let club = results.iter().find(|r| r.id == "c2").unwrap();
    assert_eq!(club.name, "Profile c2");
    assert!(club.is_active);
    assert!(club.price_range.is_none());
    Ok(())
}

#[tokio::test]
async fn test_availability_through_app() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let fixture = serde_json::json!([
        {
            "id": "p1",
            "type": "escort",
            "location": {"lat": 46.2044, "lng": 6.1432},
            "schedule": [{"weekday": 2, "start": "18:00", "end": "23:00"}]
        },
        {
            "id": "p2",
            "type": "escort",
            "location": {"lat": 46.2050, "lng": 6.1440},
            "availableNowOverride": true
        }
    ])
    .to_string();
    let data_file = write_fixture(&temp_dir, "providers.json", &fixture);

    let config = ServiceConfig::from_toml_str(&config_toml(&data_file))?;
    let app = DiscoveryApp::from_config(config)?;

    // Wednesday afternoon, before the evening slot opens
    let now = NaiveDate::from_ymd_opt(2024, 3, 13)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap();

    let scheduled = app.availability("p1", now).await.unwrap();
    assert_eq!(scheduled.status, AvailabilityStatus::ScheduledLater);
    assert_eq!(scheduled.message, "Back at 18:00");
    assert!(!scheduled.is_available);
    assert_eq!(
        scheduled.next_change_at,
        NaiveDate::from_ymd_opt(2024, 3, 13)
            .unwrap()
            .and_hms_opt(18, 0, 0)
    );

    let overridden = app.availability("p2", now).await.unwrap();
    assert_eq!(overridden.status, AvailabilityStatus::AvailableNow);
    assert!(overridden.is_available);

    assert!(app.availability("missing", now).await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_unsupported_data_format_fails_fast() {
    let temp_dir = TempDir::new().unwrap();
    let data_file = write_fixture(&temp_dir, "providers.txt", "not a data file");

    let config = ServiceConfig::from_toml_str(&config_toml(&data_file)).unwrap();
    let result = DiscoveryApp::from_config(config);
    assert!(result.is_err());
}
