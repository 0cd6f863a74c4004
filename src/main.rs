use clap::Parser;
use geo_discovery::utils::{logger, monitor::SystemMonitor, validation::Validate};
use geo_discovery::{CliConfig, DiscoveryApp};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_service_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting geo-discovery CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor = SystemMonitor::new(config.monitor);
    if monitor.is_enabled() {
        tracing::info!("🔍 System monitoring enabled");
    }

    let filters = config.filters();
    let with_availability = config.with_availability;

    // 組裝服務；資料檔載入失敗就直接結束
    let app = match DiscoveryApp::from_config(config) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(
                "❌ Failed to start discovery: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                geo_discovery::utils::error::ErrorSeverity::Low => 0,
                geo_discovery::utils::error::ErrorSeverity::Medium => 2,
                geo_discovery::utils::error::ErrorSeverity::High => 1,
                geo_discovery::utils::error::ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    };

    let results = app.search(&filters).await;
    tracing::info!("✅ Discovery returned {} profiles", results.len());
    monitor.log_stats("Search complete");

    if with_availability {
        let now = chrono::Local::now().naive_local();
        let mut enriched = Vec::with_capacity(results.len());
        for dto in &results {
            let availability = app.availability(&dto.id, now).await;
            enriched.push(serde_json::json!({
                "profile": dto,
                "availability": availability,
            }));
        }
        println!("{}", serde_json::to_string_pretty(&enriched)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    monitor.log_final_stats();

    Ok(())
}
