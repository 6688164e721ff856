use entityfacts_pictures_harvester::utils::{logger, validation::Validate};
use entityfacts_pictures_harvester::{CliArgs, HarvestConfig, HarvestEngine};
use std::process::ExitCode;
use tokio::io::BufReader;

/// 執行完成但有 pipeline 提早中止時的退出碼
const PIPELINE_TERMINATED_EXIT_CODE: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse_args();

    // 初始化日誌
    logger::init_cli_logger();

    tracing::info!("Starting entityfacts-pictures-harvester");

    let config = HarvestConfig::from(args);
    tracing::debug!("Harvest config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        return exit_code(e.exit_code());
    }

    let engine = match HarvestEngine::from_config(config) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("❌ Failed to set up the HTTP client: {}", e);
            return exit_code(e.exit_code());
        }
    };

    let input = BufReader::new(tokio::io::stdin());

    match engine.run(input).await {
        Ok(summary) if summary.all_completed() => {
            tracing::info!("✅ Harvesting completed successfully");
            ExitCode::SUCCESS
        }
        Ok(summary) => {
            for report in summary.reports.iter().filter(|r| !r.is_completed()) {
                tracing::error!(
                    "❌ {} pipeline ended early: {:?}",
                    report.content_type,
                    report.outcome
                );
            }
            ExitCode::from(PIPELINE_TERMINATED_EXIT_CODE)
        }
        Err(e) => {
            tracing::error!(
                "❌ Harvesting failed: {} (category: {:?})",
                e,
                e.category()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e);
            exit_code(e.exit_code())
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
