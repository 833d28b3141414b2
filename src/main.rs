use clap::Parser;
use moonphase::core::ConfigProvider;
use moonphase::utils::{logger, validation::Validate};
use moonphase::{build_router, serve, CliConfig, LocalClock, MeeusEphemeris, PhaseService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入配置
    let config = match cli.load() {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose);
            tracing::error!("❌ Failed to load configuration: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_logger(config.logging.format, cli.verbose, config.logging.level.as_deref());

    tracing::info!("Starting moonphase server");
    if cli.verbose {
        tracing::debug!("Configuration: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let images = config.image_set();
    tracing::info!(
        "🖼️ Image set: indices {}..={}, template {}",
        images.min_index,
        images.max_index,
        images.url_template
    );

    let service = PhaseService::new(MeeusEphemeris::new(), LocalClock, images);
    let router = build_router(service, &config)?;

    serve(router, config.bind_address()).await?;

    Ok(())
}
