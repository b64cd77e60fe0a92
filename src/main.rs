use std::path::Path;

use clap::Parser;
use sxm_rs::utils::{error::ErrorSeverity, logger, validation::Validate};
use sxm_rs::{ProxyConfig, SxmClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ProxyConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting sxm-proxy");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    if let Err(e) = run(&config).await {
        tracing::error!(
            "Proxy terminated: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(config: &ProxyConfig) -> sxm_rs::Result<()> {
    let client = SxmClient::with_base_urls(
        &config.username,
        &config.password,
        &config.api_base,
        &config.player_url,
    );

    tracing::info!("Connecting to SiriusXM as {}", config.username);
    client.connect().await?;
    tracing::info!("Connected");

    if let Some(path) = &config.config_dump {
        client.refresh_config(Some(Path::new(path))).await?;
        tracing::info!("Hydrated web-player config written to {}", path);
    }

    let app = sxm_rs::proxy::router(client);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
