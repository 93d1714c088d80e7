use std::sync::Arc;

use marketing_assist::bot::{Bot, Orchestrator, SessionRegistry};
use marketing_assist::channels::{ChannelManager, CliChannel, TelegramChannel};
use marketing_assist::config::BotConfig;
use marketing_assist::faq::MarketingAdvisor;
use marketing_assist::llm::{LlmConfig, create_provider};
use marketing_assist::trends::HttpTrendSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let use_cli = std::env::args().skip(1).any(|arg| arg == "--cli");

    let config = BotConfig::from_env(!use_cli).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export TELEGRAM_TOKEN=123456:ABC...   (not needed with --cli)");
        eprintln!("  export OPENAI_API_KEY=sk-...");
        std::process::exit(1);
    });

    eprintln!("📈 Marketing Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model);

    // Create LLM provider
    let llm_config = LlmConfig {
        api_key: config.openai_api_key.clone(),
        model: config.model.clone(),
    };
    let llm = create_provider(&llm_config)?;

    let trends = Arc::new(HttpTrendSource::new());
    eprintln!("   Trends: {}", trends.url());

    let orchestrator = Orchestrator::new(
        Arc::new(SessionRegistry::new()),
        trends,
        MarketingAdvisor::new(llm),
    );

    // Set up channels
    let mut channels = ChannelManager::new();
    match (use_cli, config.telegram_token.clone()) {
        (false, Some(token)) => channels.add(Box::new(TelegramChannel::new(token))),
        _ => channels.add(Box::new(CliChannel::new())),
    }
    eprintln!("   Channels: {}\n", channels.names().join(", "));

    let bot = Bot::new(config, orchestrator, channels);
    bot.run().await?;

    Ok(())
}
