//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI or bot.
//! No business logic here.

use dotenv::dotenv;
use isb_intel::adapters::roblox::HttpRobloxGateway;
use isb_intel::adapters::telegram::BotApiClient;
use isb_intel::adapters::ui::tui::TuiInputPort;
use isb_intel::ports::{ChatPort, InputPort, RobloxGateway};
use isb_intel::shared::config::AppConfig;
use isb_intel::usecases::{BotService, CommandService, CompareService, GroupService, ProfileService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "config load failed; using defaults");
        AppConfig::default()
    });

    // --- Roblox engine ---
    let http = match cfg.api_base_url() {
        Some(base) => HttpRobloxGateway::with_base_url(base, cfg.http_timeout()),
        None => HttpRobloxGateway::new(cfg.api_domain_or_default(), cfg.http_timeout()),
    }
    .map_err(|e| anyhow::anyhow!("{}", e))?;
    let gateway: Arc<dyn RobloxGateway> = Arc::new(http);
    let page_limit = cfg.page_limit_or_default();
    info!(
        domain = %cfg.api_domain_or_default(),
        base_url = cfg.api_base_url().unwrap_or("-"),
        page_limit,
        timeout_secs = cfg.http_timeout().as_secs(),
        "Roblox gateway ready"
    );

    let profiles = Arc::new(ProfileService::new(Arc::clone(&gateway), page_limit));
    let groups = Arc::new(GroupService::new(Arc::clone(&gateway), page_limit));
    let compare = Arc::new(CompareService::new(
        Arc::clone(&gateway),
        Arc::clone(&groups),
        page_limit,
    ));
    let commands = Arc::new(CommandService::new(
        profiles,
        groups,
        compare,
        cfg.members_per_page_or_default(),
    ));

    // --- Chat bot (optional without a token) ---
    let bot = match cfg.telegram_token() {
        Some(token) => {
            let chat: Arc<dyn ChatPort> = Arc::new(
                BotApiClient::new(token, cfg.http_timeout(), cfg.poll_timeout())
                    .map_err(|e| anyhow::anyhow!("{}", e))?,
            );
            let scope = cfg.command_scope().ok_or_else(|| {
                anyhow::anyhow!("ISB_GLOBAL_COMMAND_SYNC=false requires ISB_HOME_CHAT_ID")
            })?;
            if cfg.operator_id.is_none() {
                warn!("ISB_OPERATOR_ID not set; /calibrate_uplink will be refused for everyone");
            }
            Some(Arc::new(BotService::new(
                chat,
                Arc::clone(&commands),
                cfg.operator_id,
                scope,
                cfg.pager_ttl(),
            )))
        }
        None => {
            warn!("ISB_TELEGRAM_TOKEN not set; chat bot disabled");
            None
        }
    };

    if cfg.is_headless() {
        let bot = bot.ok_or_else(|| anyhow::anyhow!("Headless mode needs ISB_TELEGRAM_TOKEN"))?;
        info!("starting bot (headless)");
        return bot.run_loop().await.map_err(|e| anyhow::anyhow!("{}", e));
    }

    isb_intel::adapters::ui::init_ui();

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        commands,
        bot,
        PathBuf::from(cfg.reports_dir_or_default()),
    ));

    // --- Run (main menu -> bot / lookups) ---
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
