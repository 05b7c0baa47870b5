// This is the entry point of the standings bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic): the table parser, the
//   standings service, guild settings
// - `infra/` = Implementations of core traits (Google Sheets, JSON store)
// - `discord/` = Discord-specific adapters (slash commands)
// - `http/` = The Activity webview data API
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Spawn the Activity data API
// 4. Set up the Discord framework and register commands

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "http/activity_server.rs"]
mod http;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::settings::SettingsService;
use crate::core::standings::{SheetTab, StandingsService};
use crate::discord::Data;
use crate::infra::settings::JsonGuildSettingsStore;
use crate::infra::sheets::{GoogleSheetsClient, ServiceAccountAuth, SheetsConfig};
use poise::serenity_prelude as serenity;
use std::sync::Arc;

const DEFAULT_ACTIVITY_PORT: u16 = 3000;

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Get Discord bot token from environment
    let token = std::env::var("DISCORD_TOKEN").expect(
        "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
    );

    // Keep runtime state in a dedicated folder so the repo root stays tidy.
    let data_dir = "data";
    std::fs::create_dir_all(data_dir).expect("Failed to create data directory");
    let settings_path = std::env::var("GUILD_SETTINGS_PATH")
        .unwrap_or_else(|_| format!("{}/guild_settings.json", data_dir));

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    // Google Sheets access: service account if configured, otherwise API key
    // or the published-CSV export, whichever the env provides.
    let auth = ServiceAccountAuth::from_env()
        .await
        .expect("Failed to initialize Google service account auth");
    if auth.is_some() {
        tracing::info!("Using Google service account authentication");
    }
    let sheets_client = GoogleSheetsClient::new(SheetsConfig::from_env(), auth);

    // Worksheet tab catalog, e.g. SHEET_TABS="Overall Standings=2116993983,D1=0"
    let tabs = match std::env::var("SHEET_TABS") {
        Ok(raw) => SheetTab::parse_list(&raw),
        Err(_) => Vec::new(),
    };
    if tabs.is_empty() {
        tracing::warn!("SHEET_TABS is not set; /standings and the data API will have no tabs");
    }
    let standings_service = Arc::new(StandingsService::new(sheets_client, tabs));

    // Per-guild settings (standings channel, default tab)
    let settings_store = JsonGuildSettingsStore::new(&settings_path);
    let settings_service = Arc::new(SettingsService::new(settings_store));

    // Where the Activity webview lives, for the /activity link
    let activity_url =
        std::env::var("ACTIVITY_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    // Create the data structure that will be shared across all commands
    let data = Data {
        standings: Arc::clone(&standings_service),
        settings: Arc::clone(&settings_service),
        activity_url,
    };

    // ========================================================================
    // ACTIVITY DATA API
    // ========================================================================
    // The webview fetches parsed sheet data from this server. It runs as a
    // background task next to the gateway connection, the same way the
    // original deployment ran its web server beside the bot process.

    let port = std::env::var("ACTIVITY_PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(DEFAULT_ACTIVITY_PORT);
    let api_state = http::ApiState {
        standings: Arc::clone(&standings_service),
        client_id: std::env::var("DISCORD_CLIENT_ID").ok(),
    };
    tokio::spawn(async move {
        if let Err(err) = http::start_server(port, api_state).await {
            tracing::error!("Activity data API failed: {err}");
        }
    });

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================
    // Configure the poise framework with our commands and settings.

    let intents = serenity::GatewayIntents::GUILDS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            // Register all our commands here
            commands: vec![
                discord::commands::standings::standings(),
                discord::commands::standings::tabs(),
                discord::commands::activity::activity(),
                discord::commands::settings::standingschannel(),
                discord::commands::settings::poststandings(),
            ],
            on_error: |error| {
                Box::pin(async move {
                    if let Err(e) = poise::builtins::on_error(error).await {
                        tracing::error!("Error while handling command error: {}", e);
                    }
                })
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                println!("🤖 Bot is starting up...");

                // Register slash commands globally (can take up to an hour to propagate)
                // For faster development, use register_in_guild instead:
                // poise::builtins::register_in_guild(ctx, &framework.options().commands, guild_id).await?;
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                println!("✅ Commands registered!");
                println!("🚀 Bot is ready!");

                Ok(data)
            })
        })
        .build();

    // Create the client and start the bot
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .expect("Error creating client");

    client.start().await.expect("Error running bot");
}
