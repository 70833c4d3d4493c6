//! Look up a player's cosmetics from the command line and print the embed JSON
//! the bot would send.

use clap::Parser;
use cosmetics_bot_lib::discord::webhook::WebhookSink;
use cosmetics_bot_lib::logger::init_tracing;
use cosmetics_bot_lib::{build_profile_display, AppState, Config};

#[derive(Parser, Debug)]
#[command(name = "cosmetics-bot")]
#[command(about = "Minecraft cosmetics lookup")]
#[command(version)]
struct Args {
    /// Minecraft username to look up
    username: Option<String>,

    /// Page to render (1-based)
    #[arg(short, long, default_value_t = 1)]
    page: usize,

    /// Send a test message to LOG_WEBHOOK_URL and exit
    #[arg(long)]
    test_webhook: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = Config::from_env()?;
    init_tracing(config.debug);

    let state = AppState::new(config)?;

    if args.test_webhook {
        let url = state
            .config
            .webhook_url
            .clone()
            .ok_or_else(|| anyhow::anyhow!("LOG_WEBHOOK_URL is not set"))?;
        WebhookSink::new(state.http_client.clone(), url)
            .send_test_message()
            .await?;
        tracing::info!("Webhook test message sent");
        return Ok(());
    }

    let username = args
        .username
        .ok_or_else(|| anyhow::anyhow!("a username is required"))?;

    match state.fetcher.lookup_player(&username).await? {
        Some(profile) => {
            let embed = build_profile_display(&profile, args.page.saturating_sub(1));
            println!("{}", serde_json::to_string_pretty(&embed)?);
        }
        None => {
            state
                .logger
                .log_info("Player not found", &[("username", username.clone())])
                .await;
            println!("No Minecraft account named {}", username);
        }
    }

    Ok(())
}
