use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;

use yt_summary::cli::{Cli, Commands};
use yt_summary::client::{run_chat, run_transcript, run_translate};
use yt_summary::config::{ClientConfig, ServerConfig};
use yt_summary::server::run_server;

#[actix_web::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads env fallbacks.
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            run_server(ServerConfig::from(args)).await?;
        }
        Commands::Transcript {
            url,
            mode,
            lang,
            server_url,
        } => {
            run_transcript(ClientConfig::new(server_url, lang), url, mode).await?;
        }
        Commands::Translate {
            url,
            mode,
            lang,
            server_url,
        } => {
            run_translate(ClientConfig::new(server_url, lang), url, mode).await?;
        }
        Commands::Chat {
            prompt,
            model,
            system,
            server_url,
        } => {
            run_chat(ClientConfig::new(server_url, None), prompt, model, system).await?;
        }
    }

    Ok(())
}
