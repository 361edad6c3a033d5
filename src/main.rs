use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use freshet::app::AppContext;
use freshet::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::new(None)?;

    match cli.command {
        Some(Commands::Add { input }) => {
            commands::add_channel(&ctx, &input).await?;
        }
        Some(Commands::Edit { id, input }) => {
            commands::edit_channel(&ctx, &id, &input).await?;
        }
        Some(Commands::Remove { id }) => {
            commands::remove_channel(&ctx, &id)?;
        }
        Some(Commands::List) => {
            commands::list_channels(&ctx)?;
        }
        Some(Commands::Videos { channel, all }) => {
            commands::list_videos(&ctx, channel.as_deref(), all)?;
        }
        Some(Commands::Refresh) => {
            commands::refresh(&ctx).await?;
        }
        Some(Commands::Seen { ids }) => {
            commands::mark_seen(&ctx, &ids)?;
        }
        Some(Commands::SeenAll) => {
            commands::mark_all_seen(&ctx)?;
        }
        Some(Commands::Open { id }) => {
            commands::open_video(&ctx, &id)?;
        }
        Some(Commands::Filter { action }) => {
            commands::filter(&ctx, action)?;
        }
        Some(Commands::View { mode }) => {
            commands::view(&ctx, mode)?;
        }
        None => {
            commands::default_listing(&ctx)?;
        }
    }

    Ok(())
}
