use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use brook::app::AppContext;
use brook::cli::{commands, Cli, Commands};
use brook::config::Runtime;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let runtime = Runtime::new()?
        .with_config_path(cli.config_path)
        .with_preview_feeds(&cli.feeds)
        .load()?;
    let mut ctx = AppContext::with_workers(runtime, cli.workers)?;

    match cli.command {
        Commands::Add { url, name } => {
            commands::add_feed(&mut ctx, &url, name)?;
        }
        Commands::Remove { url, all } => {
            commands::remove_feed(&mut ctx, &url, all)?;
        }
        Commands::Refresh => {
            commands::refresh(&ctx).await?;
        }
        Commands::List { read } => {
            commands::list(&ctx, read)?;
        }
        Commands::Unread => {
            commands::unread(&ctx)?;
        }
        Commands::Read { id } => {
            commands::toggle_read(&ctx, id)?;
        }
        Commands::MarkAllRead => {
            commands::mark_all_read(&ctx)?;
        }
        Commands::Fav { id } => {
            commands::toggle_favourite(&ctx, id)?;
        }
        Commands::Show { id } => {
            commands::show(&ctx, id)?;
        }
        Commands::Open { id } => {
            commands::open_item(&ctx, id)?;
        }
        Commands::Config => {
            commands::show_config(&ctx)?;
        }
        Commands::Import { source } => {
            commands::import(&mut ctx, &source).await?;
        }
    }

    Ok(())
}
