use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use shipwright::cli::{Args, Command, ShipwrightCli};
use shipwright::lock;
use shipwright::release::Releaser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ShipwrightCli::parse();

    // Initialize tracing; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let command = cli.command.clone();
    let args: Args = cli.into();

    if args.verbose {
        tracing::info!("Running shipwright with verbose output");
    }

    let releaser = Releaser::new(&args)?;

    match command {
        Some(Command::Clean) => {
            releaser.cleaner().clean();
        }
        Some(Command::Bump) => {
            let (current, next) = releaser.next_version()?;
            println!("{current} -> {next}");
        }
        Some(Command::Unlock) => {
            let path = releaser.config().project.lock_file();
            if lock::remove_sentinel(&path)? {
                tracing::info!("Removed stale release lock {}", path.display());
            } else {
                tracing::info!("No release lock at {}", path.display());
            }
        }
        None => {
            releaser.cleaner().clean();

            if !args.yes
                && !releaser
                    .prompter()
                    .confirm("Starting release. Continue?")?
            {
                println!("Aborted.");
                return Ok(());
            }

            let report = match releaser.run().await {
                Ok(report) => report,
                Err(e) if e.is_precondition() => {
                    tracing::error!("Release refused, nothing was changed: {}", e);
                    return Err(e.into());
                }
                Err(e) => {
                    tracing::error!("Release aborted: {}", e);
                    return Err(e.into());
                }
            };
            println!("{report}");

            releaser.cleaner().clean();
        }
    }

    Ok(())
}
