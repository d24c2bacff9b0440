use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vestnik::config::{interval::parse_interval, Config};

#[derive(Parser)]
#[command(
    name = "vestnik",
    version,
    about = "Russian news crawler for aif.ru, russian.rt.com and svpressa.ru",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); environment variables used when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one crawl to completion
    Crawl,

    /// Crawl on a fixed delay until interrupted
    Auto {
        /// Delay between runs (e.g. "2d5h10m"), overriding the config
        #[arg(short, long)]
        interval: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(&cli.log_format, cli.verbose)?;

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate()?;

    match cli.command {
        Commands::Crawl => {
            let control = vestnik::build(&config)?;
            let run = control.start_run()?;
            run.await?;
        }
        Commands::Auto { interval } => {
            let mut config = config;
            if let Some(spec) = interval {
                parse_interval(&spec)?;
                config.scheduler.interval = Some(spec);
                config.scheduler.auto_enabled = true;
            }
            let control = vestnik::build(&config)?;
            if !control.auto_schedule_status().enabled {
                control.enable_auto_schedule();
            }

            tracing::info!("auto crawl running, press Ctrl-C to stop");
            tokio::signal::ctrl_c().await?;

            control.disable_auto_schedule();
            if control.run_status().in_progress {
                control.stop_run()?;
            }
            tracing::info!("shut down");
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("vestnik=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("vestnik=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
