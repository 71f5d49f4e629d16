use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use videoplayer_bridge::config::AppConfig;
use videoplayer_bridge::engine::RawTrack;
use videoplayer_bridge::scenario::Scenario;
use videoplayer_bridge::tracks::{DisplayTrack, resolve};
use videoplayer_bridge::utils::init_logging;

/// Track resolution and selection for native video player engines
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve track names as an engine would report them (index = position)
    Resolve {
        #[arg(value_name = "NAME", required = true)]
        names: Vec<String>,
    },
    /// Run a scripted session on the simulated engine and print its events
    Simulate {
        #[arg(value_name = "SCENARIO")]
        scenario: PathBuf,
    },
    /// Print the effective configuration
    Config {
        /// Print the config file location instead
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Resolve { names } => {
            for (index, name) in names.into_iter().enumerate() {
                let track = DisplayTrack::from(resolve(&RawTrack::new(index as i32, name)));
                println!("{}", serde_json::to_string(&track)?);
            }
        }
        Command::Simulate { scenario } => {
            let loaded = Scenario::load(&scenario)
                .with_context(|| format!("Failed to load scenario {}", scenario.display()))?;
            let outcome = loaded.run(AppConfig::load()).await;
            for result in outcome.results.iter().filter(|r| !r.result) {
                eprintln!("{}", serde_json::to_string(result)?);
            }
            for event in &outcome.events {
                println!("{}", serde_json::to_string(event)?);
            }
        }
        Command::Config { path } => {
            if path {
                println!("{}", AppConfig::config_path().display());
            } else {
                let config = AppConfig::load();
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}
