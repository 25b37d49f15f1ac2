use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use weather_core::{Config, Dispatcher};

use crate::{configure, invoke, server};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-bot", version, about = "Telegram weather bot")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the Telegram webhook over HTTP.
    Serve {
        /// Listen address; defaults to 0.0.0.0:$PORT (8080 when PORT is unset).
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Handle a single update (or cloud-function event) and print the acknowledgment.
    Handle {
        /// JSON file to read; stdin when absent.
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Interactively store credentials in the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { bind } => {
                let dispatcher = Arc::new(load_dispatcher()?);
                let addr = bind.unwrap_or_else(default_bind);
                server::serve(addr, dispatcher).await?;
            }
            Command::Handle { input } => {
                let dispatcher = load_dispatcher()?;
                let payload = match input {
                    Some(path) => tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("Failed to read {}", path.display()))?,
                    None => {
                        let mut buf = String::new();
                        tokio::io::stdin()
                            .read_to_string(&mut buf)
                            .await
                            .context("Failed to read update from stdin")?;
                        buf
                    }
                };

                let ack = invoke::invoke(&dispatcher, &payload).await;
                println!("{}", serde_json::to_string(&ack)?);
            }
            Command::Configure => {
                let path = Config::config_file_path()?;
                configure::run(&path)?;
                println!("Saved configuration to {}", path.display());
            }
        }

        Ok(())
    }
}

fn load_dispatcher() -> anyhow::Result<Dispatcher> {
    let config = Config::load()?;
    Ok(Dispatcher::from_config(&config)?)
}

fn default_bind() -> SocketAddr {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);
    SocketAddr::from(([0, 0, 0, 0], port))
}
