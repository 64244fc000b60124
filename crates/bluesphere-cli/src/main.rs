mod archipelago;
mod bizhawk;
mod commands;
mod controls;
mod input;

use std::path::PathBuf;

use anyhow::Result;
use bluesphere_core::Config;
use bluesphere_core::config::CONFIG_FILE;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bluesphere")]
#[command(about = "Blue Sphere hint client for Archipelago", version)]
struct Cli {
    #[arg(short, long, default_value = CONFIG_FILE, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    connection: ConnectionArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Track stages and send hints (default)
    Run(ConnectionArgs),
    /// Check that the emulator is running a supported ROM
    Validate(ConnectionArgs),
    /// World generation (unsupported for hint games)
    Generate,
}

#[derive(Args, Clone, Default)]
struct ConnectionArgs {
    /// Archipelago server address
    #[arg(long, env = "BLUESPHERE_SERVER")]
    server: Option<String>,

    /// Slot name to connect as
    #[arg(long, env = "BLUESPHERE_SLOT")]
    slot: Option<String>,

    #[arg(long, env = "BLUESPHERE_PASSWORD")]
    password: Option<String>,

    /// BizHawk connector port
    #[arg(long)]
    bizhawk_port: Option<u16>,

    /// Join Ring Link on connect
    #[arg(long)]
    ring_link: bool,
}

impl ConnectionArgs {
    fn apply(self, config: &mut Config) {
        if let Some(server) = self.server {
            config.server = server;
        }
        if self.slot.is_some() {
            config.slot = self.slot;
        }
        if self.password.is_some() {
            config.password = self.password;
        }
        if let Some(port) = self.bizhawk_port {
            config.bizhawk.port = port;
        }
        if self.ring_link {
            config.ring_link.enabled = true;
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("bluesphere=info".parse()?))
        .init();

    let cli = Cli::parse();

    let mut config = match Config::load(&cli.config) {
        Ok(c) => {
            info!("Loaded config from {:?}", cli.config);
            c
        }
        Err(e) if e.is_not_found() => Config::default(),
        Err(e) => {
            warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        }
    };

    match cli.command {
        None => {
            cli.connection.apply(&mut config);
            commands::tracking::run(&config)
        }
        Some(Command::Run(args)) => {
            cli.connection.apply(&mut config);
            args.apply(&mut config);
            commands::tracking::run(&config)
        }
        Some(Command::Validate(args)) => {
            cli.connection.apply(&mut config);
            args.apply(&mut config);
            commands::validate::run(&config)
        }
        Some(Command::Generate) => commands::generate::run(),
    }
}
