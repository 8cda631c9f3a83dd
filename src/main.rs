// src/main.rs - astra-native: run the built-in firmware against a SITL simulator
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use astra_native::config::{ConfigOverrides, HarnessConfig, load_config};
use astra_native::echo::EchoFirmware;
use astra_native::error::HarnessError;
use astra_native::{Board, install_crash_handler, logging, run};

#[derive(Parser, Debug)]
#[command(name = "astra-native", about = "Native harness for Astra flight software.")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SITL host (overrides the config file)
    #[arg(long)]
    host: Option<String>,

    /// SITL port (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that the SITL simulator accepts a connection
    Probe,
    /// Echo every line received from SITL back with a timestamp
    Echo,
}

fn load(cli: &Cli) -> Result<HarnessConfig, HarnessError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => HarnessConfig::default(),
    };
    config.apply_overrides(&ConfigOverrides {
        host: cli.host.clone(),
        port: cli.port,
        log_level: cli.log_level.clone(),
    })?;
    Ok(config)
}

fn try_main(cli: Cli) -> Result<ExitCode, HarnessError> {
    let config = load(&cli)?;
    logging::init_logging(&config.logging.level)?;
    tracing::info!("astra-native {}", env!("CARGO_PKG_VERSION"));

    let endpoint = format!("{}:{}", config.sitl.host, config.sitl.port);
    let mut board = Board::new(config);

    match cli.command {
        Commands::Probe => {
            if board.connect_sitl() {
                println!("SITL reachable at {}", endpoint);
                board.serial.serial.disconnect_sitl();
                Ok(ExitCode::SUCCESS)
            } else {
                println!("SITL not reachable at {}", endpoint);
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Echo => {
            install_crash_handler();
            if !board.serial.serial.is_sitl_connected() && !board.connect_sitl() {
                tracing::error!("Could not connect to SITL at {}", endpoint);
                return Ok(ExitCode::FAILURE);
            }
            let mut firmware = EchoFirmware::new();
            run(&mut firmware, &mut board);
            tracing::info!("Echoed {} lines", firmware.lines_echoed());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match try_main(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("astra-native: {}", e);
            ExitCode::FAILURE
        }
    }
}
