//! CLI for hwsnap: point-in-time hardware telemetry for small Linux boards.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hwsnap")]
#[command(about = "hwsnap: a point-in-time hardware telemetry report")]
#[command(version = hwsnap_core::VERSION)]
struct Cli {
    /// Emit machine-readable JSON instead of text
    #[arg(short, long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report hwmon sensor readings only
    Sensors,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Sensors) => commands::sensors::run(cli.json),
        None => commands::overview::run(cli.json),
    }
}
