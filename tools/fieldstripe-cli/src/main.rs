mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::{DecodeArgs, EncodeArgs, SchemaArgs};

#[derive(Parser)]
#[command(about = "Field-striped encoding of protobuf-described records")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode JSON records into a directory of stripes
    Encode(EncodeArgs),
    /// Decode a directory of stripes back into JSON lines
    Decode(DecodeArgs),
    /// Show the resolved schema of a message
    Schema(SchemaArgs),
}

fn main() -> Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Encode(args) => args.run(),
        Commands::Decode(args) => args.run(),
        Commands::Schema(args) => args.run(),
    }
}
