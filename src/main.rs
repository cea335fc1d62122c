//! # qrgen CLI
//!
//! ## Usage
//!
//! ```bash
//! # Serve the generator page
//! qrgen serve --listen 0.0.0.0:8080
//!
//! # With custom colors and timings
//! qrgen serve --config qrgen.json
//!
//! # List available styles
//! qrgen styles
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use qrgen::{
    GeneratorConfig, QrGenError,
    server::{self, ServerConfig},
    style,
};

/// qrgen - Styled QR code generator
#[derive(Parser, Debug)]
#[command(name = "qrgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the generator page over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,

        /// JSON file overriding generator defaults
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// List available styles and the shapes they use
    Styles,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), QrGenError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { listen, config } => {
            let generator = match config {
                Some(path) => GeneratorConfig::load(&path)?,
                None => GeneratorConfig::default(),
            };

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(ServerConfig {
                listen_addr: listen,
                generator,
            }))?;
        }
        Commands::Styles => {
            println!("Available styles:");
            for (id, shapes) in style::STYLES {
                println!(
                    "  {:<16} dots={:<16} corners={:<14} corner-dots={}",
                    id, shapes.dots_type, shapes.corners_type, shapes.corner_dots_type
                );
            }
        }
    }

    Ok(())
}
