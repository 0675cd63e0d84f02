//! clientforge CLI entrypoint
//! Parses command-line arguments and dispatches to the core generator.
#![deny(unsafe_code)]

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use clientforge::generation::TracingSink;
use clientforge::generate_sdk;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clientforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate a type-safe Python client from an OpenAPI specification
    Generate {
        /// Path or URL to the OpenAPI specification (YAML or JSON)
        spec_source: String,
        /// Directory where the generated client will be saved
        #[arg(long, short, default_value = "./sdk")]
        output: PathBuf,
        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
        /// Skip the security confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Printed before generation unless `--yes` is passed.
const SECURITY_NOTICE: &str = "\
============================ Security notice ============================
Code generators can execute malicious payloads from untrusted OpenAPI
specs. A schema named \"User:\\nimport os; os.system('rm -rf /')\" could
inject code into the generated client.

This generator sanitizes inputs, but the safest approach is to review
the spec yourself before generating.
=========================================================================";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate {
            spec_source,
            output,
            verbose,
            yes,
        } => {
            let default_level = if *verbose { Level::DEBUG } else { Level::INFO };
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::from_default_env().add_directive(default_level.into()),
                )
                .init();

            if !*yes && !confirm_generation(spec_source)? {
                info!("Aborted");
                std::process::exit(1);
            }

            info!("Generating client from {spec_source}");

            match generate_sdk(spec_source, output, Arc::new(TracingSink)).await {
                Ok(_) => {
                    info!("Successfully generated client in {}", output.display());
                    Ok(())
                }
                Err(e) if *verbose => {
                    // Verbose mode surfaces the full error chain.
                    Err(e).context("client generation failed")
                }
                Err(e) => {
                    error!("{e}");
                    std::process::exit(1);
                }
            }
        }
    }
}

/// Shows the security notice and asks for an explicit go-ahead.
fn confirm_generation(spec_source: &str) -> anyhow::Result<bool> {
    println!("{SECURITY_NOTICE}");
    println!("About to generate a client from: {spec_source}");
    print!("I trust this spec and want to proceed [y/N]: ");
    std::io::stdout().flush().context("failed to flush stdout")?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
