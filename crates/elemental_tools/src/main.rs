//! Elemental Reactions - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use elemental_tools::loader::load_settings_from_file;
use elemental_tools::simulate::{simulate, SimulationRequest};
use elemental_tools::validate::validate_settings_file;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "elemental-tools")]
#[command(about = "Development tools for elemental reaction settings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a reaction settings file
    Validate {
        /// Path to the settings file
        #[arg(default_value = "assets/data/reactions.ron")]
        path: PathBuf,
        /// Treat inert rules as errors
        #[arg(long)]
        strict: bool,
    },
    /// Apply one effect between two fresh combatants and print what happened
    Simulate {
        /// Path to the settings file
        path: PathBuf,
        /// Tags owned by the attacker
        #[arg(long, value_delimiter = ',')]
        source_tags: Vec<String>,
        /// Tags owned by the victim
        #[arg(long, value_delimiter = ',')]
        target_tags: Vec<String>,
        /// Effect the attacker applies
        #[arg(long)]
        effect: String,
        /// Max health of the victim
        #[arg(long, default_value_t = 100.0)]
        target_health: f32,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path, strict } => {
            tracing::info!("Validating reaction settings: {}", path.display());
            match validate_settings_file(&path) {
                Ok(report) => {
                    for error in &report.errors {
                        tracing::error!("{error}");
                    }
                    for warning in &report.warnings {
                        tracing::warn!("{warning}");
                    }
                    if report.passes(strict) {
                        tracing::info!("Validation passed ({} rules)", report.rule_count);
                    } else {
                        tracing::error!(
                            "Validation failed: {} errors, {} warnings",
                            report.errors.len(),
                            report.warnings.len()
                        );
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    tracing::error!("Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Simulate {
            path,
            source_tags,
            target_tags,
            effect,
            target_health,
            json,
        } => {
            let settings = match load_settings_from_file(&path) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::error!("{e}");
                    std::process::exit(1);
                }
            };
            let request = SimulationRequest {
                source_tags,
                target_tags,
                effect,
                target_health,
            };
            match simulate(&settings, &request) {
                Ok(outcome) if json => match serde_json::to_string_pretty(&outcome) {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        tracing::error!("Failed to serialize outcome: {e}");
                        std::process::exit(1);
                    }
                },
                Ok(outcome) => print!("{}", outcome.to_text()),
                Err(e) => {
                    tracing::error!("Simulation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}
