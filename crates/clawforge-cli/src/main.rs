use anyhow::Result;
use clap::Parser;
use tracing::error;

mod commands;
mod config;

use commands::{Commands, ConfigCommands};
use config::AppConfig;

/// clawctl - the command-line shell around the clawforge governance core.
#[derive(Parser)]
#[command(name = "clawctl")]
#[command(about = "Session governance and attestation tooling for AI-assisted code changes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AppConfig::load();
    let exit_code = match run(&cli, &config) {
        Ok(code) => code,
        Err(err) => {
            error!("command failed: {err:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: &Cli, config: &AppConfig) -> Result<i32> {
    match &cli.command {
        Commands::Init => commands::handle_init(config),
        Commands::Config { command: ConfigCommands::Show { json } } => commands::handle_config_show(config, *json),
        Commands::ValidateContract { file, json } => commands::handle_validate_contract(file, *json),
        Commands::NewRun(args) => commands::handle_new_run(config, args),
        Commands::AppendEvent { run, event } => commands::handle_append_event(config, *run, event),
        Commands::ListEvents { run, json } => commands::handle_list_events(config, *run, *json),
        Commands::VerifyRun { run, json } => commands::handle_verify_run(config, *run, *json),
        Commands::PutArtifact { run, file, mime, label } => {
            commands::handle_put_artifact(config, *run, file, mime.as_deref(), label.as_deref())
        }
        Commands::ExportEvidence { run, out, max_include_bytes, no_artifacts } => {
            commands::handle_export_evidence(config, *run, out, *max_include_bytes, *no_artifacts)
        }
        Commands::RunGate { dod, lock, json } => commands::handle_run_gate(dod, lock, *json),
        Commands::ReviewStep { envelope, patch, dod, lock, plan, json } => {
            commands::handle_review_step(envelope, patch, dod, lock, plan, *json)
        }
        Commands::BundleHash { bundle, json } => commands::handle_bundle_hash(bundle, *json),
        Commands::ListCapabilities { json } => commands::handle_list_capabilities(*json),
        Commands::VerifyEvidence { evidence, plan, dod, plan_hash, json } => {
            commands::handle_verify_evidence(evidence, plan, dod, plan_hash, *json)
        }
        Commands::VerifyApproval { bundle, keys, json } => commands::handle_verify_approval(bundle, keys, *json),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).with_level(true))
        .with(tracing_subscriber::filter::LevelFilter::from_level(level))
        .try_init();
}
