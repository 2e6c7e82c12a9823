mod approval_cmd;
mod artifact;
mod bundle_cmd;
mod capability_cmd;
mod config_cmd;
mod contract;
mod evidence_cmd;
mod export;
mod gate_review;
mod init;
mod run;

use std::path::PathBuf;

use clap::{Args, Subcommand};
use uuid::Uuid;

#[derive(Subcommand)]
pub enum Commands {
    /// Create the config/artifact directories for first use.
    Init,

    /// Configuration inspection.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Structurally validate one artifact file against its schema.
    ValidateContract {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Register a new audit run.
    NewRun(NewRunArgs),

    /// Append one event to a run's audit chain.
    AppendEvent {
        #[arg(long)]
        run: Uuid,
        #[arg(long)]
        event: String,
    },

    /// List a run's audit events in chain order.
    ListEvents {
        #[arg(long)]
        run: Uuid,
        #[arg(long)]
        json: bool,
    },

    /// Verify a run's audit chain integrity.
    VerifyRun {
        #[arg(long)]
        run: Uuid,
        #[arg(long)]
        json: bool,
    },

    /// Attach an artifact file to a run.
    PutArtifact {
        #[arg(long)]
        run: Uuid,
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        mime: Option<String>,
        #[arg(long)]
        label: Option<String>,
    },

    /// Export a run's evidence and artifacts as a ZIP bundle.
    ExportEvidence {
        #[arg(long)]
        run: Uuid,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        max_include_bytes: Option<u64>,
        #[arg(long)]
        no_artifacts: bool,
    },

    /// Evaluate the Execution Gate over a DoD and Decision Lock.
    RunGate {
        #[arg(long)]
        dod: PathBuf,
        #[arg(long)]
        lock: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Run the role-ordered reviewer orchestrator over one step.
    ReviewStep {
        #[arg(long)]
        envelope: PathBuf,
        #[arg(long)]
        patch: PathBuf,
        #[arg(long)]
        dod: PathBuf,
        #[arg(long)]
        lock: PathBuf,
        #[arg(long)]
        plan: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Compute the normalized content hash of an artifact bundle.
    BundleHash {
        #[arg(long)]
        bundle: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Print the static capability registry.
    ListCapabilities {
        #[arg(long)]
        json: bool,
    },

    /// Verify an ordered runner evidence chain against its bound plan.
    VerifyEvidence {
        #[arg(long)]
        evidence: PathBuf,
        #[arg(long)]
        plan: PathBuf,
        #[arg(long)]
        dod: PathBuf,
        #[arg(long = "plan-hash")]
        plan_hash: String,
        #[arg(long)]
        json: bool,
    },

    /// Verify an approval bundle's RSA-SHA256 signatures and nonces.
    VerifyApproval {
        #[arg(long)]
        bundle: PathBuf,
        #[arg(long)]
        keys: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the resolved configuration.
    Show {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
pub struct NewRunArgs {
    #[arg(long)]
    pub run: Option<Uuid>,
    #[arg(long)]
    pub actor: Option<String>,
    #[arg(long)]
    pub host: Option<String>,
    #[arg(long)]
    pub correlation: Option<String>,
    #[arg(long)]
    pub meta: Option<String>,
}

pub use approval_cmd::handle_verify_approval;
pub use artifact::handle_put_artifact;
pub use bundle_cmd::handle_bundle_hash;
pub use capability_cmd::handle_list_capabilities;
pub use config_cmd::handle_config_show;
pub use contract::handle_validate_contract;
pub use evidence_cmd::handle_verify_evidence;
pub use export::handle_export_evidence;
pub use gate_review::{handle_review_step, handle_run_gate};
pub use init::handle_init;
pub use run::{handle_append_event, handle_list_events, handle_new_run, handle_verify_run};
