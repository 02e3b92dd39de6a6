//! # vcs CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vcs_core::{Did, DEFAULT_ISSUER_DID};

use vcs_cli::canonical::{run_canonicalize, CanonicalizeArgs};
use vcs_cli::credential::{
    run_delete, run_issue, run_list, run_verify, DeleteArgs, IssueArgs, ListArgs, VerifyArgs,
};
use vcs_cli::keys::{run_keys, KeysArgs};
use vcs_cli::seed::{run_seed, SeedArgs};
use vcs_cli::Workspace;

/// Verifiable credential server toolkit.
///
/// Operates directly on the issuer key file and wallet files used by the
/// HTTP service.
#[derive(Parser, Debug)]
#[command(name = "vcs", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding `issuer-keys.json` and `wallets/`.
    #[arg(long, env = "VCS_DATA_DIR", default_value = "./data", global = true)]
    data_dir: PathBuf,

    /// DID used when a new issuer key pair is generated.
    #[arg(long, env = "VCS_ISSUER_DID", default_value = DEFAULT_ISSUER_DID, global = true)]
    issuer_did: Did,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load or create the issuer key pair and print its public identity.
    Keys(KeysArgs),

    /// Issue a signed credential into a wallet.
    Issue(IssueArgs),

    /// List the credentials in a wallet.
    List(ListArgs),

    /// Verify a credential document. Exits with status 1 when invalid.
    Verify(VerifyArgs),

    /// Delete a credential from a wallet.
    Delete(DeleteArgs),

    /// Issue a batch of sample credentials into a wallet.
    Seed(SeedArgs),

    /// Print the JCS canonical form of a JSON document.
    Canonicalize(CanonicalizeArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let workspace = Workspace {
        data_dir: cli.data_dir,
        issuer_did: cli.issuer_did,
    };
    tracing::debug!(data_dir = %workspace.data_dir.display(), "resolved data directory");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = match &cli.command {
        Commands::Keys(args) => run_keys(args, &workspace, &mut out),
        Commands::Issue(args) => run_issue(args, &workspace, &mut out),
        Commands::List(args) => run_list(args, &workspace, &mut out),
        Commands::Verify(args) => run_verify(args, &workspace, &mut out),
        Commands::Delete(args) => run_delete(args, &workspace, &mut out),
        Commands::Seed(args) => run_seed(args, &workspace, &mut out),
        Commands::Canonicalize(args) => run_canonicalize(args, &mut out),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
