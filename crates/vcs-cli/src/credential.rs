//! # Credential Subcommands
//!
//! `issue`, `list`, `delete` and `verify`, operating on the same
//! `<data_dir>/wallets/<walletId>.json` files the HTTP service uses.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value};
use vcs_core::WalletId;
use vcs_vc::IssueRequest;

use crate::{print_json, read_json_input, Workspace};

/// Arguments for `vcs issue`.
#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Wallet to issue into.
    #[arg(long)]
    pub wallet: String,
    /// Credential type tag, e.g. `DriverLicense`.
    #[arg(long = "type", value_name = "TYPE")]
    pub credential_type: String,
    /// Claims as a JSON object.
    #[arg(long, default_value = "{}")]
    pub claims: String,
    /// Start of validity (RFC 3339 or YYYY-MM-DD).
    #[arg(long)]
    pub valid_from: String,
    /// End of validity (RFC 3339 or YYYY-MM-DD).
    #[arg(long)]
    pub valid_until: String,
}

/// Arguments for `vcs list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Wallet to list.
    #[arg(long)]
    pub wallet: String,
}

/// Arguments for `vcs delete`.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Wallet holding the credential.
    #[arg(long)]
    pub wallet: String,
    /// Credential id (`urn:uuid:...`).
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Arguments for `vcs verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Credential document; reads stdin when omitted or `-`.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

fn parse_wallet(raw: &str) -> Result<WalletId> {
    WalletId::new(raw).with_context(|| format!("invalid wallet id {raw:?}"))
}

/// Execute `vcs issue`.
pub fn run_issue(args: &IssueArgs, workspace: &Workspace, out: &mut dyn Write) -> Result<u8> {
    let wallet = parse_wallet(&args.wallet)?;
    let claims: Map<String, Value> =
        serde_json::from_str(&args.claims).context("--claims must be a JSON object")?;
    let request = IssueRequest {
        credential_type: args.credential_type.clone(),
        claims,
        valid_from: args.valid_from.clone(),
        valid_until: args.valid_until.clone(),
    };

    let credential = workspace.engine()?.issue(&wallet, &request)?;
    print_json(out, &credential)?;
    Ok(0)
}

/// Execute `vcs list`.
pub fn run_list(args: &ListArgs, workspace: &Workspace, out: &mut dyn Write) -> Result<u8> {
    let wallet = parse_wallet(&args.wallet)?;
    let credentials = workspace.engine()?.list(&wallet)?;
    print_json(out, &credentials)?;
    Ok(0)
}

/// Execute `vcs delete`.
pub fn run_delete(args: &DeleteArgs, workspace: &Workspace, out: &mut dyn Write) -> Result<u8> {
    let wallet = parse_wallet(&args.wallet)?;
    let deleted = workspace.engine()?.delete(&wallet, &args.id)?;
    print_json(out, &deleted)?;
    Ok(0)
}

/// Execute `vcs verify`. Exit status 1 when the credential is invalid.
///
/// Uses the issuer keys already in the data directory and fails if there
/// are none.
pub fn run_verify(args: &VerifyArgs, workspace: &Workspace, out: &mut dyn Write) -> Result<u8> {
    let document = read_json_input(args.file.as_deref())?;
    verify_document(&document, workspace, out)
}

fn verify_document(document: &Value, workspace: &Workspace, out: &mut dyn Write) -> Result<u8> {
    let result = workspace.verifier()?.verify_credential(Some(document));
    print_json(out, &result)?;
    Ok(if result.valid { 0 } else { 1 })
}
