//! # Keys Subcommand
//!
//! Loads the issuer key record, creating and persisting one if it is
//! missing or unusable, and prints the public identity. The private key is
//! never printed.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::{print_json, Workspace};

/// Arguments for the `vcs keys` subcommand.
#[derive(Args, Debug)]
pub struct KeysArgs {
    /// Print a JSON object instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IssuerIdentity<'a> {
    issuer_did: &'a str,
    verification_method: String,
    public_key: &'a str,
}

/// Execute the keys subcommand.
pub fn run_keys(args: &KeysArgs, workspace: &Workspace, out: &mut dyn Write) -> Result<u8> {
    let custodian = workspace.custodian()?;
    let identity = IssuerIdentity {
        issuer_did: custodian.issuer_did(),
        verification_method: custodian.verification_method(),
        public_key: custodian.public_key(),
    };

    if args.json {
        print_json(out, &identity)?;
    } else {
        writeln!(out, "Issuer DID:          {}", identity.issuer_did)?;
        writeln!(out, "Verification method: {}", identity.verification_method)?;
        writeln!(out, "Public key (hex):    {}", identity.public_key)?;
    }
    Ok(0)
}
