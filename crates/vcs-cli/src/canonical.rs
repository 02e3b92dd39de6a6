//! # Canonicalize Subcommand
//!
//! Prints the RFC 8785 form of a JSON document: the exact text that is
//! signed when the document is a credential body.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use vcs_core::CanonicalBytes;

use crate::read_json_input;

/// Arguments for `vcs canonicalize`.
#[derive(Args, Debug)]
pub struct CanonicalizeArgs {
    /// JSON document; reads stdin when omitted or `-`.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// Execute the canonicalize subcommand.
pub fn run_canonicalize(args: &CanonicalizeArgs, out: &mut dyn Write) -> Result<u8> {
    let document = read_json_input(args.file.as_deref())?;
    let canonical =
        CanonicalBytes::from_value(&document).context("failed to canonicalize document")?;
    writeln!(out, "{canonical}")?;
    Ok(0)
}
