//! # Seed Subcommand
//!
//! Bulk-issues sample credentials into one wallet, for demos and for
//! exercising the wallet UI against a populated store.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::Duration;
use clap::Args;
use serde_json::{json, Map, Value};
use vcs_core::{Timestamp, WalletId};
use vcs_vc::IssueRequest;

use crate::Workspace;

const TYPES: [&str; 4] = ["GymMembership", "DriverLicense", "StudentID", "AccessBadge"];
const LEVELS: [&str; 3] = ["Gold", "Silver", "Bronze"];
const CITIES: [&str; 4] = ["Berlin", "Munich", "Hamburg", "Cologne"];

/// Arguments for `vcs seed`.
#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Wallet to fill.
    #[arg(long, default_value = "seed-wallet")]
    pub wallet: String,
    /// Number of credentials to issue.
    #[arg(long, default_value_t = 10)]
    pub count: u32,
}

/// Claims for the `index`-th sample credential.
fn sample_claims(index: u32) -> Map<String, Value> {
    let i = index as usize;
    let claims = json!({
        "index": index,
        "level": LEVELS[i % LEVELS.len()],
        "city": CITIES[i % CITIES.len()],
        "memberId": format!("M-{}", 1000 + index),
        "status": if index % 2 == 0 { "active" } else { "inactive" },
    });
    match claims {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Execute `vcs seed`.
pub fn run_seed(args: &SeedArgs, workspace: &Workspace, out: &mut dyn Write) -> Result<u8> {
    let wallet = WalletId::new(&args.wallet)
        .with_context(|| format!("invalid wallet id {:?}", args.wallet))?;
    let engine = workspace.engine()?;

    writeln!(out, "Seeding {} credentials to wallet: {wallet}", args.count)?;
    for index in 0..args.count {
        let now = Timestamp::now();
        let until = Timestamp::from_utc(
            *now.as_datetime() + Duration::days(180 + i64::from(index % 365)),
        );
        let request = IssueRequest {
            credential_type: TYPES[index as usize % TYPES.len()].to_string(),
            claims: sample_claims(index),
            valid_from: now.to_iso8601(),
            valid_until: until.to_iso8601(),
        };
        let credential = engine
            .issue(&wallet, &request)
            .with_context(|| format!("failed to issue sample credential {index}"))?;
        writeln!(out, "{}", credential.id())?;
    }
    writeln!(out, "Done")?;
    Ok(0)
}
