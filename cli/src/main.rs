//! BallotGuard command line, a thin adapter over the vote orchestrator.

use anyhow::{bail, Context};
use ballotguard_crypto::{Anonymizer, OsEntropy};
use ballotguard_identity::{check_digit, validate};
use ballotguard_ledger::{
    EngineConfig, ErrorResponse, HasVotedResponse, ReceiptResponse, VerifyVoteResponse,
    VoteOrchestrator,
};
use ballotguard_store::MemoryStore;
use ballotguard_types::{Candidate, CandidateId};
use ballotguard_utils::{format_millis, init_logging, LogFormat};
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ballotguard", about = "Voter anonymization and vote-integrity engine")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// flags and env vars override them.
    #[arg(long, global = true, env = "BALLOTGUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "BALLOTGUARD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "BALLOTGUARD_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Election votes are cast into.
    #[arg(long, global = true, env = "BALLOTGUARD_ELECTION_ID")]
    election_id: Option<String>,

    /// Hex-encoded signing secret (at least 16 bytes).
    #[arg(long, global = true, env = "BALLOTGUARD_SIGNING_SECRET", hide_env_values = true)]
    signing_secret: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Check an identity number's format, patterns and checksum.
    Validate { identity: String },

    /// Derive a fresh salted voter handle for an identity number.
    #[command(name = "derive-handle")]
    DeriveHandle { identity: String },

    /// Run a scripted election against an in-memory ledger and print the
    /// results as JSON.
    Demo {
        /// Number of voters to register and cast.
        #[arg(long, default_value_t = 12)]
        voters: usize,
    },

    /// Print the effective configuration as TOML.
    #[command(name = "print-config")]
    PrintConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let path = path.to_string_lossy();
            EngineConfig::from_toml_file(&path)
                .with_context(|| format!("loading config from {path}"))?
        }
        None => EngineConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = match format {
            LogFormat::Human => "human".to_string(),
            LogFormat::Json => "json".to_string(),
        };
    }
    if let Some(election_id) = cli.election_id {
        config.election_id = election_id;
    }
    if cli.signing_secret.is_some() {
        config.signing_secret = cli.signing_secret;
    }

    let format: LogFormat = config
        .log_format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    init_logging(format, &config.log_level);

    match cli.command {
        Command::Validate { identity } => {
            let result = validate(&identity);
            print_json(&json!({
                "valid": result.is_valid(),
                "reasons": result.reasons(),
            }))
        }
        Command::DeriveHandle { identity } => {
            let result = validate(&identity);
            if !result.is_valid() {
                bail!("invalid identity number: {}", result.reasons().join(", "));
            }
            let (handle, salt) = Anonymizer::new(Arc::new(OsEntropy)).derive(&identity)?;
            print_json(&json!({
                "voterHandle": handle,
                "salt": salt.to_hex(),
            }))
        }
        Command::Demo { voters } => run_demo(config, voters),
        Command::PrintConfig => {
            if config.signing_secret.is_some() {
                config.signing_secret = Some("<redacted>".to_string());
            }
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Identity numbers that pass validation, built by appending a check digit.
fn demo_identities(count: usize) -> Vec<String> {
    (0u64..)
        .map(|i| format!("{:011}", 40_713_000_000 + i * 7_919))
        .filter_map(|prefix| check_digit(&prefix).map(|d| format!("{prefix}{d}")))
        .filter(|id| validate(id).is_valid())
        .take(count)
        .collect()
}

fn run_demo(config: EngineConfig, voters: usize) -> anyhow::Result<()> {
    let secret = config.signing_secret(&OsEntropy)?;
    let election_id = config.election_id();
    tracing::info!(
        election = %election_id,
        voters,
        token_ttl = %format_millis(config.token_ttl_minutes * 60_000),
        "starting demo election"
    );

    let orch = VoteOrchestrator::new(MemoryStore::new(), secret, config);
    orch.create_election(
        election_id.clone(),
        vec![
            Candidate::new(1, "Ada Lovelace", Some("Analytical".into())),
            Candidate::new(2, "Grace Hopper", Some("Compilers".into())),
            Candidate::new(3, "Edsger Dijkstra", None),
        ],
    )?;

    let identities = demo_identities(voters);
    let mut last_cast = None;
    for (i, identity) in identities.iter().enumerate() {
        // One source per voter keeps the demo clear of the rate limiter.
        let source = format!("192.0.2.{}", i % 250);
        orch.register(identity, &source)?;
        let candidate = CandidateId::new(1 + (i % 3) as u32);
        match orch.cast_vote(identity, candidate, &source) {
            Ok(cast) => last_cast = Some((identity.clone(), candidate, cast)),
            Err(e) => print_json(&serde_json::to_value(ErrorResponse::from(&e))?)?,
        }
    }

    // Registering again reports the existing handle; a repeat vote is refused.
    if let Some(identity) = identities.first() {
        let again = orch.register(identity, "192.0.2.253")?.into_response();
        print_json(&json!({ "registerAgain": again }))?;
        if let Err(e) = orch.cast_vote(identity, CandidateId::new(1), "192.0.2.1") {
            print_json(&json!({ "repeatVote": ErrorResponse::from(&e) }))?;
        }
    }

    print_json(&json!({ "tally": orch.tally(&election_id)? }))?;

    if let Some((identity, candidate, cast)) = last_cast {
        let receipt = ReceiptResponse::from(orch.verify_receipt(cast.receipt_code.as_str())?);
        let has_voted = HasVotedResponse::from(orch.has_voted(&identity, "192.0.2.254")?);
        let verified = VerifyVoteResponse::from(orch.verify_vote(
            &cast.signature,
            candidate,
            &identity,
            cast.timestamp,
            &cast.token,
            cast.expires_at,
        )?);
        print_json(&json!({
            "cast": cast,
            "receipt": receipt,
            "hasVoted": has_voted,
            "verifyVote": verified,
        }))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_identities_are_valid_and_distinct() {
        let ids = demo_identities(20);
        assert_eq!(ids.len(), 20);
        assert!(ids.iter().all(|id| validate(id).is_valid()));
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 20);
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["ballotguard", "demo", "--voters", "3"]).unwrap();
        assert!(matches!(cli.command, Command::Demo { voters: 3 }));

        let cli = Cli::try_parse_from(["ballotguard", "--log-format", "json", "print-config"])
            .unwrap();
        assert_eq!(cli.log_format, Some(LogFormat::Json));
    }

    #[test]
    fn demo_runs_end_to_end() {
        run_demo(EngineConfig::default(), 5).unwrap();
    }
}
