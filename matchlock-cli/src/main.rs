//! matchlock CLI - exhaustiveness checking for enum and closed-hierarchy
//! switches.
//!
//! Features:
//! - JSON program descriptions as input
//! - Sentinel type overrides via matchlock.toml
//! - Rayon-powered parallel analysis with deterministic output
//! - Plain and JSON report formats
//! - CI-friendly exit codes

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use matchlock_core::{
    analyze_program, init_structured_logging, load_config, load_program, print_json, print_plain,
    WellKnownTypes,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Exhaustiveness checker for enum and closed-hierarchy switches")]
pub struct Cli {
    /// Path to the JSON program description
    program: PathBuf,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Directory to search for matchlock.toml
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Global panic guard - reporting must never die silently
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] matchlock internal error: {}", info);
        eprintln!("[PANIC] The process will exit safely with code 2.");
    }));

    // Initialize structured logging (JSON to stderr, respects RUST_LOG)
    init_structured_logging();

    let cli = Cli::parse();

    // 1. Load the program description
    let loaded = load_program(&cli.program)
        .with_context(|| format!("Failed to load program from: {}", cli.program.display()))?;

    // 2. Apply matchlock.toml overrides (safe - don't fail on config errors)
    let mut well_known = loaded.well_known;
    let mut json_output = cli.json;
    let config_dir = cli
        .config_dir
        .clone()
        .or_else(|| cli.program.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    match load_config(&config_dir) {
        Ok(Some(cfg)) => {
            if let Some(sentinels) = cfg.sentinels {
                well_known = resolve_sentinels(&loaded, &sentinels, well_known)?;
            }
            if let Some(output) = cfg.output {
                if output.format.as_deref() == Some("json") {
                    json_output = true;
                }
            }
        }
        Ok(None) => {} // No config file - that's fine
        Err(e) => {
            eprintln!("[WARN] config load failed: {}", e);
        }
    }

    // 3. Analyze every switch and closure declaration
    let findings = analyze_program(
        &loaded.program,
        &well_known,
        &loaded.switches,
        &loaded.declarations,
    );

    // 4. Report results
    if json_output {
        print_json(&findings);
    } else {
        print_plain(&findings);
    }

    // 5. Exit code (CI-friendly)
    std::process::exit(if findings.is_empty() { 0 } else { 1 });
}

/// Resolves sentinel name overrides from matchlock.toml against the loaded
/// program's type table.
fn resolve_sentinels(
    loaded: &matchlock_core::LoadedProgram,
    sentinels: &matchlock_core::config::SentinelConfig,
    mut well_known: WellKnownTypes,
) -> Result<WellKnownTypes> {
    if let Some(ref name) = sentinels.match_failed {
        well_known.match_failed = Some(
            loaded
                .program
                .find_type(name)
                .ok_or_else(|| anyhow!("Sentinel type not found in program: {}", name))?,
        );
    }
    if let Some(ref name) = sentinels.invalid_enum_argument {
        well_known.invalid_enum_argument = Some(
            loaded
                .program
                .find_type(name)
                .ok_or_else(|| anyhow!("Sentinel type not found in program: {}", name))?,
        );
    }
    Ok(well_known)
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchlock_core::{parse_program, semantic::TypeId};

    const PROGRAM: &str = r#"
{
  "sentinels": { "match_failed": "MatchFailed" },
  "types": [
    { "name": "MatchFailed" },
    { "name": "OtherSignal" }
  ]
}
"#;

    #[test]
    fn test_resolve_sentinel_override() {
        let loaded = parse_program(PROGRAM, Path::new("p.json")).unwrap();
        let cfg = matchlock_core::config::SentinelConfig {
            match_failed: Some("OtherSignal".into()),
            invalid_enum_argument: None,
        };
        let wk = resolve_sentinels(&loaded, &cfg, loaded.well_known).unwrap();
        assert_eq!(wk.match_failed, loaded.program.find_type("OtherSignal"));
        assert_ne!(wk.match_failed, Some(TypeId(0)));
    }

    #[test]
    fn test_resolve_sentinel_unknown_name_fails() {
        let loaded = parse_program(PROGRAM, Path::new("p.json")).unwrap();
        let cfg = matchlock_core::config::SentinelConfig {
            match_failed: Some("NoSuchType".into()),
            invalid_enum_argument: None,
        };
        assert!(resolve_sentinels(&loaded, &cfg, loaded.well_known).is_err());
    }
}
