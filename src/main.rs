//! Streetlight load entry point: CLI wiring and config-driven run.

use std::path::Path;
use std::process;

use streetlight_sim::config::ScenarioConfig;
use streetlight_sim::error::SimError;
use streetlight_sim::runner;
use streetlight_sim::telemetry::init_tracing;
use tracing::error;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
}

fn print_help() {
    eprintln!("streetlight-sim: street-lighting load scenario engine");
    eprintln!();
    eprintln!("Usage: streetlight-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
    eprintln!("Set RUST_LOG to change log verbosity (default: info).");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    if cli.scenario_path.is_some() && cli.preset.is_some() {
        eprintln!("error: --scenario and --preset are mutually exclusive");
        process::exit(1);
    }

    cli
}

fn load_config(cli: &CliArgs) -> Result<ScenarioConfig, SimError> {
    // --scenario takes priority, then --preset, then baseline default
    if let Some(ref path) = cli.scenario_path {
        Ok(ScenarioConfig::from_toml_file(Path::new(path))?)
    } else if let Some(ref name) = cli.preset {
        Ok(ScenarioConfig::from_preset(name)?)
    } else {
        Ok(ScenarioConfig::baseline())
    }
}

fn main() {
    init_tracing();
    let cli = parse_args();

    let outcome = load_config(&cli).and_then(|cfg| runner::run(&cfg));
    match outcome {
        Ok(outcome) => {
            for path in &outcome.outputs {
                eprintln!("Wrote {}", path.display());
            }
            println!("{}", outcome.summary);
        }
        Err(e) => {
            error!(error = %e, "run failed");
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
