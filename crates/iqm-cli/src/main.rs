//! IQM Command-Line Interface
//!
//! The main entry point for the `iqm` tool: list the static IQM devices and
//! transpile JSON circuits into the wire format the execution service accepts.
//!
//! ```text
//! $ iqm devices
//! $ iqm transpile -i bell.json -d adonis -o bell.wire.json
//! $ iqm transpile -i ghz.json --architecture arch.json --drop-final-rz
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::transpile::TranspileArgs;
use commands::{devices, transpile, version};

/// iqm - device-aware transpilation for IQM quantum computers
#[derive(Parser, Debug)]
#[command(name = "iqm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Transpile a JSON circuit for an IQM device
    Transpile(TranspileArgs),

    /// List the static IQM devices
    Devices,

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging: RUST_LOG wins over -v
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Transpile(args) => transpile::execute(&args),

        Commands::Devices => devices::execute(),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transpile_defaults() {
        let cli = Cli::try_parse_from(["iqm", "transpile", "-i", "c.json"]).unwrap();
        let Commands::Transpile(args) = cli.command else {
            panic!("expected transpile");
        };
        assert_eq!(args.input, "c.json");
        assert!(args.output.is_none());
        assert_eq!(args.device, "adonis");
        assert!(args.architecture.is_none());
        assert!(args.mapping.is_empty());
        assert_eq!(args.max_rounds, iqm_compile::DEFAULT_MAX_ROUNDS);
        assert!(!args.drop_final_rz);
        assert!(!args.no_simplify);
    }

    #[test]
    fn test_parse_transpile_all_flags() {
        let cli = Cli::try_parse_from([
            "iqm",
            "-vv",
            "transpile",
            "--input",
            "c.json",
            "-o",
            "out.json",
            "-d",
            "apollo",
            "--map",
            "q0=QB3",
            "--map",
            "q1=QB4",
            "--max-rounds",
            "3",
            "--drop-final-rz",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Transpile(args) = cli.command else {
            panic!("expected transpile");
        };
        assert_eq!(args.output.as_deref(), Some("out.json"));
        assert_eq!(args.device, "apollo");
        assert_eq!(args.mapping, ["q0=QB3", "q1=QB4"]);
        assert_eq!(args.max_rounds, 3);
        assert!(args.drop_final_rz);
    }

    #[test]
    fn test_parse_requires_input() {
        assert!(Cli::try_parse_from(["iqm", "transpile"]).is_err());
    }

    #[test]
    fn test_parse_conflicting_flags() {
        assert!(
            Cli::try_parse_from([
                "iqm",
                "transpile",
                "-i",
                "c.json",
                "--no-simplify",
                "--drop-final-rz"
            ])
            .is_err()
        );
        assert!(
            Cli::try_parse_from([
                "iqm",
                "transpile",
                "-i",
                "c.json",
                "-d",
                "apollo",
                "--architecture",
                "a.json"
            ])
            .is_err()
        );
    }

    #[test]
    fn test_parse_simple_commands() {
        assert!(matches!(
            Cli::try_parse_from(["iqm", "devices"]).unwrap().command,
            Commands::Devices
        ));
        assert!(matches!(
            Cli::try_parse_from(["iqm", "version"]).unwrap().command,
            Commands::Version
        ));
        assert!(Cli::try_parse_from(["iqm", "deploy"]).is_err());
    }
}
