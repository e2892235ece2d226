//! Transpile command implementation.

use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context, Result};
use clap::Args;
use console::style;

use iqm_compile::{DEFAULT_MAX_ROUNDS, SimplifyOptions};
use iqm_device::{TranspileOptions, serialize_circuit};

use super::common::{load_circuit, load_device};

/// Arguments of `iqm transpile`.
#[derive(Args, Debug)]
pub struct TranspileArgs {
    /// Input circuit (JSON)
    #[arg(short, long)]
    pub input: String,

    /// Output file for the wire-format circuit (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Static device name (adonis, valkmusa, apollo, aphrodite)
    #[arg(short, long, default_value = "adonis", conflicts_with = "architecture")]
    pub device: String,

    /// Device architecture JSON as reported by the execution service
    #[arg(long)]
    pub architecture: Option<String>,

    /// Pin a logical qubit to a device qubit, e.g. `--map q0=QB3` (repeatable)
    #[arg(long = "map", value_name = "LOGICAL=PHYSICAL")]
    pub mapping: Vec<String>,

    /// Maximum number of simplification rounds
    #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS)]
    pub max_rounds: usize,

    /// Drop Z rotations that directly precede measurements
    #[arg(long)]
    pub drop_final_rz: bool,

    /// Skip the simplification stage
    #[arg(long, conflicts_with_all = ["max_rounds", "drop_final_rz"])]
    pub no_simplify: bool,
}

impl TranspileArgs {
    /// Build the pipeline options from the command-line flags.
    pub fn options(&self) -> Result<TranspileOptions> {
        let simplify = (!self.no_simplify).then(|| {
            SimplifyOptions::default()
                .with_max_rounds(self.max_rounds)
                .with_drop_final_rz(self.drop_final_rz)
        });
        let mut options = TranspileOptions::default().with_simplify(simplify);
        if !self.mapping.is_empty() {
            options = options.with_initial_mapping(parse_mapping(&self.mapping)?);
        }
        Ok(options)
    }
}

/// Parse `LOGICAL=PHYSICAL` pairs.
fn parse_mapping(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    let mut mapping = BTreeMap::new();
    for pair in pairs {
        let (logical, physical) = pair
            .split_once('=')
            .with_context(|| format!("Invalid mapping '{pair}', expected LOGICAL=PHYSICAL"))?;
        let (logical, physical) = (logical.trim(), physical.trim());
        if logical.is_empty() || physical.is_empty() {
            anyhow::bail!("Invalid mapping '{pair}', expected LOGICAL=PHYSICAL");
        }
        if mapping
            .insert(logical.to_string(), physical.to_string())
            .is_some()
        {
            anyhow::bail!("Qubit {logical} is mapped twice");
        }
    }
    Ok(mapping)
}

/// Execute the transpile command.
///
/// Progress goes to stderr so the wire JSON can be piped when no output file
/// is given.
pub fn execute(args: &TranspileArgs) -> Result<()> {
    let device = load_device(&args.device, args.architecture.as_deref())?;
    let options = args.options()?;

    eprintln!(
        "{} Transpiling {} for {}",
        style("→").cyan().bold(),
        style(&args.input).green(),
        style(device.name()).yellow()
    );

    let circuit = load_circuit(&args.input)?;
    eprintln!(
        "  Loaded: {} qubits, {} ops, depth {}",
        circuit.all_qubits().len(),
        circuit.num_operations(),
        circuit.depth()
    );

    let outcome = device
        .transpile(&circuit, &options)
        .with_context(|| format!("Failed to transpile for {}", device.name()))?;
    let compiled = &outcome.circuit;

    eprintln!("{} Transpilation complete", style("✓").green().bold());
    eprintln!(
        "  Result: {} ops, depth {}",
        compiled.num_operations(),
        compiled.depth()
    );
    for (logical, physical) in outcome.initial_mapping.pairs() {
        let last = outcome.final_physical(&logical).unwrap_or(&physical);
        eprintln!(
            "  {} {} → {}",
            style(&logical).dim(),
            physical,
            style(last).dim()
        );
    }

    let wire = serialize_circuit(compiled)?;
    let json = wire.to_json()?;

    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write file: {path}"))?;
            eprintln!("  Output: {}", style(path).green());
        }
        None => println!("{json}"),
    }

    Ok(())
}
