//! Devices command implementation.

use anyhow::Result;
use console::style;

use iqm_device::devices::{self, DEVICE_NAMES};

/// Execute the devices command.
pub fn execute() -> Result<()> {
    println!("{}", style("Static IQM devices:").bold());
    println!();

    for name in DEVICE_NAMES {
        let device = devices::by_name(name)?;
        let metadata = device.metadata();
        let gates: Vec<&str> = metadata
            .gateset()
            .families()
            .into_iter()
            .map(|family| family.name())
            .collect();

        println!(
            "  {} {:<10} {} qubits, {} couplings",
            style("●").green(),
            style(device.name()).cyan().bold(),
            metadata.qubits().len(),
            metadata.connectivity().edges().len()
        );
        println!("      native: {}", style(gates.join(", ")).dim());

        let edges: Vec<String> = metadata
            .connectivity()
            .edges()
            .iter()
            .map(|(a, b)| format!("{a}-{b}"))
            .collect();
        tracing::debug!(device = device.name(), edges = %edges.join(" "), "coupling map");
    }

    println!();
    println!(
        "Other devices can be loaded with {}",
        style("iqm transpile --architecture <file>").yellow()
    );

    Ok(())
}
