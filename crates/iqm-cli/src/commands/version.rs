//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - IQM device abstraction and transpiler",
        style("iqm").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  iqm-ir       Circuit model and unitary helpers");
    println!("  iqm-compile  Decomposition, routing and simplification");
    println!("  iqm-device   Device descriptions and transpilation");
    println!("  iqm-cli      Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
