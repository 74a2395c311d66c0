//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - CPU vs GPU state-vector simulation benchmark",
        style("qbench").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qbench-ir           Circuit intermediate representation");
    println!("  qbench-compile      Normalization into the canonical basis");
    println!("  qbench-hal          Backend abstraction");
    println!("  qbench-bench        Circuit generation, sweeps and result recording");
    println!("  qbench-adapter-sim  CPU state-vector simulator");
    println!("  qbench-adapter-gpu  GPU engine adapter");
    println!("  qbench-cli          Command-line interface");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
