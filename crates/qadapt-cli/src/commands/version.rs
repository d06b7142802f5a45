//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - adaptive variational eigensolvers",
        style("qadapt").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qadapt-ops      Pauli algebra, fermion mappings, symmetry operators");
    println!("  qadapt-sim      Circuits, statevector and shot backends");
    println!("  qadapt-solvers  ADAPT-VQE, operator pools, optimizers");
    println!("  qadapt-cli      Command-line interface");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
