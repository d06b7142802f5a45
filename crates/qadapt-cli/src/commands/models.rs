//! Models command implementation.

use console::style;

use qadapt_solvers::problems::MODELS;

/// Execute the models command.
pub fn execute() {
    println!("{} Built-in models:\n", style("qadapt").cyan().bold());
    for (name, description) in MODELS {
        println!("  {:<14} {}", style(name).bold(), description);
    }
    println!();
    println!("Use with: qadapt run --model <name>");
}
