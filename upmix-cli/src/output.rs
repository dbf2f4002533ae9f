// upmix-cli/src/output.rs
//
// Terminal rendering of upmix decisions.

use console::style;
use std::path::Path;
use upmix_core::DecisionResult;

/// Prints a section heading.
pub fn print_heading(text: &str) {
    println!("{}", style(text).bold());
}

/// Prints a label/value pair with the label highlighted.
pub fn print_info(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{label}:")).cyan(), value);
}

/// Styles one diagnostic line by its kind.
#[must_use]
pub fn styled_diagnostic(line: &str) -> String {
    if line.starts_with("Will convert") {
        style(line).green().to_string()
    } else if line.starts_with("Skipping") {
        style(line).yellow().to_string()
    } else if line.starts_with("Nothing to convert") || line == "File is not video" {
        style(line).yellow().bold().to_string()
    } else {
        line.to_string()
    }
}

/// Prints the human-readable form of a decision.
pub fn print_decision(source: &str, decision: &DecisionResult) {
    print_heading(&format!("Upmix plan for {source}"));
    for line in &decision.diagnostics {
        println!("  {}", styled_diagnostic(line));
    }
    println!();
    print_info("Container", &decision.container);
    print_info(
        "Process",
        if decision.should_process { "yes" } else { "no" },
    );
    if decision.should_process {
        print_info("Command", &decision.command_fragment);
    }
}

/// Shell-style ffmpeg invocation for a planned upmix.
#[must_use]
pub fn dry_run_invocation(input: &Path, output: &Path, decision: &DecisionResult) -> String {
    format!(
        "ffmpeg -hide_banner -y -i \"{}\" {} \"{}\"",
        input.display(),
        decision.command_fragment,
        output.display()
    )
}
