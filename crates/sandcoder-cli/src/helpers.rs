//! Shared CLI helpers - usage text, response printing, verbose summaries.

use colored::Colorize;

use sandcoder_core::types::UsageInfo;

/// Usage text printed when no prompt is given.
pub fn usage_text() -> String {
    [
        "Sandcoder - AI coding agent confined to a working directory".to_string(),
        String::new(),
        format!("Usage: sandcoder {} [--verbose] [--workspace DIR] [--config FILE]", "\"your prompt here\""),
        "Example: sandcoder \"How do I fix the calculator?\"".to_string(),
    ]
    .join("\n")
}

pub fn print_usage() {
    eprintln!("{}", usage_text());
}

/// Echo the user's request (verbose mode).
pub fn print_prompt(prompt: &str) {
    println!("{} {prompt}", "User prompt:".dimmed());
}

/// One line per counter, as shown in verbose mode.
pub fn usage_summary(usage: &UsageInfo, iterations: u32) -> String {
    format!(
        "Prompt tokens: {}\nResponse tokens: {}\nModel calls: {iterations}",
        usage.prompt_tokens, usage.completion_tokens
    )
}

pub fn print_usage_summary(usage: &UsageInfo, iterations: u32) {
    println!("{}", usage_summary(usage, iterations).dimmed());
}

/// Print the agent's final answer to stdout.
pub fn print_response(response: &str) {
    println!();
    println!("{}", "Final response:".cyan().bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
}

/// Report that the request ran out of passes.
pub fn print_iteration_cap(max_iterations: u32) {
    eprintln!("{}", format!("Maximum iterations ({max_iterations}) reached.").red().bold());
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
