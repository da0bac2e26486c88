//! Output formatting for `tracegen check` and `tracegen list`.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::check::{CheckResult, Issue};
use crate::registry::ProducerKind;

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report for a check run.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub passed: bool,
    pub files_checked: usize,
    pub records_checked: usize,
    pub issues: Vec<JsonIssue>,
    pub breakdown: Vec<BreakdownEntry>,
}

#[derive(Serialize, Deserialize)]
pub struct JsonIssue {
    pub rule: String,
    pub file: String,
    pub line: usize,
    pub message: String,
}

/// Issue count per rule.
#[derive(Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub rule: String,
    pub issues: usize,
}

/// Build the JSON report structure.
pub fn json_report(path: &str, result: &CheckResult) -> JsonReport {
    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        passed: result.passed(),
        files_checked: result.files,
        records_checked: result.records,
        issues: result.issues.iter().map(issue_to_json).collect(),
        breakdown: breakdown(result)
            .into_iter()
            .map(|(rule, issues)| BreakdownEntry {
                rule: rule.to_string(),
                issues,
            })
            .collect(),
    }
}

/// Write check results in JSON format.
pub fn write_json(path: &str, result: &CheckResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&json_report(path, result))?;
    println!("{}", json);
    Ok(())
}

fn issue_to_json(issue: &Issue) -> JsonIssue {
    JsonIssue {
        rule: issue.rule.as_str().to_string(),
        file: issue.file.clone(),
        line: issue.line,
        message: issue.message.clone(),
    }
}

/// Issues per rule, ordered by rule name.
fn breakdown(result: &CheckResult) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for issue in &result.issues {
        *counts.entry(issue.rule.as_str()).or_insert(0) += 1;
    }
    counts
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write check results in pretty (human-readable) format.
pub fn write_pretty(path: &str, result: &CheckResult) {
    println!();
    print!("  ");
    print!("{}", "tracegen".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Checking: ".dimmed());
    println!("{}", path);
    println!();

    if result.passed() {
        print!("  {}", "✓ PASS".green());
    } else {
        print!("  {}", "✗ FAIL".red());
    }
    println!(
        "  {} records in {} file{}",
        result.records,
        result.files,
        if result.files != 1 { "s" } else { "" }
    );
    println!();

    if !result.issues.is_empty() {
        write_issues(&result.issues);
        println!();

        println!("  {}", "Breakdown:".bold());
        for (rule, count) in breakdown(result) {
            let plural = if count != 1 { "s" } else { "" };
            println!("    {:<20} {:>4} issue{}", rule, count, plural);
        }
        println!();
    }
}

fn write_issues(issues: &[Issue]) {
    println!("  {} ({}):", "Issues".bold(), issues.len());
    println!();

    for issue in issues {
        print!("    {} ", "ERROR".red());
        print!("  {:<20}", issue.rule.as_str().dimmed());
        print!("{}", issue.file.blue());
        print!("{}", format!(":{}", issue.line).dimmed());
        println!();
        println!("            {}", issue.message);
        println!();
    }
}

/// Print the producer catalogue.
pub fn write_producers(kinds: &[ProducerKind], intervals: &[std::time::Duration]) {
    println!("Available producers:");
    println!();
    for (kind, every) in kinds.iter().zip(intervals) {
        println!(
            "  {:<20} {:<10} {}",
            kind.as_str().bold(),
            format!("~{}s", every.as_secs()).dimmed(),
            kind.description()
        );
    }
    println!();
    println!("Usage:");
    println!("  tracegen generate --producer <pattern>");
}
