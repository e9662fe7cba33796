use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::Context;
use clap::{ArgGroup, Parser};
use prospector::domain::log_entry::{extract_json, scan_log, Category, LogEntry, LogFilter};

/// Filter the service log for errors and results without emails.
#[derive(Parser)]
#[command(name = "log_viewer")]
#[command(group(ArgGroup::new("mode").args(["errors_only", "no_emails_only", "all"])))]
struct Cli {
    /// Log file written by the service, e.g. app.log
    log_file: PathBuf,

    /// Show only errors
    #[arg(long)]
    errors_only: bool,

    /// Show only items without emails
    #[arg(long)]
    no_emails_only: bool,

    /// Show all log entries
    #[arg(long)]
    all: bool,
}

impl Cli {
    fn filter(&self) -> LogFilter {
        LogFilter {
            show_errors: !self.no_emails_only,
            show_no_emails: !self.errors_only,
            show_all: self.all,
        }
    }
}

fn print_entry(category: Category, entry: &LogEntry) {
    match category {
        Category::Error => {
            println!("ERROR [{}] {}", entry.timestamp, entry.message);
            if let Some(json) = extract_json(&entry.message) {
                println!("   JSON data:");
                print_json(&json);
            }
        }
        Category::NoEmails => {
            println!("NO EMAILS [{}]", entry.timestamp);
            println!("   {}", entry.message);
            if let Some(json) = extract_json(&entry.message) {
                println!("   JSON object without emails:");
                print_json(&json);
            }
        }
        Category::Other => {
            println!("{} [{}] {}", entry.level, entry.timestamp, entry.message);
        }
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(pretty) => println!("{}\n", pretty),
        Err(e) => println!("   (could not format JSON: {})\n", e),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file = File::open(&cli.log_file)
        .with_context(|| format!("Log file '{}' not found", cli.log_file.display()))?;

    println!("Analyzing log file: {}", cli.log_file.display());
    println!("{}", "=".repeat(80));

    let summary = scan_log(BufReader::new(file), cli.filter(), print_entry)
        .with_context(|| format!("Failed to read '{}'", cli.log_file.display()))?;

    println!("{}", "=".repeat(80));
    println!("Summary:");
    println!("   Total log lines: {}", summary.total_lines);
    println!("   Errors found: {}", summary.errors);
    println!("   Items without emails: {}", summary.items_without_emails);

    Ok(())
}
