//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use artsel_core::{Artwork, BulkOutcome, StopReason};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// One row of a page listing
pub struct PageRow<'a> {
    pub record: &'a Artwork,
    pub selected: bool,
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print one page of records with selection marks
    pub fn print_page(&self, page: usize, total_pages: usize, rows: &[PageRow], total_selected: usize) {
        match self.format {
            OutputFormat::Human => {
                if rows.is_empty() {
                    println!("No records on page {}.", page);
                    return;
                }
                for row in rows {
                    let mark = if row.selected { "[x]" } else { "[ ]" };
                    println!(
                        "{} {:>7} | {} | {} | {}",
                        mark,
                        row.record.id,
                        truncate(row.record.display_title(), 40),
                        truncate(row.record.place_of_origin.as_deref().unwrap_or("-"), 16),
                        row.record.date_range().unwrap_or_else(|| "-".to_string())
                    );
                }
                println!(
                    "\nPage {} of {} · {} selected",
                    page, total_pages, total_selected
                );
            }
            OutputFormat::Json => {
                let records: Vec<_> = rows
                    .iter()
                    .map(|row| serde_json::json!({"selected": row.selected, "record": row.record}))
                    .collect();
                println!(
                    "{}",
                    serde_json::json!({
                        "page": page,
                        "total_pages": total_pages,
                        "total_selected": total_selected,
                        "records": records
                    })
                );
            }
            OutputFormat::Quiet => {
                for row in rows.iter().filter(|row| row.selected) {
                    println!("{}", row.record.id);
                }
            }
        }
    }

    /// Print the full selection
    pub fn print_selection(&self, records: &[Artwork]) {
        match self.format {
            OutputFormat::Human => {
                if records.is_empty() {
                    println!("Nothing selected.");
                    return;
                }
                for record in records {
                    println!(
                        "{:>7} | {} | {}",
                        record.id,
                        truncate(record.display_title(), 45),
                        truncate_line(record.artist_display.as_deref().unwrap_or("-"), 30)
                    );
                }
                println!("\n{} selected", records.len());
            }
            OutputFormat::Json => match serde_json::to_string_pretty(records) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Failed to encode selection: {}", e),
            },
            OutputFormat::Quiet => {
                for record in records {
                    println!("{}", record.id);
                }
            }
        }
    }

    /// Print the result of a bulk selection
    pub fn print_bulk_outcome(&self, outcome: &BulkOutcome, total_selected: usize) {
        match self.format {
            OutputFormat::Human => println!("{}", describe_outcome(outcome, total_selected)),
            OutputFormat::Json => {
                let (stop, error) = match &outcome.stop {
                    StopReason::NothingToDo => ("nothing_to_do", None),
                    StopReason::TargetReached => ("target_reached", None),
                    StopReason::Exhausted => ("exhausted", None),
                    StopReason::FetchFailed(e) => ("fetch_failed", Some(e.to_string())),
                };
                println!(
                    "{}",
                    serde_json::json!({
                        "target": outcome.target,
                        "added": outcome.added,
                        "pages_fetched": outcome.pages_fetched,
                        "stop": stop,
                        "error": error,
                        "total_selected": total_selected
                    })
                );
            }
            OutputFormat::Quiet => println!("{}", total_selected),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning to stderr (suppressed in quiet mode)
    pub fn warn(&self, message: &str) {
        if !self.is_quiet() {
            eprintln!("⚠ {}", message);
        }
    }
}

/// One-line summary of a bulk selection
pub fn describe_outcome(outcome: &BulkOutcome, total_selected: usize) -> String {
    match &outcome.stop {
        StopReason::NothingToDo => {
            format!("Nothing to select ({} already selected)", total_selected)
        }
        StopReason::TargetReached => format!(
            "Selected {} more ({} total)",
            outcome.added, total_selected
        ),
        StopReason::Exhausted => format!(
            "Selected {} more ({} total); no more records",
            outcome.added, total_selected
        ),
        StopReason::FetchFailed(e) => format!(
            "Selected {} more ({} total); stopped: {}",
            outcome.added, total_selected, e
        ),
    }
}

/// Truncate a string to max characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
pub fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}
