//! Human-readable run output.
//!
//! Entries with nothing to report print nothing; everything else gets a
//! separator and a `Space <name> url: <url>` line.

use spaceaudit_common::{EntryReport, EntryStatus, Outcome, RunReport};
use std::io::{self, Write};

const ENTRY_SEPARATOR: &str = "-------------------------";
const DIGEST_HEADER: &str = "****************";

/// Write the block for one audited entry.
pub fn render_entry(out: &mut impl Write, report: &EntryReport) -> io::Result<()> {
    let entry = &report.entry;
    match report.status {
        EntryStatus::Ok => Ok(()),
        EntryStatus::FetchFailed => {
            let reason = report.fetch_code.describe().unwrap_or_default();
            writeln!(out, "{ENTRY_SEPARATOR}")?;
            writeln!(
                out,
                "Space {} url: {} fetch failed: {} (code {})",
                entry.name, entry.url, reason, report.fetch_code
            )
        }
        EntryStatus::Sent | EntryStatus::Failed => {
            writeln!(out, "{ENTRY_SEPARATOR}")?;
            writeln!(out, "Space {} url: {}", entry.name, entry.url)?;
            match report.outcome {
                Outcome::Sent => writeln!(out, "Mail sent to {}", report.contact),
                Outcome::Failed => {
                    writeln!(out, "Sending mail to {} failed!", entry.name)?;
                    render_issues(out, &report.issues)
                }
                Outcome::AdminFlagged => {
                    writeln!(
                        out,
                        "ERROR Sendmail : Email {} not valid for {}",
                        report.contact, entry.name
                    )?;
                    render_issues(out, &report.issues)
                }
                Outcome::Compliant => Ok(()),
            }
        }
    }
}

fn render_issues(out: &mut impl Write, issues: &[String]) -> io::Result<()> {
    writeln!(out, "Found errors :")?;
    for issue in issues {
        writeln!(out, "- {issue}")?;
    }
    Ok(())
}

/// Admin digest (if any) followed by the summary line.
pub fn render_summary(out: &mut impl Write, report: &RunReport) -> io::Result<()> {
    if !report.digest.is_empty() {
        writeln!(out, "{DIGEST_HEADER}")?;
        for entry in &report.digest {
            write!(out, "{entry}")?;
        }
    }
    writeln!(out, "{}", report.tally.summary_line())
}
