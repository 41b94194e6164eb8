//! session-review flag - Run detection rules and queue findings

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{emit_human, emit_json, robot_ok, robot_partial, HumanLayout};
use crate::error::Result;
use crate::queue::FlagOutcome;
use crate::runner::{parse_criteria, ReviewRunner, RunSummary};

#[derive(Args, Debug)]
pub struct FlagArgs {
    /// Comma-separated criteria to check, or "all"
    #[arg(long, short, default_value = "all")]
    pub criteria: String,

    /// Show what would be flagged without writing to the review queue
    #[arg(long, short)]
    pub dry_run: bool,

    /// Use the remote database instead of the local Miniflare store
    #[arg(long, short)]
    pub remote: bool,
}

pub fn run(ctx: &AppContext, args: &FlagArgs) -> Result<()> {
    let criteria = parse_criteria(&args.criteria);
    let store = ctx.open_store(args.remote)?;

    let summary = ReviewRunner::new(store.as_ref())
        .with_preview(args.dry_run)
        .run(&criteria)?;

    if ctx.is_machine() {
        let failed = summary.failed();
        let warnings = summary
            .skipped
            .iter()
            .map(|name| format!("unknown criterion skipped: {name}"))
            .collect();
        if failed > 0 {
            let completed = summary.total_flagged;
            return emit_json(&robot_partial(&summary, completed, failed).with_warnings(warnings));
        }
        return emit_json(&robot_ok(&summary).with_warnings(warnings));
    }

    emit_human(render_human(&summary, &store.describe(), &criteria, ctx.verbosity > 0));
    Ok(())
}

fn render_human(summary: &RunSummary, target: &str, criteria: &[String], verbose: bool) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout.title("Session Review");
    if summary.preview {
        layout.push_line("DRY RUN MODE - No changes will be made".yellow().bold().to_string());
    }
    layout
        .kv("Store", target)
        .kv("Checks", &criteria.join(", "))
        .blank();

    for name in &summary.skipped {
        layout.push_line(format!(
            "{} unknown criterion '{}', skipped",
            "!".yellow(),
            name
        ));
    }

    for criterion in &summary.by_criteria {
        let marker = if criterion.flagged == criterion.entries.len() {
            "✓".green()
        } else {
            "✗".red()
        };
        layout.push_line(format!(
            "{marker} {}: found {} sessions, flagged {}",
            criterion.criterion.to_string().bold(),
            criterion.found,
            criterion.flagged
        ));

        for entry in &criterion.entries {
            match &entry.outcome {
                FlagOutcome::Failed(err) => {
                    layout.push_line(format!(
                        "    {} {}: {}",
                        "error".red(),
                        entry.session_id,
                        err
                    ));
                }
                FlagOutcome::Previewed => {
                    layout.push_line(format!(
                        "    [DRY RUN] would flag {}: {}",
                        entry.session_id,
                        entry.description.dimmed()
                    ));
                }
                FlagOutcome::AlreadyFlagged if verbose => {
                    layout.push_line(format!("    {} already queued", entry.session_id.dimmed()));
                }
                FlagOutcome::Inserted if verbose => {
                    layout.push_line(format!("    {} {}", entry.session_id, entry.description.dimmed()));
                }
                _ => {}
            }
        }
    }

    layout.blank().section("Summary");
    layout.kv("Total sessions flagged", &summary.total_flagged.to_string());
    for criterion in &summary.by_criteria {
        layout.kv(
            &format!("  {}", criterion.criterion),
            &format!("{}/{} flagged", criterion.flagged, criterion.found),
        );
    }
    if summary.preview {
        layout
            .blank()
            .push_line("Dry run complete. Run without --dry-run to apply changes.");
    }
    layout
}
