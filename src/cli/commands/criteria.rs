//! session-review criteria - List detection criteria

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{emit_human, emit_json, robot_ok, HumanLayout};
use crate::error::Result;
use crate::rules::IssueKind;

#[derive(Args, Debug)]
pub struct CriteriaArgs {}

#[derive(Debug, Serialize)]
struct CriterionInfo {
    name: IssueKind,
    summary: &'static str,
}

pub fn run(ctx: &AppContext, _args: &CriteriaArgs) -> Result<()> {
    let criteria: Vec<CriterionInfo> = IssueKind::ALL
        .iter()
        .map(|kind| CriterionInfo {
            name: *kind,
            summary: kind.summary(),
        })
        .collect();

    if ctx.is_machine() {
        return emit_json(&robot_ok(&criteria));
    }

    let mut layout = HumanLayout::new();
    layout.title("Detection criteria");
    for info in &criteria {
        layout.push_line(format!("{:<24} {}", info.name.as_str().cyan(), info.summary));
    }
    layout
        .blank()
        .push_line(format!("Use {} to run a subset.", "--criteria a,b".bold()));
    emit_human(layout);
    Ok(())
}
