//! session-review locate - Show which local database would be used

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{emit_json, robot_ok};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct LocateArgs {}

#[derive(Debug, Serialize)]
struct LocateReport {
    path: String,
    root: String,
    state_dir: String,
}

pub fn run(ctx: &AppContext, _args: &LocateArgs) -> Result<()> {
    let store = ctx.local_store()?;

    if ctx.is_machine() {
        return emit_json(&robot_ok(LocateReport {
            path: store.path().display().to_string(),
            root: ctx.root().display().to_string(),
            state_dir: ctx.config.store.state_dir.clone(),
        }));
    }

    println!("{}", store.path().display());
    Ok(())
}
