//! `netsync targets`: the devices a run would visit.

use netsync_core::{Discovery, FileFactsProvider, NetboxStore};

use crate::cli::GlobalOpts;
use crate::config::Resolved;
use crate::error::CliError;
use crate::output::{self, TargetRow};

pub async fn handle(resolved: &Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    let store = NetboxStore::connect(&resolved.netbox)?;
    let provider = FileFactsProvider::new(&resolved.facts_dir);
    let targets = Discovery::new(&store, &provider, &resolved.engine)
        .targets()
        .await?;

    let out = output::render_list(&global.output, &targets, TargetRow::new, |t| {
        t.name.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
