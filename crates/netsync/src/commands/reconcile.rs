//! `netsync reconcile`: converge NetBox with collected facts.

use tracing::{info, warn};

use netsync_core::{DeviceTarget, Discovery, FileFactsProvider, NetboxStore, RunSummary};

use crate::cli::{GlobalOpts, ReconcileArgs};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output::{self, OutcomeRow};

pub async fn handle(
    args: &ReconcileArgs,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let store = NetboxStore::connect(&resolved.netbox)?;
    let facts_dir = args.facts_dir.as_ref().unwrap_or(&resolved.facts_dir);
    let provider = FileFactsProvider::new(facts_dir);

    let mut engine = Discovery::new(&store, &provider, &resolved.engine);
    if let Some(seed) = args.color_seed {
        engine = engine.with_color_seed(seed);
    }

    let targets = select(engine.targets().await?, &args.device)?;
    info!(
        count = targets.len(),
        facts_dir = %provider.dir().display(),
        dry_run = args.dry_run,
        "starting run"
    );

    let summary = if args.dry_run {
        engine.check(&targets).await
    } else {
        engine.run(&targets).await
    };

    report(&summary, global)?;
    finish(&summary)
}

/// Keep only the requested devices, in target order. Names that match
/// no target are an error rather than a silent no-op.
fn select(targets: Vec<DeviceTarget>, wanted: &[String]) -> Result<Vec<DeviceTarget>, CliError> {
    if wanted.is_empty() {
        return Ok(targets);
    }
    if let Some(missing) = wanted
        .iter()
        .find(|w| !targets.iter().any(|t| t.name.eq_ignore_ascii_case(w)))
    {
        return Err(CliError::NotFound {
            resource_type: "switch".into(),
            identifier: missing.clone(),
        });
    }
    Ok(targets
        .into_iter()
        .filter(|t| wanted.iter().any(|w| t.name.eq_ignore_ascii_case(w)))
        .collect())
}

fn report(summary: &RunSummary, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &summary.devices,
        |d| OutcomeRow::new(d, color),
        |d| format!("{}\t{}", d.device, output::status_label(d.status, false)),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn finish(summary: &RunSummary) -> Result<(), CliError> {
    if summary.is_clean() {
        return Ok(());
    }
    warn!(
        failed = summary.failed(),
        succeeded = summary.succeeded(),
        "run finished with failures"
    );
    Err(CliError::PartialRun {
        failed: summary.failed(),
        total: summary.devices.len(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use netsync_core::OsFamily;

    use super::*;

    fn target(name: &str) -> DeviceTarget {
        DeviceTarget {
            name: name.into(),
            host: None,
            os: OsFamily::Ios,
        }
    }

    #[test]
    fn select_keeps_target_order() {
        let picked = select(
            vec![target("SW1"), target("SW2"), target("SW3")],
            &["sw3".into(), "SW1".into()],
        )
        .unwrap();
        let names: Vec<_> = picked.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["SW1", "SW3"]);
    }

    #[test]
    fn select_rejects_unknown_names() {
        let err = select(vec![target("SW1")], &["SW9".into()]).unwrap_err();
        assert!(matches!(err, CliError::NotFound { ref identifier, .. } if identifier == "SW9"));
    }

    #[test]
    fn empty_filter_selects_everything() {
        assert_eq!(select(vec![target("SW1")], &[]).unwrap().len(), 1);
    }
}
