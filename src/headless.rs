use crate::executor::CleanupEvent;
use crate::session::Session;
use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::io::{self, Write};

/// Prints every item with its current size, risky ones marked with `!`.
pub fn list(session: &Session) {
    for view in session.list_descriptors() {
        let marker = if view.is_risky() { "!" } else { " " };
        let size = view.size.formatted().unwrap_or_else(|| "-".to_string());
        println!("{marker} {:<32} {size:>10}", view.name);
        if let Some(risk) = &view.risk_message {
            println!("    {risk}");
        }
    }
}

/// Names to clean, in the order given. Repeats run once; unknown names are an error.
fn resolve_names(session: &Session, names: &[String], all: bool) -> Result<Vec<String>> {
    let registry = session.registry();
    if all {
        return Ok(registry.names().map(str::to_string).collect());
    }

    let unknown: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|n| registry.get(n).is_none())
        .collect();
    if !unknown.is_empty() {
        bail!(
            "unknown item(s): {} (run `list` to see available items)",
            unknown.join(", ")
        );
    }

    let mut resolved: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !resolved.contains(name) {
            resolved.push(name.clone());
        }
    }
    Ok(resolved)
}

/// Writes one line per finished item and the summary to `out`, keeping the bar
/// (which draws on stderr) out of the way.
fn report(
    events: impl IntoIterator<Item = CleanupEvent>,
    pb: &ProgressBar,
    out: &mut impl Write,
) -> io::Result<()> {
    for event in events {
        match &event {
            CleanupEvent::Started {
                position, total, ..
            } => pb.set_message(format!("{} ({}/{total})", event.status_text(), position + 1)),
            CleanupEvent::Finished { result, .. } => {
                pb.suspend(|| writeln!(out, "{}", result.status_text()))?;
                pb.inc(1);
            }
            CleanupEvent::Completed(summary) => {
                pb.finish_and_clear();
                writeln!(out, "{}", summary.message())?;
                break;
            }
        }
    }
    out.flush()
}

/// Runs one batch with a progress bar. Returns whether every item succeeded.
pub fn clean(session: &Session, names: &[String], all: bool) -> Result<bool> {
    let names = resolve_names(session, names, all)?;
    let handle = session.run_cleanup(names.clone());

    let pb = ProgressBar::new(names.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    report(handle.events(), &pb, &mut io::stdout().lock())
        .context("failed to write cleanup report")?;

    let summary = handle.wait()?;
    info!(
        "batch finished: {} of {} succeeded",
        summary.succeeded(),
        summary.total
    );
    Ok(summary.failed == 0 && !summary.cancelled)
}
