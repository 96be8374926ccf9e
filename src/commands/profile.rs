//! Profile command handlers.

use std::path::Path;

use anyhow::Context;
use sysrgb::profile;

use super::{print_failures, CommandResult, Session};

/// Save the current colors
pub fn save(session: &Session, path: &Path) -> CommandResult {
    let keyboard = session.open_keyboard()?;
    let snapshot = keyboard.snapshot();
    profile::save(path, &snapshot).with_context(|| format!("saving profile to {}", path.display()))?;
    println!("Saved {} keys to {}", snapshot.len(), path.display());
    Ok(())
}

/// Restore colors from a profile file
pub fn load(session: &Session, path: &Path) -> CommandResult {
    let decoded =
        profile::load(path).with_context(|| format!("loading profile {}", path.display()))?;
    for warning in &decoded.warnings {
        eprintln!("{}: {warning}", path.display());
    }

    let keyboard = session.open_keyboard()?;
    let report = keyboard.apply(&decoded.profile);
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    if !report.failures.is_empty() {
        print_failures(&report.failures);
    }
    println!(
        "Applied {} of {} entries from {}",
        report.applied,
        decoded.profile.len(),
        path.display()
    );
    Ok(())
}
