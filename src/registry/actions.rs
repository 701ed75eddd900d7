use anyhow::{Context, Result};
use log::{debug, info};
use std::process::Command;

/// Runs `program` to completion; success is its exit status.
pub fn run_command(program: &str, args: &[&str]) -> Result<bool> {
    let mut command = Command::new(program);
    command.args(args);

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        command.creation_flags(CREATE_NO_WINDOW);
    }

    let output = command
        .output()
        .with_context(|| format!("failed to execute {program}"))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("{program} exited with {}: {}", output.status, stderr.trim());
    }
    Ok(output.status.success())
}

pub fn flush_dns() -> Result<bool> {
    if cfg!(windows) {
        run_command("ipconfig", &["/flushdns"])
    } else if cfg!(target_os = "macos") {
        run_command("dscacheutil", &["-flushcache"])
    } else {
        run_command("resolvectl", &["flush-caches"])
    }
}

#[cfg(any(
    windows,
    all(
        unix,
        not(target_os = "macos"),
        not(target_os = "ios"),
        not(target_os = "android")
    )
))]
pub fn empty_trash() -> Result<bool> {
    let items = trash::os_limited::list().context("failed to list trash contents")?;
    if items.is_empty() {
        debug!("trash already empty");
        return Ok(true);
    }
    let count = items.len();
    trash::os_limited::purge_all(items).context("failed to purge trash")?;
    info!("purged {count} trash entries");
    Ok(true)
}

#[cfg(target_os = "macos")]
pub fn empty_trash() -> Result<bool> {
    use crate::constants::MACOS_USER_TRASH;
    use log::warn;
    use std::fs;

    let trash_dir = dirs::home_dir()
        .context("home directory not found")?
        .join(MACOS_USER_TRASH);
    if !trash_dir.exists() {
        return Ok(true);
    }

    let mut failed = 0usize;
    let entries = fs::read_dir(&trash_dir)
        .with_context(|| format!("failed to read {}", trash_dir.display()))?;
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        let removed = match entry.file_type() {
            Ok(t) if t.is_dir() => fs::remove_dir_all(&path),
            _ => fs::remove_file(&path),
        };
        if let Err(e) = removed {
            warn!("could not remove {}: {e}", path.display());
            failed += 1;
        }
    }
    Ok(failed == 0)
}

#[cfg(not(any(windows, unix)))]
pub fn empty_trash() -> Result<bool> {
    anyhow::bail!("emptying the trash is not supported on this platform")
}

#[cfg(all(unix, any(target_os = "ios", target_os = "android")))]
pub fn empty_trash() -> Result<bool> {
    anyhow::bail!("emptying the trash is not supported on this platform")
}
