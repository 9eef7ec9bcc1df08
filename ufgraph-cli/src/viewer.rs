use std::{path::Path, process::Command};

use anyhow::Context;
use log::debug;

/// Opens `path` with the desktop's default application. Does not wait for the
/// viewer to exit.
pub fn open(path: &Path) -> anyhow::Result<()> {
    let mut command = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };
    command.arg(path);

    debug!("opening {} with {:?}", path.display(), command.get_program());
    command
        .spawn()
        .with_context(|| format!("failed to open {}", path.display()))?;
    Ok(())
}
