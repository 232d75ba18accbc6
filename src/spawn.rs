//! Detached execution of configured commands.

use crate::traits::Spawner;
use log::info;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};

/// Runs commands through `sh -c` in their own process group and forgets
/// about them.  Exit status and output are never collected.
#[derive(Debug, Clone)]
pub struct ShellSpawner {
    shell: String,
}

impl Default for ShellSpawner {
    fn default() -> Self {
        Self {
            shell: "/bin/sh".into(),
        }
    }
}

impl ShellSpawner {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Spawner for ShellSpawner {
    fn spawn(&self, command: &str) -> std::io::Result<()> {
        let child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .process_group(0)
            .spawn()?;
        info!("spawned {:?} (pid {})", command, child.id());
        // Not reaped: the child stays a zombie until the manager exits.
        drop(child);
        Ok(())
    }
}
