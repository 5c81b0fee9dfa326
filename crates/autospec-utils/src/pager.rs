use std::env;
use std::io::{self, IsTerminal, Write};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::error::UtilError;
use crate::Result;

/// Overrides `PAGER` for autospec output.
pub const PAGER_ENV: &str = "AUTOSPEC_PAGER";

const DEFAULT_PAGER: &str = "less";

/// Start a pager when stdout is a terminal.
///
/// `AUTOSPEC_PAGER` is consulted first, then `PAGER`, then `less` is used.
/// Returns `None` when output should be written to stdout directly.
pub fn setup_pager() -> Result<Option<PagerGuard>> {
    if !io::stdout().is_terminal() {
        return Ok(None);
    }
    let Some(command) = choose_pager(env::var(PAGER_ENV).ok(), env::var("PAGER").ok()) else {
        return Ok(None);
    };

    let spawn_error = |source: io::Error| UtilError::Subprocess {
        command: command.clone(),
        source,
    };
    let mut child = Command::new("sh")
        .args(["-c", &command])
        .stdin(Stdio::piped())
        .env("LESS", env::var("LESS").unwrap_or_else(|_| "FRX".into()))
        .spawn()
        .map_err(spawn_error)?;
    let stdin = child.stdin.take();

    Ok(Some(PagerGuard {
        command,
        child,
        stdin,
    }))
}

/// `cat` or a blank value turns paging off.
fn choose_pager(own: Option<String>, generic: Option<String>) -> Option<String> {
    let chosen = own.or(generic);
    match chosen.as_deref().map(str::trim) {
        None => Some(DEFAULT_PAGER.to_string()),
        Some("" | "cat") => None,
        Some(cmd) => Some(cmd.to_string()),
    }
}

/// A running pager. Writes go to its stdin.
pub struct PagerGuard {
    command: String,
    child: Child,
    stdin: Option<ChildStdin>,
}

impl PagerGuard {
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Close the pager's input and wait until the user quits it.
    pub fn wait(mut self) -> Result<()> {
        self.stdin = None;
        self.child
            .wait()
            .map(drop)
            .map_err(|source| UtilError::Subprocess {
                command: self.command.clone(),
                source,
            })
    }
}

impl Write for PagerGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.stdin {
            Some(stdin) => stdin.write(buf),
            None => Err(io::ErrorKind::BrokenPipe.into()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdin.as_mut().map_or(Ok(()), Write::flush)
    }
}

impl Drop for PagerGuard {
    fn drop(&mut self) {
        self.stdin = None;
        let _ = self.child.wait();
    }
}
