//! Interactive toolchain session
//!
//! One persistent shell process receives every staged command on stdin.
//! Nothing is read back until `drain`: commands are fire-and-forget, and
//! the single synchronization point is the final read-to-EOF once stdin
//! is closed. Errors in individual commands surface later, when the
//! drained output is parsed.

use std::io::{Read, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{BuildError, BuildResult};

/// Handle to the shell process driving the native toolchain
pub struct ToolchainSession {
    child: Child,
    stdin: Option<ChildStdin>,
    shell: String,
}

impl ToolchainSession {
    /// Launch the shell with piped stdin/stdout.
    ///
    /// stderr is passed through to the caller's terminal so toolchain
    /// diagnostics stay visible without polluting the captured dump.
    pub fn spawn(shell: &str) -> BuildResult<Self> {
        let mut child = Command::new(shell)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| BuildError::ToolchainUnavailable {
                shell: shell.to_string(),
                source: e,
            })?;

        let stdin = child.stdin.take();
        debug!(target: "jmlbuild::session", "spawned shell '{}'", shell);

        Ok(Self {
            child,
            stdin,
            shell: shell.to_string(),
        })
    }

    /// Queue one command, CRLF-terminated, without reading a response.
    pub fn send(&mut self, cmd: &str) -> BuildResult<()> {
        debug!(target: "jmlbuild::session", "> {}", cmd);
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| BuildError::Config("session input already closed".to_string()))?;
        stdin.write_all(cmd.as_bytes())?;
        stdin.write_all(b"\r\n")?;
        Ok(())
    }

    /// Close stdin and read all output until the shell exits.
    ///
    /// This blocks until every queued command has run. With a timeout,
    /// the read happens on a helper thread; if it does not finish in
    /// time the shell is killed and `ToolchainTimeout` is reported.
    pub fn drain(mut self, timeout: Option<Duration>) -> BuildResult<String> {
        // Dropping stdin signals end of commands to the shell
        drop(self.stdin.take());

        let mut stdout = self
            .child
            .stdout
            .take()
            .ok_or_else(|| BuildError::Config("session output already taken".to_string()))?;

        let output = match timeout {
            None => {
                let mut buf = Vec::new();
                stdout.read_to_end(&mut buf)?;
                buf
            }
            Some(limit) => {
                let (tx, rx) = mpsc::channel();
                thread::spawn(move || {
                    let mut buf = Vec::new();
                    let result = stdout.read_to_end(&mut buf).map(|_| buf);
                    let _ = tx.send(result);
                });

                match rx.recv_timeout(limit) {
                    Ok(read) => read?,
                    Err(_) => {
                        warn!(
                            target: "jmlbuild::session",
                            "shell '{}' still running after {}s, killing it",
                            self.shell,
                            limit.as_secs()
                        );
                        let _ = self.child.kill();
                        let _ = self.child.wait();
                        return Err(BuildError::ToolchainTimeout {
                            secs: limit.as_secs(),
                        });
                    }
                }
            }
        };

        self.child.wait()?;
        debug!(
            target: "jmlbuild::session",
            "drained {} bytes from shell '{}'",
            output.len(),
            self.shell
        );
        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}
