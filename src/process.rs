//! Running the wrapped build tool
//!
//! stdin of the tool is always the null device. In passthrough mode its
//! stdout and stderr are inherited; in capture mode both are bound to the
//! same pipe, so the buffer holds the bytes in the order the tool wrote them.

use crate::error::{MixpathError, Result};
use std::ffi::OsString;
use std::io;
use std::process::{ExitStatus, Stdio};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// Exit status of the wrapper: 0 on success, 1 for any failure
pub fn exit_code(success: bool) -> i32 {
    if success {
        0
    } else {
        1
    }
}

/// Combined stdout/stderr of a finished tool run
#[derive(Debug)]
pub struct CapturedOutput {
    pub output: Vec<u8>,
    pub status: ExitStatus,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// The tool invocation: program plus forwarded arguments
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: String,
    args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>, args: Vec<OsString>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }

    fn spawn_error(&self, source: io::Error) -> MixpathError {
        MixpathError::Spawn {
            program: self.program.clone(),
            source,
        }
    }

    /// Runs the tool with inherited stdout/stderr and waits for it
    pub async fn passthrough(&self) -> Result<ExitStatus> {
        info!(program = %self.program, args = ?self.args, "Running tool (passthrough)");

        let status = self
            .command()
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| self.spawn_error(e))?;

        debug!(?status, "Tool finished");
        Ok(status)
    }

    /// Runs the tool and captures stdout and stderr into a single buffer.
    ///
    /// Returns only after the output hit EOF and the tool has exited. If
    /// reading fails the tool is killed before the error is returned.
    pub async fn capture_combined(&self) -> Result<CapturedOutput> {
        info!(program = %self.program, args = ?self.args, "Running tool (capture)");

        let (mut child, read) = self.spawn_and_read().await?;
        let captured = settle(&mut child, read).await?;
        debug!(
            status = ?captured.status,
            bytes = captured.output.len(),
            "Tool finished"
        );

        Ok(captured)
    }

    #[cfg(unix)]
    async fn spawn_and_read(&self) -> Result<(Child, io::Result<Vec<u8>>)> {
        let (reader, writer) = shared_pipe()?;

        let mut command = self.command();
        command.stdout(writer.try_clone()?).stderr(writer);
        let spawned = command.spawn();
        // The command owns the parent's write ends; EOF needs them closed.
        drop(command);
        let child = spawned.map_err(|e| self.spawn_error(e))?;

        let mut output = Vec::new();
        let read = tokio::fs::File::from_std(reader)
            .read_to_end(&mut output)
            .await
            .map(|_| output);

        Ok((child, read))
    }

    /// Without a shared descriptor the two streams are drained as data
    /// arrives, so their relative order is only approximate.
    #[cfg(not(unix))]
    async fn spawn_and_read(&self) -> Result<(Child, io::Result<Vec<u8>>)> {
        const READ_CHUNK: usize = 8 * 1024;

        let mut child = self
            .command()
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let (mut stdout, mut stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(stdout), Some(stderr)) => (stdout, stderr),
            _ => {
                let missing =
                    io::Error::new(io::ErrorKind::Other, "tool output was not captured");
                return Ok((child, Err(missing)));
            }
        };

        let read = async {
            let mut output = Vec::new();
            let mut out_chunk = vec![0u8; READ_CHUNK];
            let mut err_chunk = vec![0u8; READ_CHUNK];
            let mut out_open = true;
            let mut err_open = true;

            while out_open || err_open {
                tokio::select! {
                    read = stdout.read(&mut out_chunk), if out_open => {
                        match read? {
                            0 => out_open = false,
                            n => output.extend_from_slice(&out_chunk[..n]),
                        }
                    }
                    read = stderr.read(&mut err_chunk), if err_open => {
                        match read? {
                            0 => err_open = false,
                            n => output.extend_from_slice(&err_chunk[..n]),
                        }
                    }
                }
            }
            Ok::<_, io::Error>(output)
        }
        .await;

        Ok((child, read))
    }
}

/// One pipe whose write end becomes both stdout and stderr of the tool.
///
/// Both ends are close-on-exec; the child only gets the write end through
/// its redirected standard streams.
#[cfg(unix)]
fn shared_pipe() -> io::Result<(std::fs::File, std::os::fd::OwnedFd)> {
    #[cfg(any(target_os = "linux", target_os = "android"))]
    let (reader, writer) = {
        use nix::fcntl::OFlag;
        nix::unistd::pipe2(OFlag::O_CLOEXEC).map_err(io::Error::from)?
    };

    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    let (reader, writer) = {
        use nix::fcntl::{fcntl, FcntlArg, FdFlag};
        let (reader, writer) = nix::unistd::pipe().map_err(io::Error::from)?;
        for fd in [&reader, &writer] {
            fcntl(fd, FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC)).map_err(io::Error::from)?;
        }
        (reader, writer)
    };

    Ok((std::fs::File::from(reader), writer))
}

/// Waits for the tool after a successful read, or kills it after a failed one
async fn settle(child: &mut Child, read: io::Result<Vec<u8>>) -> Result<CapturedOutput> {
    match read {
        Ok(output) => {
            let status = child.wait().await?;
            Ok(CapturedOutput { output, status })
        }
        Err(err) => {
            warn!(error = %err, "Reading tool output failed, killing tool");
            if let Err(kill_err) = child.kill().await {
                debug!(error = %kill_err, "Tool was already gone");
            }
            Err(err.into())
        }
    }
}
