//! External tool invocation
//!
//! Everything `hudctl` knows about a device comes from scraping the text
//! output of `xcrun devicectl` (plus `xcode-select` and `sw_vers` for
//! environment checks). This module owns the subprocess plumbing: one-shot
//! invocations with merged stdout/stderr, and streaming children whose
//! output is bridged line-by-line over an mpsc channel from reader threads.
//!
//! The [`ToolRunner`] trait is the seam that lets parsers and the launch
//! orchestration be tested against scripted output instead of real devices.

use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{HudctlError, Result};

/// Captured output of a completed tool invocation.
///
/// `devicectl` writes diagnostics to stderr and tables to stdout; callers
/// get both merged, because the original tool surfaces everything it
/// captured regardless of exit status.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Whether the process exited successfully
    pub success: bool,
    /// Merged stdout and stderr, lossily decoded
    pub text: String,
}

/// Abstraction over external tool execution.
pub trait ToolRunner: Send + Sync {
    /// Run a program to completion and capture its merged output.
    ///
    /// A nonzero exit status is not an error: the captured text is still
    /// returned (with `success: false`) so parse-and-display flows can show
    /// whatever the tool printed. Only a failure to start the program errors.
    fn run(&self, program: &str, args: &[&str]) -> Result<ToolOutput>;

    /// Spawn a program and return a handle streaming its output lines.
    fn spawn(&self, program: &str, args: &[&str]) -> Result<Box<dyn ChildHandle>>;
}

/// Handle to a spawned child whose output is consumed line-by-line.
pub trait ChildHandle: Send {
    /// Blocking read of the next output line. `None` once the child has
    /// closed both stdout and stderr.
    fn next_line(&mut self) -> Option<String>;

    /// Ask the child to terminate, escalating to SIGKILL after `grace`.
    fn terminate(&mut self, grace: Duration);

    /// Wait for the child to exit; returns whether it exited successfully.
    fn wait(&mut self) -> Result<bool>;
}

/// [`ToolRunner`] backed by real subprocesses.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a runner that invokes real system tools.
    pub fn new() -> Self {
        Self
    }
}

impl ToolRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<ToolOutput> {
        debug!("Running {} {}", program, args.join(" "));
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| HudctlError::ToolSpawn {
                tool: program.to_string(),
                source: e,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.stderr.is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&String::from_utf8_lossy(&output.stderr));
        }

        Ok(ToolOutput {
            success: output.status.success(),
            text,
        })
    }

    fn spawn(&self, program: &str, args: &[&str]) -> Result<Box<dyn ChildHandle>> {
        debug!("Spawning {} {}", program, args.join(" "));
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| HudctlError::ToolSpawn {
                tool: program.to_string(),
                source: e,
            })?;

        let (tx, rx) = mpsc::channel();
        let mut readers = Vec::with_capacity(2);

        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_line_reader(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_line_reader(stderr, tx));
        }

        Ok(Box::new(SystemChild {
            child,
            lines: rx,
            _readers: readers,
        }))
    }
}

/// Bridge one output pipe onto the shared line channel.
///
/// The channel closes once every reader thread has dropped its sender, which
/// is how `next_line` observes EOF.
fn spawn_line_reader(
    pipe: impl std::io::Read + Send + 'static,
    tx: mpsc::Sender<String>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let reader = BufReader::new(pipe);
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    debug!("Output pipe closed: {}", e);
                    break;
                }
            }
        }
    })
}

/// A real child process with reader threads feeding the line channel.
struct SystemChild {
    child: Child,
    lines: mpsc::Receiver<String>,
    _readers: Vec<JoinHandle<()>>,
}

impl ChildHandle for SystemChild {
    fn next_line(&mut self) -> Option<String> {
        self.lines.recv().ok()
    }

    fn terminate(&mut self, grace: Duration) {
        #[cfg(unix)]
        {
            send_sigterm(self.child.id());

            // Give the child the grace period to exit cleanly
            let deadline = Instant::now() + grace;
            loop {
                match self.child.try_wait() {
                    Ok(Some(_)) => return,
                    Ok(None) => {
                        if Instant::now() >= deadline {
                            break;
                        }
                        std::thread::sleep(Duration::from_millis(50));
                    }
                    Err(e) => {
                        warn!("try_wait failed while terminating: {}", e);
                        break;
                    }
                }
            }
        }

        if let Err(e) = self.child.kill() {
            // Already exited is fine
            debug!("kill: {}", e);
        }
        let _ = self.child.wait();
    }

    fn wait(&mut self) -> Result<bool> {
        let status = self.child.wait()?;
        Ok(status.success())
    }
}

/// Ask a child to exit with SIGTERM (SIGKILL comes later if it ignores us).
#[cfg(unix)]
#[expect(
    unsafe_code,
    reason = "libc::kill is the only way to send SIGTERM to a std child"
)]
#[expect(
    clippy::cast_possible_wrap,
    reason = "pids fit in pid_t on every supported platform"
)]
fn send_sigterm(pid: u32) {
    // SAFETY: the pid comes from a live Child the caller owns, so it cannot
    // have been recycled yet
    let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
    if rc != 0 {
        warn!("SIGTERM to pid {} failed", pid);
    }
}
