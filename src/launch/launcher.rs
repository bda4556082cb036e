//! Launch orchestration
//!
//! The HUD environment only reliably takes effect when the app is started
//! cold by `devicectl`, so a launch is really two: a warm-up launch that is
//! terminated after about a second (tearing down any already-running copy
//! of the app), then the real launch whose console output is streamed back
//! line-by-line.
//!
//! All of it happens on a worker thread; progress and output arrive over an
//! mpsc channel so the caller's loop never blocks on the child.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{error, info};

use crate::devicectl::runner::ToolRunner;
use crate::launch::command::LaunchCommand;

/// Warm-up duration before the first launch is torn down.
const WARMUP: Duration = Duration::from_secs(1);

/// Grace period for the warm-up child to exit before it is killed.
const TERMINATE_GRACE: Duration = Duration::from_secs(5);

/// Pause between tearing down the warm-up launch and relaunching.
const RELAUNCH_DELAY: Duration = Duration::from_millis(200);

/// Progress and output events from a launch in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchEvent {
    /// Human-readable progress message
    Status(String),
    /// One line of console output from the launched app
    Line(String),
    /// The launch invocation finished
    Exited {
        /// Whether `devicectl` exited successfully
        success: bool,
    },
    /// The launch could not be carried out
    Failed(String),
}

/// Runs launch commands on a worker thread.
pub struct Launcher {
    runner: Arc<dyn ToolRunner>,
}

impl Launcher {
    /// Create a launcher backed by the given runner.
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        Self { runner }
    }

    /// Launch, tear down after the warm-up, relaunch, and stream output.
    ///
    /// Returns the event receiver and the worker handle. The receiver
    /// yields [`LaunchEvent::Line`] for each console line of the second
    /// launch and closes after [`LaunchEvent::Exited`] or
    /// [`LaunchEvent::Failed`].
    pub fn launch_with_restart(
        &self,
        command: LaunchCommand,
    ) -> (mpsc::Receiver<LaunchEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel();
        let runner = Arc::clone(&self.runner);

        info!("Launching: {}", command.shell_string());

        let handle = std::thread::spawn(move || {
            run_launch(runner.as_ref(), &command, &tx);
        });

        (rx, handle)
    }
}

fn run_launch(runner: &dyn ToolRunner, command: &LaunchCommand, tx: &mpsc::Sender<LaunchEvent>) {
    let send = |event: LaunchEvent| {
        // Receiver may have been dropped by an impatient caller
        let _ = tx.send(event);
    };

    send(LaunchEvent::Status(
        "Launching app with Metal HUD...".to_string(),
    ));

    let mut warmup = match runner.spawn(command.program(), &command.args()) {
        Ok(child) => child,
        Err(e) => {
            error!("Warm-up launch failed: {}", e);
            send(LaunchEvent::Failed(e.to_string()));
            return;
        }
    };

    std::thread::sleep(WARMUP);

    send(LaunchEvent::Status(
        "Restarting app with Metal HUD...".to_string(),
    ));
    warmup.terminate(TERMINATE_GRACE);

    std::thread::sleep(RELAUNCH_DELAY);
    send(LaunchEvent::Status(
        "If the Metal HUD doesn't appear, please close and reopen the app on your device."
            .to_string(),
    ));

    let mut relaunch = match runner.spawn(command.program(), &command.args()) {
        Ok(child) => child,
        Err(e) => {
            error!("Relaunch failed: {}", e);
            send(LaunchEvent::Failed(e.to_string()));
            return;
        }
    };

    while let Some(line) = relaunch.next_line() {
        send(LaunchEvent::Line(line));
    }

    match relaunch.wait() {
        Ok(success) => {
            info!("Launch process exited (success: {})", success);
            send(LaunchEvent::Exited { success });
        }
        Err(e) => {
            error!("Failed waiting for launch process: {}", e);
            send(LaunchEvent::Failed(e.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devicectl::runner::{ChildHandle, ToolOutput};
    use crate::error::Result;
    use crate::hud::HudConfig;
    use crate::launch::command::LaunchRequest;
    use parking_lot::Mutex;

    /// Scripted runner: every spawn yields the next canned child.
    struct ScriptedRunner {
        children: Mutex<Vec<ScriptedChild>>,
        spawn_count: Mutex<usize>,
    }

    struct ScriptedChild {
        lines: Vec<String>,
        success: bool,
        terminated: Arc<Mutex<bool>>,
    }

    struct ScriptedHandle {
        lines: std::vec::IntoIter<String>,
        success: bool,
        terminated: Arc<Mutex<bool>>,
    }

    impl ToolRunner for ScriptedRunner {
        fn run(&self, _program: &str, _args: &[&str]) -> Result<ToolOutput> {
            Ok(ToolOutput {
                success: true,
                text: String::new(),
            })
        }

        fn spawn(&self, _program: &str, _args: &[&str]) -> Result<Box<dyn ChildHandle>> {
            *self.spawn_count.lock() += 1;
            let child = self.children.lock().remove(0);
            Ok(Box::new(ScriptedHandle {
                lines: child.lines.into_iter(),
                success: child.success,
                terminated: child.terminated,
            }))
        }
    }

    impl ChildHandle for ScriptedHandle {
        fn next_line(&mut self) -> Option<String> {
            self.lines.next()
        }

        fn terminate(&mut self, _grace: Duration) {
            *self.terminated.lock() = true;
        }

        fn wait(&mut self) -> Result<bool> {
            Ok(self.success)
        }
    }

    fn command() -> LaunchCommand {
        LaunchCommand::build(&LaunchRequest {
            udid: "UDID".to_string(),
            bundle_path: "/private/var/containers/Bundle/Application/AAAA1111-0000-1111-2222-333344445555/Game.app".to_string(),
            hud: HudConfig::default(),
        })
        .unwrap()
    }

    #[test]
    fn test_launch_with_restart_streams_second_child() {
        let warmup_terminated = Arc::new(Mutex::new(false));
        let runner = Arc::new(ScriptedRunner {
            children: Mutex::new(vec![
                ScriptedChild {
                    lines: vec!["warm-up noise".to_string()],
                    success: true,
                    terminated: Arc::clone(&warmup_terminated),
                },
                ScriptedChild {
                    lines: vec!["hud line 1".to_string(), "hud line 2".to_string()],
                    success: true,
                    terminated: Arc::new(Mutex::new(false)),
                },
            ]),
            spawn_count: Mutex::new(0),
        });

        let launcher = Launcher::new(Arc::clone(&runner) as Arc<dyn ToolRunner>);
        let (rx, handle) = launcher.launch_with_restart(command());
        let events: Vec<LaunchEvent> = rx.iter().collect();
        handle.join().unwrap();

        assert_eq!(*runner.spawn_count.lock(), 2);
        assert!(*warmup_terminated.lock(), "warm-up child must be terminated");

        let lines: Vec<&LaunchEvent> = events
            .iter()
            .filter(|e| matches!(e, LaunchEvent::Line(_)))
            .collect();
        assert_eq!(
            lines,
            vec![
                &LaunchEvent::Line("hud line 1".to_string()),
                &LaunchEvent::Line("hud line 2".to_string()),
            ],
            "only the relaunch output is streamed"
        );
        assert!(matches!(
            events.last(),
            Some(LaunchEvent::Exited { success: true })
        ));
    }

    #[test]
    fn test_launch_failure_surfaces_as_event() {
        struct FailingRunner;
        impl ToolRunner for FailingRunner {
            fn run(&self, _program: &str, _args: &[&str]) -> Result<ToolOutput> {
                Ok(ToolOutput {
                    success: true,
                    text: String::new(),
                })
            }
            fn spawn(&self, program: &str, _args: &[&str]) -> Result<Box<dyn ChildHandle>> {
                Err(crate::error::HudctlError::ToolSpawn {
                    tool: program.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
                })
            }
        }

        let launcher = Launcher::new(Arc::new(FailingRunner));
        let (rx, handle) = launcher.launch_with_restart(command());
        let events: Vec<LaunchEvent> = rx.iter().collect();
        handle.join().unwrap();

        assert!(matches!(events.last(), Some(LaunchEvent::Failed(_))));
    }
}
