//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, instrument};

use crate::domain::LayoutGraph;
use crate::infrastructure::error::RenderError;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write bytes to file, replacing it.
    fn write(&self, path: &Path, content: &[u8]) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// External command runner abstraction.
pub trait CommandRunner: Send + Sync {
    /// Run a command with arguments.
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output>;

    /// Run a command feeding `stdin`, killing it once `timeout` has passed.
    ///
    /// A killed run reports `io::ErrorKind::TimedOut`.
    fn run_with_input(
        &self,
        cmd: &str,
        args: &[&str],
        stdin: &[u8],
        timeout: Duration,
    ) -> io::Result<Output>;
}

/// Graph renderer: turns a layout into encoded image bytes.
pub trait Renderer: Send + Sync {
    fn render(&self, graph: &LayoutGraph) -> Result<Vec<u8>, RenderError>;

    /// Image format produced, e.g. `png`.
    fn format(&self) -> &str;
}

/// Image viewer abstraction.
pub trait ImageViewer: Send + Sync {
    /// Open an image file for viewing.
    fn open(&self, path: &Path) -> io::Result<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
                std::fs::create_dir_all(parent)
            }
            _ => Ok(()),
        }
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(10);

type Reader = JoinHandle<io::Result<Vec<u8>>>;

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Reader> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn join_reader(reader: Option<Reader>) -> io::Result<Vec<u8>> {
    match reader {
        None => Ok(Vec::new()),
        Some(handle) => handle
            .join()
            .map_err(|_| io::Error::other("pipe reader panicked"))?,
    }
}

/// Real command runner implementation.
#[derive(Debug, Default)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output> {
        Command::new(cmd).args(args).output()
    }

    #[instrument(level = "debug", skip(self, stdin))]
    fn run_with_input(
        &self,
        cmd: &str,
        args: &[&str],
        stdin: &[u8],
        timeout: Duration,
    ) -> io::Result<Output> {
        let mut child = Command::new(cmd)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // feed stdin and drain both pipes concurrently so neither side blocks
        let input = stdin.to_vec();
        let writer = child.stdin.take().map(|mut pipe| {
            thread::spawn(move || -> io::Result<()> {
                pipe.write_all(&input)?;
                Ok(())
            })
        });
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let deadline = Instant::now() + timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                debug!("deadline reached, killing {}", cmd);
                let _ = child.kill();
                let _ = child.wait();
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("{cmd} did not finish within {timeout:?}"),
                ));
            }
            thread::sleep(POLL_INTERVAL);
        };

        if let Some(writer) = writer {
            match writer.join() {
                Ok(Err(e)) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e),
                Err(_) => return Err(io::Error::other("stdin writer panicked")),
                _ => {}
            }
        }

        Ok(Output {
            status,
            stdout: join_reader(stdout)?,
            stderr: join_reader(stderr)?,
        })
    }
}

/// Real viewer: the configured command, or the platform's default opener.
pub struct SystemViewer {
    cmd: Arc<dyn CommandRunner>,
    command: Option<String>,
}

impl SystemViewer {
    pub fn new(cmd: Arc<dyn CommandRunner>, command: Option<String>) -> Self {
        Self { cmd, command }
    }

    fn program(&self) -> &str {
        match &self.command {
            Some(command) => command,
            None if cfg!(target_os = "macos") => "open",
            None if cfg!(target_os = "windows") => "explorer",
            None => "xdg-open",
        }
    }
}

impl ImageViewer for SystemViewer {
    fn open(&self, path: &Path) -> io::Result<()> {
        let program = self.program();
        let target = path.to_string_lossy();
        let output = self.cmd.run(program, &[target.as_ref()])?;

        if output.status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "{} exited with status {}: {}",
                program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}
