//! Child-process plumbing shared by builds and case runs.

use std::io::{self, Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(5);
/// How long the output pipes may stay open once the child has exited, for
/// example when it left a background process holding them.
const DRAIN_GRACE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when killed by a signal or by the timeout.
    pub status: Option<i32>,
    pub success: bool,
    pub timed_out: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// Standard output followed by standard error.
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Runs `command` with `input` on stdin and captures both output streams.
///
/// Stdin is fed and the output pipes are drained on helper threads so a
/// chatty child cannot fill a pipe and stall. With a `timeout`, the child is
/// polled and killed once the limit passes; its partial output is discarded.
/// After the child exits, its pipes are read until they close or until the
/// later of the remaining limit and [`DRAIN_GRACE`]; whatever arrived by
/// then is the captured output.
pub fn run_command(
    command: &[String],
    input: &str,
    timeout: Option<Duration>,
) -> io::Result<ProcessOutput> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdin = child.stdin.take();
    let input = input.as_bytes().to_vec();
    thread::spawn(move || {
        if let Some(mut stdin) = stdin {
            // The child may exit without reading; a broken pipe is fine.
            let _ = stdin.write_all(&input);
        }
    });
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let started = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break Some(status);
        }
        if let Some(limit) = timeout {
            if started.elapsed() >= limit {
                let _ = child.kill();
                let _ = child.wait();
                break None;
            }
        }
        thread::sleep(POLL_INTERVAL);
    };

    let Some(status) = status else {
        return Ok(ProcessOutput {
            timed_out: true,
            ..Default::default()
        });
    };
    let grace = Instant::now() + DRAIN_GRACE;
    let deadline = match timeout {
        Some(limit) => (started + limit).max(grace),
        None => grace,
    };
    Ok(ProcessOutput {
        status: status.code(),
        success: status.success(),
        timed_out: false,
        stdout: stdout.collect(deadline),
        stderr: stderr.collect(deadline),
    })
}

/// Runs `command` attached to the current terminal.
pub fn run_interactive(command: &[String]) -> io::Result<ExitStatus> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;
    Command::new(program).args(args).status()
}

/// Bytes read so far from one output pipe, and a signal sent when the pipe
/// closes.
struct Drain {
    bytes: Arc<Mutex<Vec<u8>>>,
    closed: Receiver<()>,
}

impl Drain {
    /// Waits for the pipe to close, up to `deadline`, and returns what was
    /// read.
    fn collect(self, deadline: Instant) -> String {
        let wait = deadline.saturating_duration_since(Instant::now());
        if self.closed.recv_timeout(wait).is_err() {
            tracing::debug!("output pipe still open after exit, keeping partial output");
        }
        let bytes = self.bytes.lock().map(|bytes| bytes.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Drain {
    let bytes = Arc::new(Mutex::new(Vec::new()));
    let (done, closed) = mpsc::channel();
    let sink = Arc::clone(&bytes);
    thread::spawn(move || {
        if let Some(mut pipe) = pipe {
            let mut chunk = [0u8; 8192];
            loop {
                match pipe.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => match sink.lock() {
                        Ok(mut bytes) => bytes.extend_from_slice(&chunk[..n]),
                        Err(_) => break,
                    },
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
        }
        let _ = done.send(());
    });
    Drain { bytes, closed }
}
