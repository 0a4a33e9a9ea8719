use super::{AgentCommand, AgentError, AgentRequest};
use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const EXIT_POLL: Duration = Duration::from_millis(10);
const READ_CHUNK: usize = 8 * 1024;
/// How long output is drained after the agent itself has exited.
const EXIT_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Feeds `request.prompt` to the agent on stdin and waits up to
/// `request.timeout`. Returns captured stdout when the agent exits zero.
/// A timed-out child is killed and reaped before returning. Output still
/// held open by a lingering grandchild is collected only until the same
/// deadline, and for at most a short grace period once the agent has exited.
pub fn run_agent(command: &AgentCommand, request: &AgentRequest) -> Result<String, AgentError> {
    let binary = command.binary.clone();
    let launch_error = |source: std::io::Error| AgentError::Launch {
        binary: binary.clone(),
        source,
    };

    let mut child = match Command::new(&command.binary)
        .args(&command.args)
        .current_dir(&request.working_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(AgentError::NotInstalled { binary })
        }
        Err(err) => return Err(launch_error(err)),
    };

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| launch_error(std::io::Error::other("missing stdin pipe")))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| launch_error(std::io::Error::other("missing stdout pipe")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| launch_error(std::io::Error::other("missing stderr pipe")))?;

    // The agent may exit without reading its input; a broken pipe is fine.
    let prompt = request.prompt.clone();
    thread::spawn(move || {
        let _ = stdin.write_all(prompt.as_bytes());
    });
    let stdout = PipeCapture::spawn(stdout);
    let stderr = PipeCapture::spawn(stderr);

    let start = Instant::now();
    let deadline = start + request.timeout;
    let exit_status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > request.timeout {
                    // Readers are left detached: a grandchild may still
                    // hold the pipes open.
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(AgentError::Timeout {
                        binary,
                        timeout_ms: u64::try_from(request.timeout.as_millis()).unwrap_or(u64::MAX),
                    });
                }
                thread::sleep(EXIT_POLL);
            }
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(launch_error(err));
            }
        }
    };

    let drain_until = deadline.min(Instant::now() + EXIT_DRAIN_GRACE);
    let (stdout, stdout_complete) = stdout.collect(drain_until);
    let (stderr, stderr_complete) = stderr.collect(drain_until);
    if !(stdout_complete && stderr_complete) {
        tracing::warn!(
            binary = %binary,
            "agent exited but its output pipes were still open at the deadline; using captured output"
        );
    }

    if !exit_status.success() {
        return Err(AgentError::NonZeroExit {
            binary,
            exit_code: exit_status.code(),
            stderr,
        });
    }
    Ok(stdout)
}

/// Reads a pipe on its own thread into a shared buffer, so the caller can
/// stop waiting at a deadline and still keep what arrived.
struct PipeCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
    finished: Receiver<()>,
}

impl PipeCapture {
    fn spawn(mut pipe: impl Read + Send + 'static) -> Self {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let (done, finished) = mpsc::channel();
        let sink = Arc::clone(&buffer);
        thread::spawn(move || {
            let mut chunk = [0u8; READ_CHUNK];
            loop {
                match pipe.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => match sink.lock() {
                        Ok(mut buf) => buf.extend_from_slice(&chunk[..n]),
                        Err(poisoned) => poisoned.into_inner().extend_from_slice(&chunk[..n]),
                    },
                    Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
            let _ = done.send(());
        });
        Self { buffer, finished }
    }

    /// Waits for end-of-file until `deadline`. The flag is `false` when the
    /// pipe was still open and the text is only what had been read so far.
    fn collect(self, deadline: Instant) -> (String, bool) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let complete = self.finished.recv_timeout(remaining).is_ok();
        let bytes = match self.buffer.lock() {
            Ok(buf) => buf.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        (String::from_utf8_lossy(&bytes).into_owned(), complete)
    }
}
