use anyhow::{anyhow, Context, Result};
use parking_lot::Mutex;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEvent {
    pub text: String,
    pub is_final: bool,
}

pub type TranscriptHandler = Box<dyn FnMut(TranscriptEvent) + Send>;

/// A speech-to-text capability. Optional: callers hold an
/// `Option<Box<dyn DictationService>>` and branch on it once.
pub trait DictationService: Send {
    fn start(&mut self) -> Result<()>;
    fn stop(&mut self);
    fn on_transcript(&mut self, handler: TranscriptHandler);
    fn is_listening(&self) -> bool;
}

/// Runs an external speech-to-text command. Each stdout line is a final
/// transcript; a line starting with `~` is an interim one. The command runs
/// in its own process group so stopping also ends anything it forked.
pub struct CommandDictation {
    program: PathBuf,
    args: Vec<String>,
    handler: Arc<Mutex<Option<TranscriptHandler>>>,
    run: Option<Run>,
}

/// One listening session. The flag belongs to this run alone, so a reader
/// thread outliving its run cannot touch the next one.
struct Run {
    child: Child,
    active: Arc<AtomicBool>,
}

impl CommandDictation {
    /// `None` when the command is empty or its program is not on `PATH`.
    pub fn detect(command: &str) -> Option<Self> {
        let mut parts = shlex::split(command)?;
        if parts.is_empty() {
            return None;
        }
        let program = which::which(parts.remove(0)).ok()?;
        Some(Self {
            program,
            args: parts,
            handler: Arc::new(Mutex::new(None)),
            run: None,
        })
    }

    fn spawn(&self) -> Result<Child> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        cmd.spawn()
            .with_context(|| format!("failed to start dictation command {}", self.program.display()))
    }
}

#[cfg(unix)]
fn terminate(child: &mut Child) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Err(e) = killpg(Pid::from_raw(child.id() as i32), Signal::SIGKILL) {
        debug!("killpg failed ({e}), killing the direct child only");
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    let _ = child.kill();
}

pub fn parse_transcript_line(line: &str) -> Option<TranscriptEvent> {
    let line = line.trim();
    let (text, is_final) = match line.strip_prefix('~') {
        Some(rest) => (rest.trim(), false),
        None => (line, true),
    };
    if text.is_empty() {
        return None;
    }
    Some(TranscriptEvent { text: text.to_string(), is_final })
}

impl DictationService for CommandDictation {
    fn start(&mut self) -> Result<()> {
        if self.is_listening() {
            return Ok(());
        }
        // Reap a previous run that ended on its own.
        self.stop();

        let mut child = self.spawn()?;
        let Some(stdout) = child.stdout.take() else {
            terminate(&mut child);
            let _ = child.wait();
            return Err(anyhow!("dictation command has no stdout"));
        };

        let active = Arc::new(AtomicBool::new(true));
        let handler = Arc::clone(&self.handler);
        let reader_active = Arc::clone(&active);
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                if !reader_active.load(Ordering::SeqCst) {
                    break;
                }
                match line {
                    Ok(l) => {
                        if let Some(ev) = parse_transcript_line(&l) {
                            if let Some(h) = handler.lock().as_mut() {
                                h(ev);
                            }
                        }
                    }
                    Err(e) => {
                        warn!("dictation stream error: {e}");
                        break;
                    }
                }
            }
            debug!("dictation stream ended");
            reader_active.store(false, Ordering::SeqCst);
        });
        self.run = Some(Run { child, active });
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut run) = self.run.take() {
            run.active.store(false, Ordering::SeqCst);
            terminate(&mut run.child);
            let _ = run.child.wait();
        }
    }

    fn on_transcript(&mut self, handler: TranscriptHandler) {
        *self.handler.lock() = Some(handler);
    }

    fn is_listening(&self) -> bool {
        self.run
            .as_ref()
            .is_some_and(|r| r.active.load(Ordering::SeqCst))
    }
}

impl Drop for CommandDictation {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The catalog text field, shared between the form and the dictation
/// listener. Dictation only ever appends.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuffer(Arc<Mutex<String>>);

impl CatalogBuffer {
    pub fn text(&self) -> String {
        self.0.lock().clone()
    }

    pub fn set(&self, text: impl Into<String>) {
        *self.0.lock() = text.into();
    }

    pub fn append_line(&self, line: &str) {
        let mut buf = self.0.lock();
        if !buf.is_empty() {
            buf.push('\n');
        }
        buf.push_str(line);
    }

    /// Appends a final transcript separated by a single space.
    pub fn append_transcript(&self, text: &str) {
        let mut buf = self.0.lock();
        if !buf.is_empty() && !buf.ends_with(char::is_whitespace) {
            buf.push(' ');
        }
        buf.push_str(text);
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }

    pub fn is_blank(&self) -> bool {
        self.0.lock().trim().is_empty()
    }
}

/// Form-side voice control: optional capability plus the buffer it feeds.
pub struct VoiceInput {
    service: Option<Box<dyn DictationService>>,
}

impl VoiceInput {
    pub fn new(mut service: Option<Box<dyn DictationService>>, buffer: CatalogBuffer) -> Self {
        if let Some(svc) = service.as_mut() {
            svc.on_transcript(Box::new(move |ev: TranscriptEvent| {
                if ev.is_final {
                    buffer.append_transcript(&ev.text);
                }
            }));
        }
        Self { service }
    }

    pub fn is_available(&self) -> bool {
        self.service.is_some()
    }

    pub fn is_listening(&self) -> bool {
        self.service.as_ref().is_some_and(|s| s.is_listening())
    }

    /// Start or stop listening; returns whether it is now listening.
    pub fn toggle(&mut self) -> Result<bool> {
        let svc = self
            .service
            .as_mut()
            .ok_or_else(|| anyhow!("Voice input is not supported here (no dictation command configured)."))?;
        if svc.is_listening() {
            svc.stop();
            Ok(false)
        } else {
            svc.start()?;
            Ok(true)
        }
    }

    pub fn stop(&mut self) {
        if let Some(svc) = self.service.as_mut() {
            svc.stop();
        }
    }
}
