use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use bytes::Bytes;
use tokio::process::Command;

use crate::foundation::error::{ScenereelError, ScenereelResult};

/// A self-contained transcoding engine with a private workspace of named
/// entries and argv-style invocations.
///
/// This is the seam the transcode strategy, concatenator, and muxer all run
/// through; tests substitute an in-memory implementation.
#[async_trait::async_trait]
pub trait TranscodeEngine: Send + Sync {
    /// Expensive one-time initialization (availability probe, warm-up).
    /// Called at most once per [`EngineHandle`]; implementations may assume
    /// no invocation runs before it completes.
    async fn load(&self) -> ScenereelResult<()>;

    /// Stage bytes into the workspace under `name`.
    async fn write_input(&self, name: &str, bytes: &[u8]) -> ScenereelResult<()>;

    /// Run one engine invocation. Paths in `args` refer to workspace entries.
    async fn exec(&self, args: &[String]) -> ScenereelResult<()>;

    /// Read a workspace entry produced by an invocation.
    async fn read_output(&self, name: &str) -> ScenereelResult<Bytes>;

    /// Remove a workspace entry. Removing a missing entry is not an error.
    async fn remove(&self, name: &str) -> ScenereelResult<()>;
}

/// Caller-owned engine handle with lazy, at-most-once initialization.
///
/// The handle is injected into [`crate::generate_video`] rather than living
/// in module-level state, so lifetime and reuse are visible: a run borrows
/// the handle, which keeps the engine alive for the whole run, and the same
/// handle can serve any number of sequential runs without reloading.
pub struct EngineHandle {
    engine: Arc<dyn TranscodeEngine>,
    loaded: tokio::sync::OnceCell<()>,
}

impl EngineHandle {
    /// Wrap an engine implementation.
    pub fn new(engine: Arc<dyn TranscodeEngine>) -> Self {
        Self {
            engine,
            loaded: tokio::sync::OnceCell::new(),
        }
    }

    /// Handle backed by the system `ffmpeg` with a temporary workspace.
    pub fn ffmpeg() -> ScenereelResult<Self> {
        Ok(Self::new(Arc::new(FfmpegCliEngine::new()?)))
    }

    /// Run the engine's expensive initialization exactly once per handle.
    pub async fn ensure_loaded(&self) -> ScenereelResult<()> {
        self.loaded
            .get_or_try_init(|| self.engine.load())
            .await
            .map(|_| ())
    }

    /// Borrow the underlying engine.
    pub(crate) fn engine(&self) -> &dyn TranscodeEngine {
        self.engine.as_ref()
    }
}

/// Validate a workspace entry name: a single path component, no traversal.
pub(crate) fn validate_entry_name(name: &str) -> ScenereelResult<()> {
    if name.is_empty() {
        return Err(ScenereelError::validation(
            "workspace entry name must be non-empty",
        ));
    }
    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(ScenereelError::validation(format!(
            "workspace entry name '{name}' must be a bare file name"
        )));
    }
    Ok(())
}

/// Transcoding engine backed by the system `ffmpeg` binary.
///
/// The workspace is a process-private temporary directory; it is removed when
/// the engine is dropped, which backstops entry cleanup at process exit.
pub struct FfmpegCliEngine {
    workspace: tempfile::TempDir,
}

impl FfmpegCliEngine {
    /// Create an engine with a fresh temporary workspace.
    pub fn new() -> ScenereelResult<Self> {
        let workspace = tempfile::Builder::new()
            .prefix("scenereel-")
            .tempdir()
            .map_err(|e| {
                ScenereelError::engine(format!("failed to create engine workspace: {e}"))
            })?;
        Ok(Self { workspace })
    }

    fn entry_path(&self, name: &str) -> ScenereelResult<PathBuf> {
        validate_entry_name(name)?;
        Ok(self.workspace.path().join(name))
    }
}

#[async_trait::async_trait]
impl TranscodeEngine for FfmpegCliEngine {
    async fn load(&self) -> ScenereelResult<()> {
        let out = Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                ScenereelError::engine(format!(
                    "ffmpeg is required for video encoding but could not be started \
                     (is it installed and on PATH?): {e}"
                ))
            })?;
        if !out.status.success() {
            return Err(ScenereelError::engine(
                "ffmpeg -version exited with a failure status",
            ));
        }

        let banner = String::from_utf8_lossy(&out.stdout);
        let version = banner.lines().next().unwrap_or("ffmpeg").to_owned();
        tracing::info!(%version, "transcoding engine loaded");
        Ok(())
    }

    async fn write_input(&self, name: &str, bytes: &[u8]) -> ScenereelResult<()> {
        let path = self.entry_path(name)?;
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            ScenereelError::engine(format!("failed to stage workspace entry '{name}': {e}"))
        })
    }

    async fn exec(&self, args: &[String]) -> ScenereelResult<()> {
        let out = Command::new("ffmpeg")
            .args(["-hide_banner", "-loglevel", "error", "-y"])
            .args(args)
            .current_dir(self.workspace.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ScenereelError::engine(format!("failed to run ffmpeg: {e}")))?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(ScenereelError::engine(format!(
                "ffmpeg exited with status {} for args {:?}: {}",
                out.status,
                args,
                stderr.trim()
            )));
        }
        Ok(())
    }

    async fn read_output(&self, name: &str) -> ScenereelResult<Bytes> {
        let path = self.entry_path(name)?;
        let data = tokio::fs::read(&path).await.map_err(|e| {
            ScenereelError::engine(format!("failed to read workspace entry '{name}': {e}"))
        })?;
        Ok(Bytes::from(data))
    }

    async fn remove(&self, name: &str) -> ScenereelResult<()> {
        let path = self.entry_path(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ScenereelError::engine(format!(
                "failed to remove workspace entry '{name}': {e}"
            ))),
        }
    }
}

/// In-memory transcoding engine for tests and debugging.
///
/// Entries live in a map; invocations are recorded and synthesize their
/// output entry (the final argument) from preconfigured bytes.
#[derive(Default)]
pub struct MemoryEngine {
    fs: std::sync::Mutex<std::collections::BTreeMap<String, Bytes>>,
    execs: std::sync::Mutex<Vec<Vec<String>>>,
    outputs: std::sync::Mutex<std::collections::BTreeMap<String, Bytes>>,
    loads: std::sync::atomic::AtomicU32,
}

impl MemoryEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Preconfigure the bytes an invocation writes when it produces `name`.
    pub fn set_output(&self, name: &str, bytes: impl Into<Bytes>) {
        self.outputs
            .lock()
            .expect("memory engine poisoned")
            .insert(name.to_owned(), bytes.into());
    }

    /// All recorded invocations in order.
    pub fn execs(&self) -> Vec<Vec<String>> {
        self.execs.lock().expect("memory engine poisoned").clone()
    }

    /// Names currently present in the workspace.
    pub fn entries(&self) -> Vec<String> {
        self.fs
            .lock()
            .expect("memory engine poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// How many times `load` ran.
    pub fn load_count(&self) -> u32 {
        self.loads.load(std::sync::atomic::Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl TranscodeEngine for MemoryEngine {
    async fn load(&self) -> ScenereelResult<()> {
        self.loads
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        Ok(())
    }

    async fn write_input(&self, name: &str, bytes: &[u8]) -> ScenereelResult<()> {
        validate_entry_name(name)?;
        self.fs
            .lock()
            .expect("memory engine poisoned")
            .insert(name.to_owned(), Bytes::copy_from_slice(bytes));
        Ok(())
    }

    async fn exec(&self, args: &[String]) -> ScenereelResult<()> {
        let output = args
            .last()
            .ok_or_else(|| ScenereelError::engine("invocation needs at least one argument"))?
            .clone();
        self.execs
            .lock()
            .expect("memory engine poisoned")
            .push(args.to_vec());

        let bytes = self
            .outputs
            .lock()
            .expect("memory engine poisoned")
            .get(&output)
            .cloned()
            .unwrap_or_else(|| Bytes::from_static(b"memory-engine-output"));
        self.fs
            .lock()
            .expect("memory engine poisoned")
            .insert(output, bytes);
        Ok(())
    }

    async fn read_output(&self, name: &str) -> ScenereelResult<Bytes> {
        self.fs
            .lock()
            .expect("memory engine poisoned")
            .get(name)
            .cloned()
            .ok_or_else(|| ScenereelError::engine(format!("no workspace entry '{name}'")))
    }

    async fn remove(&self, name: &str) -> ScenereelResult<()> {
        self.fs.lock().expect("memory engine poisoned").remove(name);
        Ok(())
    }
}
