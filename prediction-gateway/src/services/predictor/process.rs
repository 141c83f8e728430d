use super::{extract_json, Predictor, PredictorError};
use crate::config::PredictorConfig;
use crate::models::{PredictionRequest, PredictionResult};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Runs the external predictor once per request.
///
/// The request is written to the child's stdin followed by EOF; stdout is
/// buffered whole and parsed, stderr is only logged. Children are spawned with
/// `kill_on_drop`, so hitting the deadline terminates the process.
#[derive(Clone)]
pub struct ProcessPredictor {
    config: PredictorConfig,
}

impl ProcessPredictor {
    pub fn new(config: PredictorConfig) -> Self {
        Self { config }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.config.command);
        cmd.args(&self.config.args);

        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }

        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        cmd
    }

    async fn run(&self, payload: &[u8]) -> Result<Output, PredictorError> {
        let mut child = self.command().spawn().map_err(|e| {
            tracing::error!(
                program = %self.config.command,
                args = ?self.config.args,
                error = %e,
                "Failed to spawn predictor"
            );
            PredictorError::Spawn(e)
        })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| PredictorError::Io(io::Error::other("predictor stdin not captured")))?;

        // Feed stdin while stdout/stderr drain, otherwise a large payload or
        // chatty predictor can block on a full pipe.
        let write_input = async move {
            let result = stdin.write_all(payload).await;
            drop(stdin);
            result
        };

        let (written, output) = tokio::join!(write_input, child.wait_with_output());

        if let Err(e) = written {
            // The exit status decides the outcome; a predictor that quits
            // without reading its input shows up here as a broken pipe.
            tracing::warn!(
                program = %self.config.command,
                error = %e,
                "Failed to write request to predictor stdin"
            );
        }

        output.map_err(PredictorError::Io)
    }

    /// Resolve the configured program the way the OS would on spawn.
    async fn program_exists(&self) -> bool {
        let program = Path::new(&self.config.command);

        if program.components().count() > 1 || program.is_absolute() {
            let path = match (&self.config.working_dir, program.is_relative()) {
                (Some(dir), true) => dir.join(program),
                _ => program.to_path_buf(),
            };
            return is_executable(&path).await;
        }

        let Some(search_path) = std::env::var_os("PATH") else {
            return false;
        };

        for dir in std::env::split_paths(&search_path) {
            for candidate in executable_candidates(&dir, &self.config.command) {
                if is_executable(&candidate).await {
                    return true;
                }
            }
        }

        false
    }
}

#[async_trait]
impl Predictor for ProcessPredictor {
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictorError> {
        let payload = request
            .to_payload()
            .map_err(|e| PredictorError::Io(io::Error::other(e)))?;
        let timeout = self.config.timeout();
        let start = Instant::now();

        tracing::debug!(
            program = %self.config.command,
            args = ?self.config.args,
            timeout_secs = %timeout.as_secs(),
            payload_size = payload.len(),
            "Executing predictor"
        );

        let output = tokio::time::timeout(timeout, self.run(&payload))
            .await
            .map_err(|_| {
                tracing::error!(
                    program = %self.config.command,
                    timeout_secs = %timeout.as_secs(),
                    "Predictor timed out, killing process"
                );
                PredictorError::Timeout(timeout)
            })??;

        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            tracing::error!(
                program = %self.config.command,
                exit_code = ?output.status.code(),
                stderr = %stderr,
                duration_ms = start.elapsed().as_millis(),
                "Predictor failed"
            );
            return Err(PredictorError::NonZeroExit {
                code: output.status.code(),
            });
        }

        if !stderr.trim().is_empty() {
            tracing::debug!(stderr = %stderr, "Predictor stderr");
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let fields = extract_json(&stdout).map_err(|e| {
            tracing::error!(
                program = %self.config.command,
                error = %e,
                stdout = %stdout,
                "Failed to parse predictor output"
            );
            e
        })?;

        tracing::debug!(
            program = %self.config.command,
            output_size = output.stdout.len(),
            duration_ms = start.elapsed().as_millis(),
            "Predictor succeeded"
        );

        Ok(PredictionResult::new(fields))
    }

    async fn is_ready(&self) -> bool {
        self.program_exists().await
    }
}

#[cfg(unix)]
async fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
async fn is_executable(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

#[cfg(windows)]
fn executable_candidates(dir: &Path, program: &str) -> Vec<PathBuf> {
    vec![dir.join(program), dir.join(format!("{program}.exe"))]
}

#[cfg(not(windows))]
fn executable_candidates(dir: &Path, program: &str) -> Vec<PathBuf> {
    vec![dir.join(program)]
}
