//! Invoker - runs a selected catalog entry as a child process.
//!
//! The path string is never handed to a shell. Execution is always
//! `interpreter <path>`: a fixed interpreter with the path as its single
//! argument, so shell metacharacters in a crafted path are inert. On top
//! of that, any path not byte-for-byte present in the catalog is refused
//! before a process is spawned.

use crate::catalog::Catalog;
use crate::error::{Result, VeraError};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

pub struct Invoker {
    catalog: Arc<Catalog>,
    interpreter: String,
    timeout: Duration,
}

impl Invoker {
    pub fn new(catalog: Arc<Catalog>, interpreter: &str, timeout: Duration) -> Self {
        Self {
            catalog,
            interpreter: interpreter.to_string(),
            timeout,
        }
    }

    /// Execute the artifact at `path` and return its trimmed stdout.
    ///
    /// A non-zero exit, a spawn failure, or a timeout all surface as an
    /// `Execution` error carrying the path and the captured stderr.
    pub async fn run(&self, path: &str) -> Result<String> {
        if !self.catalog.contains_path(path) {
            warn!("Refusing to run path not in catalog: {}", path);
            return Err(VeraError::UnknownPath(path.to_string()));
        }

        info!("Running model: {} {}", self.interpreter, path);

        let child = Command::new(&self.interpreter)
            .arg(path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // If the timeout drops the future, the child goes with it; a
            // later query must never see this invocation's output.
            .kill_on_drop(true)
            .output();

        let output = match timeout(self.timeout, child).await {
            Err(_) => {
                return Err(VeraError::Execution {
                    path: path.to_string(),
                    stderr: format!("timed out after {}s", self.timeout.as_secs()),
                })
            }
            Ok(Err(e)) => {
                return Err(VeraError::Execution {
                    path: path.to_string(),
                    stderr: format!("failed to start: {e}"),
                })
            }
            Ok(Ok(output)) => output,
        };

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Err(VeraError::Execution {
                path: path.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use std::io::Write;

    fn catalog_for(paths: &[&str]) -> Arc<Catalog> {
        Arc::new(
            Catalog::from_entries(
                paths
                    .iter()
                    .map(|p| CatalogEntry {
                        path: p.to_string(),
                        description: "test".to_string(),
                        tags: vec![],
                        keywords: vec![],
                    })
                    .collect(),
            )
            .unwrap(),
        )
    }

    fn write_script(dir: &tempfile::TempDir, name: &str, body: &str) -> String {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{body}").unwrap();
        path.to_string_lossy().to_string()
    }

    #[tokio::test]
    async fn successful_run_returns_trimmed_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(&dir, "ok.sh", "echo '  Positive  '");
        let invoker = Invoker::new(catalog_for(&[&script]), "sh", Duration::from_secs(5));

        assert_eq!(invoker.run(&script).await.unwrap(), "Positive");
    }

    #[tokio::test]
    async fn nonzero_exit_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(&dir, "fail.sh", "echo boom >&2\nexit 3");
        let invoker = Invoker::new(catalog_for(&[&script]), "sh", Duration::from_secs(5));

        match invoker.run(&script).await {
            Err(VeraError::Execution { path, stderr }) => {
                assert_eq!(path, script);
                assert!(stderr.contains("boom"));
            }
            other => panic!("expected execution failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn shell_metacharacters_are_inert() {
        let dir = tempfile::tempdir().unwrap();
        let sentinel = dir.path().join("sentinel");
        std::fs::write(&sentinel, "still here").unwrap();

        // A hostile path baked into the catalog itself. It is passed as a
        // literal argument, so the interpreter just fails to find a file
        // by that name; nothing is deleted.
        let hostile = format!("; rm -rf {}", dir.path().display());
        let invoker = Invoker::new(catalog_for(&[&hostile]), "sh", Duration::from_secs(5));

        let result = invoker.run(&hostile).await;
        assert!(matches!(result, Err(VeraError::Execution { .. })));
        assert!(sentinel.exists());
    }

    #[tokio::test]
    async fn uncataloged_path_is_refused_before_spawn() {
        let invoker = Invoker::new(catalog_for(&["./known.py"]), "sh", Duration::from_secs(5));

        match invoker.run("./unknown.py").await {
            Err(VeraError::UnknownPath(path)) => assert_eq!(path, "./unknown.py"),
            other => panic!("expected unknown-path refusal, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_model_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(&dir, "slow.sh", "sleep 10");
        let invoker = Invoker::new(catalog_for(&[&script]), "sh", Duration::from_secs(1));

        match invoker.run(&script).await {
            Err(VeraError::Execution { stderr, .. }) => assert!(stderr.contains("timed out")),
            other => panic!("expected timeout failure, got {other:?}"),
        }
    }
}
