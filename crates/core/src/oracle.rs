//! Compile-and-test validation oracle.
//!
//! A mutated program is semantically acceptable when it still compiles and
//! its test harness still passes. [`GccOracle`] renders the program, compiles
//! it with `gcc -O3`, links it against a caller-supplied harness object (the
//! harness drives the program's functions and reports success through its
//! exit status), and runs the binary. Every stage runs under a one-second
//! timeout; a timeout means the candidate is rejected, not that the run
//! errored.

use crate::ast::Program;
use crate::result::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

const STAGE_TIMEOUT: Duration = Duration::from_secs(1);

/// Decides whether a candidate program is behaviorally acceptable.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Returns `Ok(true)` when the program passes, `Ok(false)` when it is
    /// rejected (compile failure, wrong behavior, timeout). `Err` is reserved
    /// for environment failures such as a missing compiler.
    async fn validate(&self, program: &Program) -> Result<bool>;
}

/// Always answers the same verdict. Stand-in for tests and dry runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedOracle(pub bool);

#[async_trait]
impl Oracle for FixedOracle {
    async fn validate(&self, _program: &Program) -> Result<bool> {
        Ok(self.0)
    }
}

/// Real oracle backed by gcc and a harness object file.
///
/// The harness object provides `main` plus any stimulus data; it is built
/// once by the caller, not per candidate. The harness signals "tests passed"
/// with a nonzero exit status, so a crash-to-zero cannot masquerade as a
/// pass.
#[derive(Debug, Clone)]
pub struct GccOracle {
    harness_object: PathBuf,
    compiler: String,
}

impl GccOracle {
    pub fn new(harness_object: PathBuf) -> Self {
        Self {
            harness_object,
            compiler: "gcc".to_string(),
        }
    }

    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = compiler.into();
        self
    }

    /// Runs one subprocess stage; `Ok(None)` means timeout.
    async fn run_stage(&self, mut cmd: Command) -> Result<Option<std::process::Output>> {
        match timeout(STAGE_TIMEOUT, cmd.output()).await {
            Ok(output) => Ok(Some(output?)),
            Err(_) => Ok(None),
        }
    }
}

#[async_trait]
impl Oracle for GccOracle {
    async fn validate(&self, program: &Program) -> Result<bool> {
        let scratch = tempfile::tempdir()?;
        let src = scratch.path().join("candidate.c");
        let obj = scratch.path().join("candidate.o");
        let bin = scratch.path().join("candidate");

        tokio::fs::write(&src, program.to_string()).await?;

        let mut compile = Command::new(&self.compiler);
        compile.arg("-O3").arg("-c").arg(&src).arg("-o").arg(&obj);
        match self.run_stage(compile).await? {
            Some(output) if output.status.success() => {}
            Some(output) => {
                debug!(
                    stderr = %String::from_utf8_lossy(&output.stderr),
                    "candidate failed to compile"
                );
                return Ok(false);
            }
            None => {
                warn!("compile stage timed out");
                return Ok(false);
            }
        }

        let mut link = Command::new(&self.compiler);
        link.arg(&obj)
            .arg(&self.harness_object)
            .arg("-o")
            .arg(&bin);
        match self.run_stage(link).await? {
            Some(output) if output.status.success() => {}
            Some(output) => {
                debug!(
                    stderr = %String::from_utf8_lossy(&output.stderr),
                    "candidate failed to link"
                );
                return Ok(false);
            }
            None => {
                warn!("link stage timed out");
                return Ok(false);
            }
        }

        match self.run_stage(Command::new(&bin)).await? {
            // The harness exits nonzero on success.
            Some(output) => Ok(output.status.code().is_some_and(|code| code != 0)),
            None => {
                debug!("candidate run timed out");
                Ok(false)
            }
        }
    }
}
