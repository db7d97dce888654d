//! Build pipeline error taxonomy.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Fatal error from one phase of the build pipeline.
///
/// Every variant aborts the run immediately; no phase is retried and
/// transient subprocess failures are not distinguished from deterministic
/// ones. Subprocess failures carry the captured output verbatim so the
/// operator can tell "tool not installed" from "project does not compile".
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(
        "cmake not found\n\
         \n\
         CMake is required to build the pccl binaries from source.\n\
         Install CMake, ensure it is in your PATH, and retry."
    )]
    ToolchainMissing,

    #[error("cmake configure failed ({status})\n{output}")]
    ConfigureFailed { status: ExitStatus, output: String },

    #[error("CMakeCache.txt not found in {}", .path.display())]
    CacheNotFound { path: PathBuf },

    #[error("CMAKE_GENERATOR not recorded in {}", .path.display())]
    GeneratorKeyMissing { path: PathBuf },

    #[error("cmake build failed ({status})\n{output}")]
    BuildFailed { status: ExitStatus, output: String },
}

impl BuildError {
    /// Name of the pipeline phase this error aborted.
    pub fn phase(&self) -> &'static str {
        match self {
            BuildError::ToolchainMissing => "probe",
            BuildError::ConfigureFailed { .. } => "configure",
            BuildError::CacheNotFound { .. } | BuildError::GeneratorKeyMissing { .. } => {
                "generator detection"
            }
            BuildError::BuildFailed { .. } => "build",
        }
    }
}
