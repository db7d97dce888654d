//! CMake toolchain probing.

use std::path::{Path, PathBuf};

use crate::config::Env;
use crate::error::BuildError;
use crate::process::{find_executable, ProcessBuilder};

/// Overrides the cmake executable used for every invocation.
pub const ENV_CMAKE: &str = "PCCL_CMAKE";

/// Locate the cmake executable.
///
/// An explicit override is taken first, either as a path to an executable
/// or as a name resolved through PATH; otherwise `cmake` is looked up in
/// PATH.
pub fn find_cmake(env: &dyn Env) -> Option<PathBuf> {
    if let Some(cmake) = env.var(ENV_CMAKE) {
        let path = PathBuf::from(&cmake);
        if path.is_file() {
            return Some(path);
        }
        return find_executable(&cmake);
    }

    find_executable("cmake")
}

/// Run `cmake --version` and return the reported version line.
///
/// Must run before any configuration work so a missing toolchain is
/// reported early, before anything touches the filesystem.
pub fn probe_cmake(cmake: &Path) -> Result<String, BuildError> {
    let output = ProcessBuilder::new(cmake)
        .arg("--version")
        .exec()
        .map_err(|_| BuildError::ToolchainMissing)?;

    if !output.status.success() {
        return Err(BuildError::ToolchainMissing);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
}
