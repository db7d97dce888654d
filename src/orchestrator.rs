//! Two-phase configure/build orchestration.
//!
//! cmake only records which generator it selected after a configure pass
//! has run, and the output-directory variables differ between multi-config
//! and single-config generators. The pipeline therefore configures once
//! against the scratch directory with no output arguments, reads the
//! generator back from `CMakeCache.txt`, and configures a second time with
//! the backend-appropriate output defines before invoking the build.
//!
//! Phases run strictly in order, once per run, and any failure aborts the
//! rest of the pipeline: probe, assemble, probe-configure, detect,
//! final-configure, build.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::{BuildConfig, Env};
use crate::error::BuildError;
use crate::fs::{absolute_path, ensure_dir};
use crate::generator::{classify, generator_from_cache, GeneratorKind};
use crate::platform::shared_library_name;
use crate::process::{combined_output, ProcessBuilder};
use crate::toolchain::{find_cmake, probe_cmake};

/// The only cmake target built and staged.
pub const LIBRARY_TARGET: &str = "pccl";

/// Drives the configure/build pipeline for one packaging run.
///
/// The scratch build directory is created if absent and never wiped;
/// re-running against the same path relies on cmake's own cache reuse.
pub struct ExtensionBuilder {
    cmake: PathBuf,
    config: BuildConfig,
    project_root: PathBuf,
    build_dir: PathBuf,
    output_dir: PathBuf,
}

impl ExtensionBuilder {
    /// Probe the toolchain and assemble the run configuration.
    ///
    /// The toolchain probe runs first so a missing cmake is reported
    /// before any filesystem mutation.
    pub fn new(
        env: &dyn Env,
        project_root: &Path,
        build_dir: &Path,
        output_dir: &Path,
    ) -> Result<Self> {
        let cmake = find_cmake(env).ok_or(BuildError::ToolchainMissing)?;
        let version = probe_cmake(&cmake)?;
        tracing::info!("using {} at {}", version, cmake.display());

        let config = BuildConfig::from_env(env);
        tracing::debug!(?config, "assembled build configuration");

        Ok(ExtensionBuilder {
            cmake,
            config,
            project_root: absolute_path(project_root)?,
            build_dir: absolute_path(build_dir)?,
            // cmake resolves relative output defines against its own cwd,
            // so the staging path must be absolute before it is rendered
            // into arguments.
            output_dir: absolute_path(output_dir)?,
        })
    }

    /// The assembled configuration for this run.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// The staged artifact path on success.
    pub fn artifact_path(&self) -> PathBuf {
        self.output_dir.join(shared_library_name())
    }

    /// Run the whole pipeline: probe-configure, detect, final-configure,
    /// build.
    ///
    /// On success the compiled shared library exists under the staging
    /// directory; that is the only externally observable postcondition.
    pub fn run(&self) -> Result<()> {
        ensure_dir(&self.build_dir)?;

        tracing::info!("probe configure to detect the cmake generator");
        self.configure(&[])?;

        let generator = generator_from_cache(&self.build_dir)?;
        tracing::info!("detected cmake generator: {}", generator);

        self.configure(&self.output_dir_args(classify(&generator)))?;

        self.compile()?;

        let artifact = self.artifact_path();
        if artifact.exists() {
            tracing::info!("staged {}", artifact.display());
        } else {
            tracing::warn!(
                "build succeeded but no artifact found at {}",
                artifact.display()
            );
        }

        Ok(())
    }

    /// One cmake configure pass: full configuration arguments plus
    /// whatever backend-specific defines the caller appends.
    fn configure(&self, extra_args: &[String]) -> Result<()> {
        let cmd = ProcessBuilder::new(&self.cmake)
            .arg(&self.project_root)
            .args(self.config.configure_args())
            .args(extra_args)
            .cwd(&self.build_dir);

        tracing::info!("{}", cmd.display_command());
        let output = cmd.exec()?;

        if !output.status.success() {
            return Err(BuildError::ConfigureFailed {
                status: output.status,
                output: combined_output(&output),
            }
            .into());
        }

        Ok(())
    }

    /// Output-directory defines for the detected generator kind.
    ///
    /// Multi-config generators ignore the plain output variables and fall
    /// back to per-configuration subdirectories unless the Release and
    /// Debug variables are both populated; only one configuration is ever
    /// built, so both point at the same staging path.
    fn output_dir_args(&self, kind: GeneratorKind) -> Vec<String> {
        let staging = self.output_dir.display();
        match kind {
            GeneratorKind::MultiConfig => vec![
                format!("-DCMAKE_RUNTIME_OUTPUT_DIRECTORY_RELEASE={}", staging),
                format!("-DCMAKE_RUNTIME_OUTPUT_DIRECTORY_DEBUG={}", staging),
            ],
            GeneratorKind::SingleConfig => vec![
                format!("-DCMAKE_LIBRARY_OUTPUT_DIRECTORY={}", staging),
                format!("-DCMAKE_RUNTIME_OUTPUT_DIRECTORY={}", staging),
            ],
        }
    }

    /// The cmake build pass, scoped to the library target.
    ///
    /// `--config Release` is passed unconditionally; single-config
    /// generators ignore it and multi-config generators need it.
    fn compile(&self) -> Result<()> {
        let cmd = ProcessBuilder::new(&self.cmake)
            .args(["--build", "."])
            .args(["--target", LIBRARY_TARGET])
            .arg(format!("-j{}", self.config.jobs))
            .arg("-v")
            .arg("--parallel")
            .args(["--config", "Release"])
            .cwd(&self.build_dir);

        tracing::info!("{}", cmd.display_command());
        let output = cmd.exec()?;

        if !output.status.success() {
            return Err(BuildError::BuildFailed {
                status: output.status,
                output: combined_output(&output),
            }
            .into());
        }

        Ok(())
    }
}
