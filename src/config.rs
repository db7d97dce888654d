//! Build configuration assembled from the process environment.
//!
//! The environment is the packaging pipeline's only configuration surface,
//! so all recognized variables are resolved here, once, into an immutable
//! [`BuildConfig`]. Lookup goes through the [`Env`] trait so tests can
//! supply synthetic environments without mutating process globals.

use std::collections::HashMap;

/// Environment lookup used to assemble a [`BuildConfig`].
pub trait Env {
    /// Look up a variable, `None` if unset.
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl Env for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Env for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Forces a Debug build when set (any value).
pub const ENV_DEBUG_SYMBOLS: &str = "PCCL_ENABLE_DEBUG_SYMBOLS";

/// Forces a RelWithDebInfo build when set (any value); wins over
/// [`ENV_DEBUG_SYMBOLS`] when both are present.
pub const ENV_REL_WITH_DEBUG_SYMBOLS: &str = "PCCL_REL_WITH_DEBUG_SYMBOLS";

/// CUDA support override; only the exact literal `ON` keeps it enabled.
pub const ENV_CUDA_SUPPORT: &str = "PCCL_BUILD_CUDA_SUPPORT";

/// C compiler override, passed through to cmake verbatim.
pub const ENV_C_COMPILER: &str = "CC";

/// C++ compiler override, passed through to cmake verbatim.
pub const ENV_CXX_COMPILER: &str = "CXX";

/// Make program override, passed through to cmake verbatim.
pub const ENV_MAKE_PROGRAM: &str = "MAKE_PROGRAM";

/// Explicit cmake generator selection (`-G`).
pub const ENV_GENERATOR: &str = "CMAKE_GENERATOR";

/// CMake build type for the native library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Release,
    Debug,
    RelWithDebInfo,
}

impl BuildMode {
    /// The value passed as `-DCMAKE_BUILD_TYPE=`.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Release => "Release",
            BuildMode::Debug => "Debug",
            BuildMode::RelWithDebInfo => "RelWithDebInfo",
        }
    }
}

/// Immutable per-run build configuration.
///
/// Values are taken verbatim from the environment; cmake is the final
/// validator for compiler paths and generator names.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Build type handed to cmake
    pub mode: BuildMode,

    /// Whether the CUDA backend is compiled in
    pub cuda_support: bool,

    /// C compiler override (`CC`)
    pub c_compiler: Option<String>,

    /// C++ compiler override (`CXX`)
    pub cxx_compiler: Option<String>,

    /// Make program override (`MAKE_PROGRAM`)
    pub make_program: Option<String>,

    /// Explicit generator name (`CMAKE_GENERATOR`)
    pub generator: Option<String>,

    /// Parallel job count hint for the build step
    pub jobs: usize,
}

impl BuildConfig {
    /// Assemble a configuration from the given environment.
    pub fn from_env(env: &dyn Env) -> Self {
        let mut mode = BuildMode::Release;
        if env.var(ENV_DEBUG_SYMBOLS).is_some() {
            mode = BuildMode::Debug;
        }
        // Checked after the debug switch so it wins when both are set.
        if env.var(ENV_REL_WITH_DEBUG_SYMBOLS).is_some() {
            mode = BuildMode::RelWithDebInfo;
        }

        // Enabled by default; an override enables only on the exact literal
        // "ON". Any other value, including empty, disables CUDA support.
        let cuda_support = match env.var(ENV_CUDA_SUPPORT) {
            Some(value) => value == "ON",
            None => true,
        };

        BuildConfig {
            mode,
            cuda_support,
            c_compiler: env.var(ENV_C_COMPILER),
            cxx_compiler: env.var(ENV_CXX_COMPILER),
            make_program: env.var(ENV_MAKE_PROGRAM),
            generator: env.var(ENV_GENERATOR),
            jobs: default_jobs(),
        }
    }

    /// Render the ordered cmake configure argument list.
    ///
    /// Output-directory defines are deliberately absent; they depend on the
    /// detected generator and are appended by the orchestrator for the
    /// second configure pass only.
    pub fn configure_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("-DCMAKE_BUILD_TYPE={}", self.mode.as_str()),
            format!(
                "-DPCCL_BUILD_CUDA_SUPPORT={}",
                if self.cuda_support { "ON" } else { "OFF" }
            ),
            // The packaging layout ships a shared library only.
            "-DPCCL_BUILD_STATIC_LIB=OFF".to_string(),
        ];

        if let Some(ref cc) = self.c_compiler {
            args.push(format!("-DCMAKE_C_COMPILER={}", cc));
        }
        if let Some(ref cxx) = self.cxx_compiler {
            args.push(format!("-DCMAKE_CXX_COMPILER={}", cxx));
        }
        if let Some(ref make) = self.make_program {
            args.push(format!("-DCMAKE_MAKE_PROGRAM={}", make));
        }
        if let Some(ref generator) = self.generator {
            args.push("-G".to_string());
            args.push(generator.clone());
        }

        args
    }
}

/// All logical cores but one, floored at one.
fn default_jobs() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}
