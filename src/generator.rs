//! CMake generator detection from the on-disk build cache.
//!
//! Which generator cmake selected is only knowable after a configure pass
//! has written `CMakeCache.txt`. The cache is line-oriented `key=value`
//! text; the single entry relied upon here is the internal record of the
//! selected generator name.

use std::fs;
use std::path::Path;

use crate::error::BuildError;

/// Cache line prefix recording the generator cmake selected.
const GENERATOR_KEY: &str = "CMAKE_GENERATOR:INTERNAL=";

/// Generator names that route outputs through per-configuration variables.
///
/// Closed set, intentionally not exhaustive: a multi-config generator not
/// listed here is classified single-config rather than guessed at.
const MULTI_CONFIG_MARKERS: &[&str] = &["Visual Studio", "Xcode", "NMake", "MSYS Makefiles"];

/// How the selected generator expects output directories to be wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    /// IDE-style generators with per-configuration output variables
    MultiConfig,
    /// Makefile/Ninja-style generators with a single output variable pair
    SingleConfig,
}

/// Classify a generator name by substring match against the known
/// multi-config markers.
pub fn classify(generator: &str) -> GeneratorKind {
    if MULTI_CONFIG_MARKERS
        .iter()
        .any(|marker| generator.contains(marker))
    {
        GeneratorKind::MultiConfig
    } else {
        GeneratorKind::SingleConfig
    }
}

/// Read the generator name recorded in `CMakeCache.txt` under `build_dir`.
///
/// A missing cache means the probe configure never ran or the scratch
/// directory was tampered with; a cache without the key means an
/// incompatible cache format. The two are reported distinctly.
pub fn generator_from_cache(build_dir: &Path) -> Result<String, BuildError> {
    let cache_file = build_dir.join("CMakeCache.txt");

    let contents = fs::read_to_string(&cache_file).map_err(|_| BuildError::CacheNotFound {
        path: cache_file.clone(),
    })?;

    for line in contents.lines() {
        if let Some(name) = line.strip_prefix(GENERATOR_KEY) {
            return Ok(name.trim().to_string());
        }
    }

    Err(BuildError::GeneratorKeyMissing { path: cache_file })
}
