//! End-to-end pipeline tests for pccl-build.
//!
//! A fake `cmake` shell script stands in for the real tool: it logs every
//! invocation, answers the version probe, and writes a `CMakeCache.txt`
//! recording whatever generator the test asks for. The tests then assert
//! on the exact sequence of cmake invocations the orchestrator issued.

#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the pccl-build binary command.
fn pccl_build() -> Command {
    let mut cmd = Command::cargo_bin("pccl-build").unwrap();
    // Ambient packaging variables must not leak into the tests.
    for var in [
        "PCCL_CMAKE",
        "PCCL_ENABLE_DEBUG_SYMBOLS",
        "PCCL_REL_WITH_DEBUG_SYMBOLS",
        "PCCL_BUILD_CUDA_SUPPORT",
        "CC",
        "CXX",
        "MAKE_PROGRAM",
        "CMAKE_GENERATOR",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Write the fake cmake script into `dir` and return its path.
fn write_fake_cmake(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("cmake");
    fs::write(
        &script,
        r#"#!/bin/sh
echo "$@" >> "$FAKE_CMAKE_LOG"
case "$1" in
  --version)
    echo "cmake version 3.30.0"
    ;;
  --build)
    if [ "$FAKE_CMAKE_FAIL" = "build" ]; then
      echo "fake build error" >&2
      exit 1
    fi
    ;;
  *)
    if [ "$FAKE_CMAKE_FAIL" = "configure" ]; then
      echo "fake configure error" >&2
      exit 1
    fi
    printf 'CMAKE_GENERATOR:INTERNAL=%s\n' "$FAKE_CMAKE_GENERATOR" > CMakeCache.txt
    ;;
esac
"#,
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

struct Sandbox {
    _tmp: TempDir,
    cmake: PathBuf,
    log: PathBuf,
    project: PathBuf,
    build_dir: PathBuf,
    out_dir: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let cmake = write_fake_cmake(tmp.path());
        let log = tmp.path().join("cmake_calls.log");
        let project = tmp.path().join("project");
        fs::create_dir(&project).unwrap();

        Sandbox {
            cmake,
            log,
            project,
            build_dir: tmp.path().join("scratch"),
            out_dir: tmp.path().join("stage/pccl"),
            _tmp: tmp,
        }
    }

    fn command(&self, generator: &str) -> Command {
        let mut cmd = pccl_build();
        cmd.arg(&self.project)
            .arg("--build-dir")
            .arg(&self.build_dir)
            .arg("--out-dir")
            .arg(&self.out_dir)
            .env("PCCL_CMAKE", &self.cmake)
            .env("FAKE_CMAKE_LOG", &self.log)
            .env("FAKE_CMAKE_GENERATOR", generator);
        cmd
    }

    fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap()
            .lines()
            .map(|l| l.to_string())
            .collect()
    }
}

// ============================================================================
// Happy paths
// ============================================================================

#[test]
fn test_single_config_pipeline() {
    let sandbox = Sandbox::new();

    sandbox
        .command("Unix Makefiles")
        .assert()
        .success();

    let calls = sandbox.calls();
    assert_eq!(calls.len(), 4, "probe, two configures, one build: {:?}", calls);

    // Version probe first.
    assert_eq!(calls[0], "--version");

    // Probe configure: full config, no output-directory wiring yet.
    assert!(calls[1].contains("-DCMAKE_BUILD_TYPE=Release"));
    assert!(calls[1].contains("-DPCCL_BUILD_CUDA_SUPPORT=ON"));
    assert!(calls[1].contains("-DPCCL_BUILD_STATIC_LIB=OFF"));
    assert!(!calls[1].contains("OUTPUT_DIRECTORY"));

    // Final configure: single-config output variable pair, staging path.
    let staging = sandbox.out_dir.display().to_string();
    assert!(calls[2].contains(&format!("-DCMAKE_LIBRARY_OUTPUT_DIRECTORY={}", staging)));
    assert!(calls[2].contains(&format!("-DCMAKE_RUNTIME_OUTPUT_DIRECTORY={}", staging)));

    // Build scoped to the library target, Release config.
    assert!(calls[3].starts_with("--build ."));
    assert!(calls[3].contains("--target pccl"));
    assert!(calls[3].contains("--config Release"));
    assert!(calls[3].contains("--parallel"));

    // The scratch dir and its cache survive the run.
    assert!(sandbox.build_dir.join("CMakeCache.txt").is_file());
}

#[test]
fn test_multi_config_pipeline_with_debug_symbols() {
    let sandbox = Sandbox::new();

    sandbox
        .command("Visual Studio 17 2022")
        .env("PCCL_ENABLE_DEBUG_SYMBOLS", "1")
        .assert()
        .success();

    let calls = sandbox.calls();
    assert_eq!(calls.len(), 4);

    // Debug-symbols switch forces a Debug build type in both passes.
    assert!(calls[1].contains("-DCMAKE_BUILD_TYPE=Debug"));
    assert!(calls[2].contains("-DCMAKE_BUILD_TYPE=Debug"));

    // Per-configuration output variables, both on the same staging path.
    let staging = sandbox.out_dir.display().to_string();
    assert!(calls[2].contains(&format!(
        "-DCMAKE_RUNTIME_OUTPUT_DIRECTORY_RELEASE={}",
        staging
    )));
    assert!(calls[2].contains(&format!(
        "-DCMAKE_RUNTIME_OUTPUT_DIRECTORY_DEBUG={}",
        staging
    )));

    // Build still selects Release explicitly.
    assert!(calls[3].contains("--config Release"));
}

#[test]
fn test_rerun_reuses_scratch_dir() {
    let sandbox = Sandbox::new();

    sandbox.command("Ninja").assert().success();
    sandbox.command("Ninja").assert().success();

    // Two full passes, nothing wiped in between.
    assert_eq!(sandbox.calls().len(), 8);
    assert!(sandbox.build_dir.join("CMakeCache.txt").is_file());
}

// ============================================================================
// Failure modes
// ============================================================================

#[test]
fn test_missing_cmake_fails_before_any_mutation() {
    let tmp = TempDir::new().unwrap();
    let empty_path = tmp.path().join("bin");
    fs::create_dir(&empty_path).unwrap();
    let project = tmp.path().join("project");
    fs::create_dir(&project).unwrap();
    let build_dir = tmp.path().join("scratch");

    pccl_build()
        .arg(&project)
        .arg("--build-dir")
        .arg(&build_dir)
        .arg("--out-dir")
        .arg(tmp.path().join("stage"))
        .env("PATH", &empty_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cmake not found"));

    // Probing failed before the scratch directory was created.
    assert!(!build_dir.exists());
}

#[test]
fn test_configure_failure_surfaces_output() {
    let sandbox = Sandbox::new();

    sandbox
        .command("Unix Makefiles")
        .env("FAKE_CMAKE_FAIL", "configure")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cmake configure failed"))
        .stderr(predicate::str::contains("fake configure error"));

    // Pipeline stopped at the probe configure.
    assert_eq!(sandbox.calls().len(), 2);
}

#[test]
fn test_build_failure_surfaces_output() {
    let sandbox = Sandbox::new();

    sandbox
        .command("Unix Makefiles")
        .env("FAKE_CMAKE_FAIL", "build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cmake build failed"))
        .stderr(predicate::str::contains("fake build error"));

    assert_eq!(sandbox.calls().len(), 4);
}

#[test]
fn test_generator_key_missing_is_reported() {
    let sandbox = Sandbox::new();

    // Replace the script with one that writes a cache lacking the
    // generator key.
    use std::os::unix::fs::PermissionsExt;
    fs::write(
        &sandbox.cmake,
        r#"#!/bin/sh
echo "$@" >> "$FAKE_CMAKE_LOG"
case "$1" in
  --version) echo "cmake version 3.30.0" ;;
  --build) ;;
  *) printf 'CMAKE_BUILD_TYPE:STRING=Release\n' > CMakeCache.txt ;;
esac
"#,
    )
    .unwrap();
    fs::set_permissions(&sandbox.cmake, fs::Permissions::from_mode(0o755)).unwrap();

    sandbox
        .command("unused")
        .assert()
        .failure()
        .stderr(predicate::str::contains("CMAKE_GENERATOR not recorded"));
}
