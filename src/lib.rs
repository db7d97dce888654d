//! pccl-build - CMake build orchestrator for the pccl native extension.
//!
//! This crate drives a two-phase cmake configure/build sequence against the
//! pccl C++ project and stages the resulting shared library where the
//! packaging layout expects it. It compiles nothing itself: cmake is
//! invoked as a subprocess, its on-disk cache is inspected to learn which
//! generator it selected, and the output-directory wiring is chosen to
//! match that generator.

pub mod config;
pub mod error;
pub mod fs;
pub mod generator;
pub mod orchestrator;
pub mod platform;
pub mod process;
pub mod toolchain;

pub use config::{BuildConfig, BuildMode, Env, SystemEnv};
pub use error::BuildError;
pub use generator::GeneratorKind;
pub use orchestrator::{ExtensionBuilder, LIBRARY_TARGET};
